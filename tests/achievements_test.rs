//! Achievement unlocking and weekly goals

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use teacal::achievements::{self, AchievementCategory, AchievementContext};
use teacal::{ConsumptionRecord, DrinkRef, Mood};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn record_on(date: NaiveDate, calories: f64, brand: &str) -> ConsumptionRecord {
    let timestamp = Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);
    ConsumptionRecord {
        id: format!("{date}-{brand}-{calories}"),
        drink_ref: DrinkRef {
            name: "奶茶".to_string(),
            brand: brand.to_string(),
            calories,
        },
        cup_size: None,
        sugar_level: None,
        mood: Mood::Relaxed,
        notes: String::new(),
        timestamp,
    }
}

fn context(records: &[ConsumptionRecord], today: NaiveDate, shares: u32) -> AchievementContext<'_> {
    AchievementContext {
        records,
        daily_budget_kcal: 300,
        share_count: shares,
        today,
    }
}

fn find<'a>(list: &'a [achievements::Achievement], id: &str) -> &'a achievements::Achievement {
    list.iter().find(|a| a.id == id).unwrap()
}

#[test]
fn test_nothing_unlocked_without_records() {
    let list = achievements::evaluate(&context(&[], day(3, 1), 0));
    assert_eq!(list.len(), 8);
    assert!(list.iter().all(|a| !a.completed));

    let summary = achievements::summarize(&list);
    assert_eq!((summary.completed, summary.total, summary.percent), (0, 8, 0));
}

#[test]
fn test_first_record_and_low_cal_chooser() {
    let records = vec![record_on(day(3, 1), 200.0, "茶百道")];
    let list = achievements::evaluate(&context(&records, day(3, 1), 0));

    let first = find(&list, "first-record");
    assert!(first.completed);
    assert_eq!(first.completed_date, Some(day(3, 1)));
    assert!(find(&list, "low-cal-chooser").completed);
    assert!(!find(&list, "streak-7").completed);
    assert_eq!(find(&list, "streak-7").progress, 1);
}

#[test]
fn test_seven_day_streak() {
    let records: Vec<_> = (1..=7)
        .map(|d| record_on(day(3, d), 450.0, "奈雪的茶"))
        .collect();
    let list = achievements::evaluate(&context(&records, day(3, 7), 0));

    let streak = find(&list, "streak-7");
    assert!(streak.completed);
    assert_eq!(streak.completed_date, Some(day(3, 7)));
    assert_eq!(find(&list, "streak-30").progress, 7);
    assert!(!find(&list, "low-cal-chooser").completed);
}

#[test]
fn test_budget_master_counts_empty_days_after_start() {
    let records = vec![
        record_on(day(3, 1), 250.0, "茶百道"),
        record_on(day(3, 5), 280.0, "茶百道"),
    ];
    let before = achievements::evaluate(&context(&records, day(3, 13), 0));
    assert_eq!(find(&before, "budget-master").progress, 13);
    assert!(!find(&before, "budget-master").completed);

    let after = achievements::evaluate(&context(&records, day(3, 14), 0));
    let master = find(&after, "budget-master");
    assert!(master.completed);
    assert_eq!(master.completed_date, Some(day(3, 14)));
}

#[test]
fn test_over_budget_day_resets_run() {
    let records = vec![
        record_on(day(3, 1), 250.0, "茶百道"),
        record_on(day(3, 10), 650.0, "茶百道"),
    ];
    let list = achievements::evaluate(&context(&records, day(3, 20), 0));
    assert_eq!(find(&list, "budget-master").progress, 10);
}

#[test]
fn test_sharer_and_brand_explorer() {
    let brands = [
        "喜茶", "奈雪的茶", "茶百道", "蜜雪冰城", "CoCo都可", "一点点", "古茗", "书亦烧仙草", "益禾堂",
        "沪上阿姨",
    ];
    let records: Vec<_> = brands
        .iter()
        .enumerate()
        .map(|(i, brand)| record_on(day(3, 1) + Duration::days(i as i64), 300.0, brand))
        .collect();
    let list = achievements::evaluate(&context(&records, day(3, 10), 5));

    assert!(find(&list, "sharer").completed);
    let explorer = find(&list, "brand-explorer");
    assert!(explorer.completed);
    assert_eq!(explorer.completed_date, Some(day(3, 10)));
    assert!(find(&list, "streak-7").completed);
}

#[test]
fn test_healthy_shift() {
    let mut records: Vec<_> = (1..=7).map(|d| record_on(day(3, d), 500.0, "喜茶")).collect();
    records.extend((15..=21).map(|d| record_on(day(3, d), 390.0, "喜茶")));
    let list = achievements::evaluate(&context(&records, day(3, 21), 0));
    let shift = find(&list, "healthy-shift");
    assert!(shift.completed);
    assert_eq!(shift.completed_date, Some(day(3, 21)));

    let mut modest = records.clone();
    modest.push(record_on(day(3, 21), 600.0, "喜茶"));
    let list = achievements::evaluate(&context(&modest, day(3, 21), 0));
    assert!(!find(&list, "healthy-shift").completed);
}

#[test]
fn test_filter_by_category() {
    let list = achievements::evaluate(&context(&[], day(3, 1), 0));
    let health = achievements::filter_by_category(&list, AchievementCategory::Health);
    let ids: Vec<_> = health.iter().map(|a| a.id).collect();
    assert_eq!(ids, ["low-cal-chooser", "budget-master", "healthy-shift"]);
    assert_eq!(
        achievements::filter_by_category(&list, AchievementCategory::Social).len(),
        1
    );
}

#[test]
fn test_weekly_goals() {
    let records = vec![
        record_on(day(2, 20), 300.0, "喜茶"),
        record_on(day(3, 4), 200.0, "喜茶"),
        record_on(day(3, 5), 250.0, "古茗"),
        record_on(day(3, 6), 310.0, "喜茶"),
        record_on(day(3, 7), 520.0, "喜茶"),
    ];
    let goals = achievements::weekly_goals(&context(&records, day(3, 7), 0));

    assert_eq!(goals.len(), 3);
    assert_eq!((goals[0].progress, goals[0].is_done()), (4, false));
    assert_eq!((goals[1].progress, goals[1].is_done()), (3, true));
    assert_eq!((goals[2].progress, goals[2].is_done()), (1, true));
}
