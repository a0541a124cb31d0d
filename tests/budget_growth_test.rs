//! Budget tracking and growth dashboard over a fixed journal

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use teacal::budget::{BudgetSettings, BudgetTracker, DayStatus};
use teacal::growth;
use teacal::models::CalorieCategory;
use teacal::{ConsumptionRecord, DrinkRef, Mood};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn record_on(date: NaiveDate, calories: f64) -> ConsumptionRecord {
    let timestamp = Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);
    ConsumptionRecord {
        id: format!("{date}-{calories}"),
        drink_ref: DrinkRef {
            name: "奶茶".to_string(),
            brand: "蜜雪冰城".to_string(),
            calories,
        },
        cup_size: None,
        sugar_level: None,
        mood: Mood::Happy,
        notes: String::new(),
        timestamp,
    }
}

#[test]
fn test_today_and_week_against_budget() {
    let records = vec![
        record_on(day(10), 200.0),
        record_on(day(10), 150.0),
        record_on(day(8), 400.0),
        record_on(day(1), 999.0),
    ];
    let tracker = BudgetTracker::new(&records, BudgetSettings::default());

    let today = tracker.today(day(10));
    assert_eq!(today.consumed, 350.0);
    assert_eq!(today.remaining, -50.0);
    assert_eq!(today.usage_percent, 117);
    assert!(today.over_budget);

    // Week of 4..=10 excludes the 1st
    let week = tracker.week(day(10));
    assert_eq!(week.consumed, 750.0);
    assert_eq!(week.remaining, 750.0);
    assert_eq!(week.usage_percent, 50);
    assert!(!week.over_budget);
}

#[test]
fn test_history_rates_each_day() {
    let records = vec![
        record_on(day(10), 320.0),
        record_on(day(9), 250.0),
        record_on(day(8), 150.0),
    ];
    let tracker = BudgetTracker::new(&records, BudgetSettings::default());
    let history = tracker.history(day(10), 4);

    let statuses: Vec<_> = history.iter().map(|d| (d.date, d.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (day(10), DayStatus::Over),
            (day(9), DayStatus::Good),
            (day(8), DayStatus::Excellent),
            (day(7), DayStatus::Excellent),
        ]
    );
}

#[test]
fn test_daily_series_is_oldest_first() {
    let records = vec![record_on(day(9), 420.0), record_on(day(10), 120.0)];
    let series = growth::daily_series(&records, day(10), 3);
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].date, day(8));
    assert_eq!(series[0].calories, 0.0);
    assert!(!series[0].low_cal);
    assert_eq!(series[1].calories, 420.0);
    assert!(!series[1].low_cal);
    assert!(series[2].low_cal);
}

#[test]
fn test_category_distribution() {
    let records = vec![
        record_on(day(1), 200.0),
        record_on(day(2), 349.0),
        record_on(day(3), 350.0),
        record_on(day(4), 500.0),
    ];
    let shares = growth::category_distribution(&records);
    let by_category: Vec<_> = shares.iter().map(|s| (s.category, s.count, s.percent)).collect();
    assert_eq!(
        by_category,
        vec![
            (CalorieCategory::Low, 2, 50),
            (CalorieCategory::Medium, 1, 25),
            (CalorieCategory::High, 1, 25),
        ]
    );
}

#[test]
fn test_week_over_week_improvement() {
    let today = day(14);
    let mut records = Vec::new();
    // Last week: 7 x 400
    for offset in 7..14 {
        records.push(record_on(today - Duration::days(offset), 400.0));
    }
    // This week: 7 x 300
    for offset in 0..7 {
        records.push(record_on(today - Duration::days(offset), 300.0));
    }

    let summary = growth::summarize(&records, today);
    assert_eq!(summary.last_week_average, 400.0);
    assert_eq!(summary.current_week_average, 300.0);
    assert_eq!(summary.improvement_percent, 25);
    assert_eq!(summary.low_cal_share_percent, 100);
    assert_eq!(summary.streak_days, 14);
    assert_eq!(summary.days_to_monthly_goal, 16);
}

#[test]
fn test_empty_last_week_means_no_improvement() {
    let records = vec![record_on(day(10), 300.0)];
    let summary = growth::summarize(&records, day(10));
    assert_eq!(summary.improvement_percent, 0);
    assert_eq!(summary.streak_days, 1);
}

#[test]
fn test_streak_breaks_on_missing_today() {
    let records = vec![record_on(day(8), 300.0), record_on(day(9), 300.0)];
    assert_eq!(growth::summarize(&records, day(10)).streak_days, 0);
    assert_eq!(growth::summarize(&records, day(9)).streak_days, 2);
}
