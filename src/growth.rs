//! Growth dashboard figures computed from the journal.
//!
//! Records are bucketed by the local calendar day of their timestamp. A
//! "week" is the seven days ending on the reference date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{CalorieCategory, ConsumptionRecord};

/// Days in a dashboard week
pub const WEEK_DAYS: i64 = 7;
/// Target for the monthly recording streak
pub const MONTHLY_STREAK_GOAL: u32 = 30;

/// Local calendar day of a timestamp
#[must_use]
pub fn local_day(timestamp: &DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

/// Total kcal per day that has records
#[must_use]
pub fn daily_totals(records: &[ConsumptionRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(local_day(&record.timestamp)).or_insert(0.0) += record.drink_ref.calories;
    }
    totals
}

/// Days that have at least one record
#[must_use]
pub fn recorded_days(records: &[ConsumptionRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(|r| local_day(&r.timestamp)).collect()
}

/// Records whose day falls in `[start, end]`
pub fn records_between(
    records: &[ConsumptionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = &ConsumptionRecord> {
    records.iter().filter(move |r| {
        let day = local_day(&r.timestamp);
        day >= start && day <= end
    })
}

/// First day of the week ending on `today`
#[must_use]
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WEEK_DAYS - 1)
}

/// Consecutive recorded days ending on `today` (0 if `today` has none)
#[must_use]
pub fn streak_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive days in `days`
#[must_use]
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// The day a run of consecutive days first reached `length`
#[must_use]
pub fn first_day_reaching_streak(days: &BTreeSet<NaiveDate>, length: u32) -> Option<NaiveDate> {
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        if run >= length {
            return Some(day);
        }
        previous = Some(day);
    }
    None
}

/// One point of the daily calorie chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    /// Calendar day
    pub date: NaiveDate,
    /// Total kcal that day
    pub calories: f64,
    /// True when something was recorded and the day's total is in the low tier
    pub low_cal: bool,
}

/// Share of records in one calorie tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// Calorie tier
    pub category: CalorieCategory,
    /// Records in this tier
    pub count: usize,
    /// Rounded percentage of all records
    pub percent: u32,
}

/// Headline numbers for the dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    /// Average kcal per day over the current week
    pub current_week_average: f64,
    /// Average kcal per day over the previous week
    pub last_week_average: f64,
    /// Reduction versus last week, in percent (negative means increase)
    pub improvement_percent: i64,
    /// Percentage of low-tier records this week
    pub low_cal_share_percent: u32,
    /// Current recording streak
    pub streak_days: u32,
    /// Days left until the monthly streak goal
    pub days_to_monthly_goal: u32,
}

/// Per-day totals for the `days` days ending on `today`, oldest first
#[must_use]
pub fn daily_series(records: &[ConsumptionRecord], today: NaiveDate, days: u32) -> Vec<DailyPoint> {
    let totals = daily_totals(records);
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let calories = totals.get(&date).copied().unwrap_or(0.0);
            DailyPoint {
                date,
                calories,
                low_cal: calories > 0.0 && CalorieCategory::from_kcal(calories) == CalorieCategory::Low,
            }
        })
        .collect()
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

/// Distribution of records over the calorie tiers
#[must_use]
pub fn category_distribution<'a, I>(records: I) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a ConsumptionRecord>,
{
    let mut counts: BTreeMap<CalorieCategory, usize> = BTreeMap::new();
    let mut total = 0;
    for record in records {
        *counts.entry(record.category()).or_insert(0) += 1;
        total += 1;
    }
    CalorieCategory::all()
        .into_iter()
        .map(|category| {
            let count = counts.get(&category).copied().unwrap_or(0);
            CategoryShare {
                category,
                count,
                percent: percent(count, total),
            }
        })
        .collect()
}

/// Average kcal per day over the week ending on `end`
#[must_use]
pub fn week_average(records: &[ConsumptionRecord], end: NaiveDate) -> f64 {
    let total: f64 = records_between(records, week_start(end), end)
        .map(|r| r.drink_ref.calories)
        .sum();
    total / WEEK_DAYS as f64
}

/// Compute the dashboard summary
#[must_use]
pub fn summarize(records: &[ConsumptionRecord], today: NaiveDate) -> GrowthSummary {
    let current = week_average(records, today);
    let last = week_average(records, today - Duration::days(WEEK_DAYS));
    let improvement_percent = if last > 0.0 {
        ((last - current) / last * 100.0).round() as i64
    } else {
        0
    };

    let this_week: Vec<&ConsumptionRecord> =
        records_between(records, week_start(today), today).collect();
    let low = this_week
        .iter()
        .filter(|r| r.category() == CalorieCategory::Low)
        .count();

    let streak = streak_days(&recorded_days(records), today);
    GrowthSummary {
        current_week_average: current,
        last_week_average: last,
        improvement_percent,
        low_cal_share_percent: percent(low, this_week.len()),
        streak_days: streak,
        days_to_monthly_goal: MONTHLY_STREAK_GOAL.saturating_sub(streak),
    }
}
