//! Achievement badges and weekly goals derived from the journal.
//!
//! Nothing here is persisted: every call re-evaluates the rules against the
//! records, the daily budget and the share counter.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::growth::{self, local_day, week_start, WEEK_DAYS};
use crate::models::{CalorieCategory, ConsumptionRecord};

/// Achievement grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// Recording habits
    Record,
    /// Healthy choices
    Health,
    /// Sharing
    Social,
    /// Long-term milestones
    Milestone,
}

impl AchievementCategory {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Health => "health",
            Self::Social => "social",
            Self::Milestone => "milestone",
        }
    }
}

/// An evaluated achievement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    /// Stable id
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// What it takes
    pub description: &'static str,
    /// Emoji icon
    pub icon: &'static str,
    /// Grouping
    pub category: AchievementCategory,
    /// True once unlocked
    pub completed: bool,
    /// Progress toward `max_progress`
    pub progress: u32,
    /// Target value
    pub max_progress: u32,
    /// What unlocking grants
    pub reward: &'static str,
    /// Day the achievement was unlocked, when known
    pub completed_date: Option<NaiveDate>,
}

/// A small goal for the current week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyGoal {
    /// Stable id
    pub id: u32,
    /// Display title
    pub title: &'static str,
    /// Progress so far, capped at `max`
    pub progress: u32,
    /// Target value
    pub max: u32,
    /// What finishing grants
    pub reward: &'static str,
}

impl WeeklyGoal {
    /// True once the target is met
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.progress >= self.max
    }
}

/// Completion overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementSummary {
    /// Unlocked achievements
    pub completed: usize,
    /// All achievements
    pub total: usize,
    /// Rounded completion percentage
    pub percent: u32,
}

/// Everything the rules look at
#[derive(Debug, Clone, Copy)]
pub struct AchievementContext<'a> {
    /// Journal records
    pub records: &'a [ConsumptionRecord],
    /// Daily budget in kcal
    pub daily_budget_kcal: u32,
    /// Times the journal was shared
    pub share_count: u32,
    /// Reference day
    pub today: NaiveDate,
}

const LOW_CAL_SHARE_TARGET: f64 = 0.6;
const HEALTHY_SHIFT_RATIO: f64 = 0.8;
const BUDGET_MASTER_DAYS: u32 = 14;
const SHARE_TARGET: u32 = 5;
const BRAND_TARGET: u32 = 10;

fn capped(value: usize, max: u32) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX).min(max)
}

fn is_low(record: &ConsumptionRecord) -> bool {
    record.category() == CalorieCategory::Low
}

fn average_kcal<'r>(records: impl Iterator<Item = &'r ConsumptionRecord>) -> Option<f64> {
    let (sum, count) = records.fold((0.0, 0usize), |(sum, count), r| {
        (sum + r.drink_ref.calories, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}

impl AchievementContext<'_> {
    fn sorted_records(&self) -> Vec<&ConsumptionRecord> {
        let mut sorted: Vec<&ConsumptionRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.timestamp);
        sorted
    }

    /// First day a trailing 7-day window had more than 60% low-tier records
    fn low_cal_week_day(&self, days: &BTreeSet<NaiveDate>) -> Option<NaiveDate> {
        days.iter().copied().find(|&day| {
            let window: Vec<&ConsumptionRecord> =
                growth::records_between(self.records, week_start(day), day).collect();
            let low = window.iter().filter(|r| is_low(r)).count();
            !window.is_empty() && low as f64 / window.len() as f64 > LOW_CAL_SHARE_TARGET
        })
    }

    /// Longest and first-completing run of days within the daily budget,
    /// counted from the first recorded day through `today`
    fn budget_runs(&self, days: &BTreeSet<NaiveDate>) -> (u32, Option<NaiveDate>) {
        let Some(&first) = days.iter().next() else {
            return (0, None);
        };
        let totals = growth::daily_totals(self.records);
        let budget = f64::from(self.daily_budget_kcal);

        let mut run = 0;
        let mut longest = 0;
        let mut reached = None;
        let mut day = first;
        while day <= self.today {
            if totals.get(&day).copied().unwrap_or(0.0) <= budget {
                run += 1;
            } else {
                run = 0;
            }
            longest = u32::max(longest, run);
            if run >= BUDGET_MASTER_DAYS && reached.is_none() {
                reached = Some(day);
            }
            day += Duration::days(1);
        }
        (longest, reached)
    }

    /// Day the tenth distinct brand was recorded, and the distinct brand count
    fn brand_exploration(&self) -> (usize, Option<NaiveDate>) {
        let mut brands: HashSet<&str> = HashSet::new();
        let mut reached = None;
        for record in self.sorted_records() {
            brands.insert(record.drink_ref.brand.as_str());
            if reached.is_none() && brands.len() >= BRAND_TARGET as usize {
                reached = Some(local_day(&record.timestamp));
            }
        }
        (brands.len(), reached)
    }

    /// True when the last 7 days average at least 20% fewer kcal per record
    /// than the first 7 days of recording
    fn healthy_shift(&self, days: &BTreeSet<NaiveDate>) -> bool {
        let Some(&first) = days.iter().next() else {
            return false;
        };
        let first_week_end = first + Duration::days(WEEK_DAYS - 1);
        if week_start(self.today) <= first_week_end {
            return false;
        }
        let first_avg = average_kcal(growth::records_between(self.records, first, first_week_end));
        let recent_avg = average_kcal(growth::records_between(
            self.records,
            week_start(self.today),
            self.today,
        ));
        match (first_avg, recent_avg) {
            (Some(baseline), Some(recent)) => recent <= baseline * HEALTHY_SHIFT_RATIO,
            _ => false,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn achievement(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    category: AchievementCategory,
    progress: u32,
    max_progress: u32,
    reward: &'static str,
    completed_date: Option<NaiveDate>,
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        icon,
        category,
        completed: progress >= max_progress,
        progress: progress.min(max_progress),
        max_progress,
        reward,
        completed_date,
    }
}

/// Evaluate every achievement
#[must_use]
pub fn evaluate(ctx: &AchievementContext<'_>) -> Vec<Achievement> {
    let days = growth::recorded_days(ctx.records);
    let longest = growth::longest_streak(&days);
    let first_day = days.iter().next().copied();
    let low_cal_day = ctx.low_cal_week_day(&days);
    let (budget_run, budget_day) = ctx.budget_runs(&days);
    let (brand_count, brand_day) = ctx.brand_exploration();
    let shifted = ctx.healthy_shift(&days);

    vec![
        achievement(
            "first-record",
            "记录新手",
            "完成第一次奶茶记录",
            "📝",
            AchievementCategory::Record,
            capped(ctx.records.len(), 1),
            1,
            "奶茶贴纸 x1",
            first_day,
        ),
        achievement(
            "streak-7",
            "连续记录7天",
            "连续7天记录奶茶摄入",
            "🔥",
            AchievementCategory::Record,
            longest,
            7,
            "专属称号：记录达人",
            growth::first_day_reaching_streak(&days, 7),
        ),
        achievement(
            "low-cal-chooser",
            "低卡选择者",
            "单周低卡选择占比超过60%",
            "💚",
            AchievementCategory::Health,
            u32::from(low_cal_day.is_some()),
            1,
            "健康徽章",
            low_cal_day,
        ),
        achievement(
            "budget-master",
            "热量控制大师",
            "连续14天保持在预算范围内",
            "🎯",
            AchievementCategory::Health,
            budget_run,
            BUDGET_MASTER_DAYS,
            "专属称号：控制大师",
            budget_day,
        ),
        achievement(
            "sharer",
            "分享达人",
            "分享奶茶日记到社交平台5次",
            "📱",
            AchievementCategory::Social,
            ctx.share_count,
            SHARE_TARGET,
            "分享专属贴纸包",
            None,
        ),
        achievement(
            "streak-30",
            "月度坚持",
            "连续记录30天",
            "🏆",
            AchievementCategory::Milestone,
            longest,
            growth::MONTHLY_STREAK_GOAL,
            "月度成就证书",
            growth::first_day_reaching_streak(&days, growth::MONTHLY_STREAK_GOAL),
        ),
        achievement(
            "brand-explorer",
            "品牌探索家",
            "尝试记录10个不同品牌的奶茶",
            "🌟",
            AchievementCategory::Milestone,
            capped(brand_count, BRAND_TARGET),
            BRAND_TARGET,
            "探索者徽章",
            brand_day,
        ),
        achievement(
            "healthy-shift",
            "健康转变",
            "平均热量比第一周降低20%",
            "📈",
            AchievementCategory::Health,
            u32::from(shifted),
            1,
            "转变成就徽章",
            shifted.then_some(ctx.today),
        ),
    ]
}

/// Weekly goals for the week ending on `ctx.today`
#[must_use]
pub fn weekly_goals(ctx: &AchievementContext<'_>) -> Vec<WeeklyGoal> {
    let start = week_start(ctx.today);
    let this_week: Vec<&ConsumptionRecord> =
        growth::records_between(ctx.records, start, ctx.today).collect();

    let recorded_days: BTreeSet<NaiveDate> =
        this_week.iter().map(|r| local_day(&r.timestamp)).collect();
    let low_count = this_week.iter().filter(|r| is_low(r)).count();

    let earlier_brands: HashSet<&str> = ctx
        .records
        .iter()
        .filter(|r| local_day(&r.timestamp) < start)
        .map(|r| r.drink_ref.brand.as_str())
        .collect();
    let new_brands: HashSet<&str> = this_week
        .iter()
        .map(|r| r.drink_ref.brand.as_str())
        .filter(|brand| !earlier_brands.contains(brand))
        .collect();

    vec![
        WeeklyGoal {
            id: 1,
            title: "记录5天奶茶",
            progress: capped(recorded_days.len(), 5),
            max: 5,
            reward: "奶茶贴纸",
        },
        WeeklyGoal {
            id: 2,
            title: "低卡选择3次",
            progress: capped(low_count, 3),
            max: 3,
            reward: "健康徽章",
        },
        WeeklyGoal {
            id: 3,
            title: "尝试新品牌",
            progress: capped(new_brands.len(), 1),
            max: 1,
            reward: "探索贴纸",
        },
    ]
}

/// Completed/total overview
#[must_use]
pub fn summarize(achievements: &[Achievement]) -> AchievementSummary {
    let completed = achievements.iter().filter(|a| a.completed).count();
    let total = achievements.len();
    let percent = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    };
    AchievementSummary {
        completed,
        total,
        percent,
    }
}

/// Achievements of one category
#[must_use]
pub fn filter_by_category(
    achievements: &[Achievement],
    category: AchievementCategory,
) -> Vec<&Achievement> {
    achievements.iter().filter(|a| a.category == category).collect()
}
