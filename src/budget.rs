//! Daily and weekly calorie budgets.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::growth::{self, week_start};
use crate::models::ConsumptionRecord;
use crate::storage::{self, keys, KeyValueStore};
use crate::validation::InputValidator;

/// Default daily budget in kcal
pub const DEFAULT_DAILY_KCAL: u32 = 300;
/// Default weekly budget in kcal
pub const DEFAULT_WEEKLY_KCAL: u32 = 1500;
/// Lowest daily budget the settings allow
pub const MIN_DAILY_KCAL: u32 = 100;
/// Lowest weekly budget the settings allow
pub const MIN_WEEKLY_KCAL: u32 = 500;
/// Daily adjustment step
pub const DAILY_STEP_KCAL: u32 = 50;
/// Weekly adjustment step
pub const WEEKLY_STEP_KCAL: u32 = 200;

/// Share of the budget at or below which a day counts as excellent
const EXCELLENT_RATIO: f64 = 0.6;

/// User-adjustable budget limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSettings {
    /// Daily budget in kcal
    pub daily_kcal: u32,
    /// Weekly budget in kcal
    pub weekly_kcal: u32,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            daily_kcal: DEFAULT_DAILY_KCAL,
            weekly_kcal: DEFAULT_WEEKLY_KCAL,
        }
    }
}

impl BudgetSettings {
    /// Create settings, enforcing the floors
    pub fn new(daily_kcal: u32, weekly_kcal: u32) -> Result<Self> {
        let settings = Self {
            daily_kcal,
            weekly_kcal,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the floors
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_budget(self.daily_kcal, MIN_DAILY_KCAL)?;
        InputValidator::validate_budget(self.weekly_kcal, MIN_WEEKLY_KCAL)
    }

    /// Raise the daily budget by one step
    pub fn increase_daily(&mut self) {
        self.daily_kcal = self.daily_kcal.saturating_add(DAILY_STEP_KCAL);
    }

    /// Lower the daily budget by one step, not below the floor
    pub fn decrease_daily(&mut self) {
        self.daily_kcal = self.daily_kcal.saturating_sub(DAILY_STEP_KCAL).max(MIN_DAILY_KCAL);
    }

    /// Raise the weekly budget by one step
    pub fn increase_weekly(&mut self) {
        self.weekly_kcal = self.weekly_kcal.saturating_add(WEEKLY_STEP_KCAL);
    }

    /// Lower the weekly budget by one step, not below the floor
    pub fn decrease_weekly(&mut self) {
        self.weekly_kcal = self
            .weekly_kcal
            .saturating_sub(WEEKLY_STEP_KCAL)
            .max(MIN_WEEKLY_KCAL);
    }

    /// Load stored settings, falling back to `defaults`
    pub fn load(store: &dyn KeyValueStore, defaults: Self) -> Result<Self> {
        Ok(storage::get_json(store, keys::BUDGET_SETTINGS)?.unwrap_or(defaults))
    }

    /// Persist these settings
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        self.validate()?;
        storage::set_json(store, keys::BUDGET_SETTINGS, self)?;
        info!(daily_kcal = self.daily_kcal, weekly_kcal = self.weekly_kcal, "Budget settings saved");
        Ok(())
    }
}

/// Consumption against one budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetPeriod {
    /// kcal consumed in the period
    pub consumed: f64,
    /// Budget for the period
    pub budget: u32,
    /// `budget - consumed`; negative when over budget
    pub remaining: f64,
    /// Rounded usage percentage
    pub usage_percent: u32,
    /// True when consumption exceeds the budget
    pub over_budget: bool,
}

impl BudgetPeriod {
    fn new(consumed: f64, budget: u32) -> Self {
        let budget_kcal = f64::from(budget);
        let usage = if budget == 0 {
            0.0
        } else {
            consumed / budget_kcal * 100.0
        };
        Self {
            consumed,
            budget,
            remaining: budget_kcal - consumed,
            usage_percent: usage.round() as u32,
            over_budget: consumed > budget_kcal,
        }
    }

    /// Usage capped at 100 for progress bars
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        self.usage_percent.min(100)
    }
}

/// Rating of one day against the daily budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// At most 60% of the budget
    Excellent,
    /// Within budget
    Good,
    /// Over budget
    Over,
}

impl DayStatus {
    /// Rate a day's consumption
    #[must_use]
    pub fn rate(consumed: f64, budget: u32) -> Self {
        let budget = f64::from(budget);
        if consumed <= budget * EXCELLENT_RATIO {
            Self::Excellent
        } else if consumed <= budget {
            Self::Good
        } else {
            Self::Over
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Over => "over",
        }
    }
}

/// One row of the budget history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetDay {
    /// Calendar day
    pub date: NaiveDate,
    /// kcal consumed
    pub consumed: f64,
    /// Daily budget
    pub budget: u32,
    /// Rating
    pub status: DayStatus,
}

/// Budget figures over a slice of records
#[derive(Debug, Clone, Copy)]
pub struct BudgetTracker<'a> {
    records: &'a [ConsumptionRecord],
    settings: BudgetSettings,
}

impl<'a> BudgetTracker<'a> {
    /// Track `records` against `settings`
    #[must_use]
    pub const fn new(records: &'a [ConsumptionRecord], settings: BudgetSettings) -> Self {
        Self { records, settings }
    }

    fn consumed_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        growth::records_between(self.records, start, end)
            .map(|r| r.drink_ref.calories)
            .sum()
    }

    /// Consumption on `today` against the daily budget
    #[must_use]
    pub fn today(&self, today: NaiveDate) -> BudgetPeriod {
        BudgetPeriod::new(self.consumed_between(today, today), self.settings.daily_kcal)
    }

    /// Consumption over the week ending on `today` against the weekly budget
    #[must_use]
    pub fn week(&self, today: NaiveDate) -> BudgetPeriod {
        BudgetPeriod::new(
            self.consumed_between(week_start(today), today),
            self.settings.weekly_kcal,
        )
    }

    /// One row per day for the `days` days ending on `today`, newest first
    #[must_use]
    pub fn history(&self, today: NaiveDate, days: u32) -> Vec<BudgetDay> {
        let totals = growth::daily_totals(self.records);
        (0..i64::from(days))
            .map(|offset| {
                let date = today - Duration::days(offset);
                let consumed = totals.get(&date).copied().unwrap_or(0.0);
                BudgetDay {
                    date,
                    consumed,
                    budget: self.settings.daily_kcal,
                    status: DayStatus::rate(consumed, self.settings.daily_kcal),
                }
            })
            .collect()
    }
}
