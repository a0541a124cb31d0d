//! Application state shared by every command.
//!
//! Everything is loaded once in [`AppState::open`]; each mutating
//! operation persists only the key it owns.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::info;

use crate::achievements::{self, Achievement, AchievementContext, WeeklyGoal};
use crate::auth::ProfileStore;
use crate::budget::{BudgetSettings, BudgetTracker};
use crate::calculator::{CalorieBreakdown, CalorieCalculator, CalorieInput};
use crate::catalog;
use crate::config::AppConfig;
use crate::error::Result;
use crate::growth::{self, GrowthSummary};
use crate::metrics::MetricsCollector;
use crate::records::RecordsStore;
use crate::search::DrinkSearch;
use crate::storage::{self, keys, KeyValueStore, SledStore};

/// Loaded stores plus the services built on them
pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    /// Calorie calculator with the injected ingredient table
    pub calculator: CalorieCalculator,
    /// Users and session
    pub profiles: ProfileStore,
    /// Consumption journal
    pub records: RecordsStore,
    /// Debounced catalog search
    pub search: DrinkSearch,
    budget: BudgetSettings,
    metrics: MetricsCollector,
}

impl AppState {
    /// Load every collection from `store`
    pub fn open(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Result<Self> {
        let defaults = BudgetSettings::new(config.budget.daily_kcal, config.budget.weekly_kcal)?;
        let calculator = CalorieCalculator::new(catalog::default_ingredient_table())
            .with_exercise_rate(config.calculator.kcal_per_exercise_minute);
        let search = DrinkSearch::new(
            Duration::from_millis(config.search.debounce_ms),
            config.search.max_results,
        );

        Ok(Self {
            profiles: ProfileStore::load(Arc::clone(&store))?,
            records: RecordsStore::load(Arc::clone(&store))?,
            budget: BudgetSettings::load(store.as_ref(), defaults)?,
            store,
            calculator,
            search,
            metrics: MetricsCollector::default(),
        })
    }

    /// Open the sled database named by the config
    pub fn open_sled(config: &AppConfig) -> Result<Self> {
        let path = config.get_storage_path();
        let store = SledStore::open(&path, config.storage.flush_on_write)?;
        Self::open(Arc::new(store), config)
    }

    /// The backing store
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Run the calorie calculator
    pub fn calculate(&self, input: &CalorieInput) -> CalorieBreakdown {
        self.metrics.record_calculation();
        self.calculator.calculate(input)
    }

    /// Current budget settings
    #[must_use]
    pub const fn budget(&self) -> BudgetSettings {
        self.budget
    }

    /// Replace and persist the budget settings
    pub fn set_budget(&mut self, settings: BudgetSettings) -> Result<()> {
        settings.save(self.store.as_ref())?;
        self.budget = settings;
        Ok(())
    }

    /// Budget figures over the journal
    #[must_use]
    pub fn budget_tracker(&self) -> BudgetTracker<'_> {
        BudgetTracker::new(self.records.list(), self.budget)
    }

    /// Times the journal has been shared
    pub fn share_count(&self) -> Result<u32> {
        Ok(storage::get_json(self.store.as_ref(), keys::SHARE_COUNT)?.unwrap_or(0))
    }

    /// Count one share and return the new total
    pub fn share(&self) -> Result<u32> {
        let count = self.share_count()?.saturating_add(1);
        storage::set_json(self.store.as_ref(), keys::SHARE_COUNT, &count)?;
        self.metrics.record_share();
        info!(share_count = count, "Journal shared");
        Ok(count)
    }

    /// Dashboard summary for `today`
    #[must_use]
    pub fn growth(&self, today: NaiveDate) -> GrowthSummary {
        let summary = growth::summarize(self.records.list(), today);
        let usage = self.budget_tracker().today(today).usage_percent;
        self.metrics.set_daily_budget_usage(f64::from(usage));
        summary
    }

    fn achievement_context(&self, today: NaiveDate) -> Result<AchievementContext<'_>> {
        Ok(AchievementContext {
            records: self.records.list(),
            daily_budget_kcal: self.budget.daily_kcal,
            share_count: self.share_count()?,
            today,
        })
    }

    /// Evaluate every achievement as of `today`
    pub fn achievements(&self, today: NaiveDate) -> Result<Vec<Achievement>> {
        Ok(achievements::evaluate(&self.achievement_context(today)?))
    }

    /// This week's goals as of `today`
    pub fn weekly_goals(&self, today: NaiveDate) -> Result<Vec<WeeklyGoal>> {
        Ok(achievements::weekly_goals(&self.achievement_context(today)?))
    }
}
