use std::time::Duration;

use anyhow::Result;
use metrics::{counter, gauge, histogram};

/// Metric names emitted by the tracker
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Account metrics
    pub registrations_total: &'static str,
    pub logins_total: &'static str,

    // Journal metrics
    pub records_appended_total: &'static str,
    pub record_calories: &'static str,
    pub shares_total: &'static str,

    // Calculator and search metrics
    pub calculations_total: &'static str,
    pub searches_total: &'static str,
    pub searches_superseded_total: &'static str,

    // Budget metrics
    pub daily_budget_usage: &'static str,

    // Timing
    pub operation_duration: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            registrations_total: "teacal_registrations_total",
            logins_total: "teacal_logins_total",

            records_appended_total: "teacal_records_appended_total",
            record_calories: "teacal_record_calories_kcal",
            shares_total: "teacal_shares_total",

            calculations_total: "teacal_calculations_total",
            searches_total: "teacal_searches_total",
            searches_superseded_total: "teacal_searches_superseded_total",

            daily_budget_usage: "teacal_daily_budget_usage_percent",

            operation_duration: "teacal_operation_duration_seconds",
        }
    }
}

impl MetricsCollector {
    /// Install a no-op recorder so macros are cheap when nothing exports them
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;
        Ok(())
    }

    /// Record a completed registration
    pub fn record_registration(&self) {
        counter!(self.registrations_total).increment(1);
    }

    /// Record a login attempt by outcome
    pub fn record_login(&self, outcome: &'static str) {
        counter!(self.logins_total, "outcome" => outcome).increment(1);
    }

    /// Record a journal entry
    pub fn record_append(&self, mood: &'static str, kcal: f64) {
        counter!(self.records_appended_total, "mood" => mood).increment(1);
        histogram!(self.record_calories).record(kcal);
    }

    /// Record a journal share
    pub fn record_share(&self) {
        counter!(self.shares_total).increment(1);
    }

    /// Record a calculator run
    pub fn record_calculation(&self) {
        counter!(self.calculations_total).increment(1);
    }

    /// Record a search and whether a newer keystroke superseded it
    pub fn record_search(&self, superseded: bool) {
        counter!(self.searches_total).increment(1);
        if superseded {
            counter!(self.searches_superseded_total).increment(1);
        }
    }

    /// Update today's budget usage
    pub fn set_daily_budget_usage(&self, percent: f64) {
        gauge!(self.daily_budget_usage).set(percent);
    }

    /// Record how long an operation took
    pub fn record_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(self.operation_duration, "operation" => operation).record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.logins_total, "teacal_logins_total");
    }

    #[test]
    fn test_recording_without_recorder_is_harmless() {
        let collector = MetricsCollector::default();
        collector.record_login("success");
        collector.record_append("happy", 176.0);
        collector.record_search(true);
        collector.record_duration("calc", Duration::from_millis(3));
    }
}
