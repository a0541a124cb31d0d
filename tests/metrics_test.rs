//! Unit tests for metrics.rs module

use std::time::Duration;
use teacal::logging::OperationTimer;
use teacal::metrics::MetricsCollector;

#[test]
fn test_metric_names_share_prefix() {
    let collector = MetricsCollector::default();
    let names = [
        collector.registrations_total,
        collector.logins_total,
        collector.records_appended_total,
        collector.record_calories,
        collector.shares_total,
        collector.calculations_total,
        collector.searches_total,
        collector.searches_superseded_total,
        collector.daily_budget_usage,
        collector.operation_duration,
    ];
    assert!(names.iter().all(|n| n.starts_with("teacal_")));
}

#[test]
fn test_metrics_initialization() {
    // Only one global recorder may be installed per process
    assert!(MetricsCollector::init().is_ok());
    assert!(MetricsCollector::init().is_err());
}

#[test]
fn test_recording_every_metric() {
    let collector = MetricsCollector::default();
    collector.record_registration();
    collector.record_login("invalid_credentials");
    collector.record_append("celebrating", 420.0);
    collector.record_share();
    collector.record_calculation();
    collector.record_search(false);
    collector.set_daily_budget_usage(58.0);
    collector.record_duration("append", Duration::from_millis(1));
}

#[test]
fn test_operation_timer_records_duration() {
    let timer = OperationTimer::new("metrics_test").with_metrics(MetricsCollector::default());
    let elapsed = timer.finish();
    assert!(elapsed < Duration::from_secs(5));
}
