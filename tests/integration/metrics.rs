//! Load metrics and benchmark integration tests

use crate::helpers::*;
use plughost::plugin::{LoadStage, HISTORY_CAPACITY};
use plughost::prelude::*;

#[tokio::test]
async fn test_history_is_bounded_newest_first() {
    let mut host = test_host();
    let mut last = None;
    for _ in 0..60 {
        last = Some(host.load_plugin(&gain_descriptor(), false).await.unwrap());
    }

    assert_eq!(host.metrics().len(), HISTORY_CAPACITY);
    assert_eq!(host.metrics().latest(), last.as_ref());

    host.clear_metrics();
    assert!(host.metrics().is_empty());
    assert!(host.metrics().summary().is_none());
}

#[tokio::test]
async fn test_total_covers_every_phase() {
    let mut host = test_host();
    let metrics = host.load_plugin(&gain_descriptor(), true).await.unwrap();

    assert!(metrics.succeeded());
    assert!(metrics.out_of_process);
    assert_eq!(metrics.plugin_name, "Gain");
    for (_, elapsed) in metrics.phases() {
        assert!(metrics.total >= elapsed);
    }
    assert!(metrics.total >= metrics.phase_sum());
    assert!(metrics.summary().starts_with("Total: "));
}

#[tokio::test]
async fn test_failed_load_is_recorded() {
    let mut host = test_host();
    host.load_plugin(&broken_descriptor(), false).await.unwrap_err();

    let latest = host.metrics().latest().unwrap();
    assert_eq!(latest.failure, Some(LoadStage::Instantiate));
    assert_eq!(latest.plugin_name, "Broken");

    let summary = host.metrics().summary().unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.failures, 1);
}

#[tokio::test]
async fn test_benchmark_runs() {
    let mut host = test_host();
    let config = BenchmarkConfig::default()
        .iterations(5)
        .settle_delay(Duration::ZERO)
        .out_of_process(false);

    let report = host.benchmark(&gain_descriptor(), &config).await;
    assert_eq!(report.plugin_name, "Gain");
    assert_eq!(report.runs.len(), 5);
    assert_eq!(report.failures, 0);
    assert!(report.average_total.is_some());
    assert!(report.average_phase(LoadStage::Instantiate).is_some());
    assert_eq!(host.metrics().len(), 5);
    assert_eq!(host.state(), LifecycleState::Ready);
}

#[tokio::test]
async fn test_benchmark_counts_failures() {
    let mut host = test_host();
    let config = BenchmarkConfig::default()
        .iterations(3)
        .settle_delay(Duration::ZERO);

    let report = host.benchmark(&broken_descriptor(), &config).await;
    assert_eq!(report.runs.len(), 3);
    assert_eq!(report.failures, 3);
    assert_eq!(report.successes(), 0);
    assert_eq!(report.average_total, None);
    assert_eq!(host.state(), LifecycleState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_benchmark_settles_between_runs() {
    let mut host = test_host();
    let config = BenchmarkConfig::default()
        .iterations(3)
        .settle_delay(Duration::from_millis(500))
        .out_of_process(false);

    let start = tokio::time::Instant::now();
    let report = host.benchmark(&gain_descriptor(), &config).await;
    assert_eq!(report.successes(), 3);
    assert!(start.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_report_serializes() {
    let mut host = test_host();
    let config = BenchmarkConfig::default()
        .iterations(2)
        .settle_delay(Duration::ZERO)
        .out_of_process(false);

    let report = host.benchmark(&gain_descriptor(), &config).await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["plugin_name"], "Gain");
    assert_eq!(json["failures"], 0);
    assert_eq!(json["runs"].as_array().unwrap().len(), 2);
    assert!(json["runs"][0]["failure"].is_null());
}
