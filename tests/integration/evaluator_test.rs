#![allow(clippy::expect_used)]

use chrono::Utc;
use uuid::Uuid;

use devhealth::application::config::AppConfig;
use devhealth::domain::entities::sample::{NetworkStatus, Sample};
use devhealth::domain::entities::verdict::HealthStatus;
use devhealth::domain::evaluator::ThresholdEvaluator;
use devhealth::domain::value_objects::thresholds::ThresholdSet;

fn sample(cpu: f64, temperature: f64, memory: f64, disk: f64) -> Sample {
    Sample {
        timestamp: Utc::now(),
        device_id: Uuid::new_v4(),
        cpu_usage: cpu,
        memory_usage: memory,
        disk_usage: disk,
        temperature,
        network_status: NetworkStatus::Unavailable,
    }
}

#[test]
fn every_breach_is_reported_in_fixed_order() {
    let verdict = ThresholdEvaluator::evaluate(
        &sample(95.0, 85.0, 92.0, 97.0),
        &ThresholdSet::default(),
    );
    assert_eq!(verdict.status, HealthStatus::Critical);
    assert_eq!(
        verdict.violations,
        vec![
            "High CPU Usage: 95%",
            "High CPU Temperature: 85°C",
            "High Memory Usage: 92%",
            "High Disk Usage: 97%",
        ]
    );
    assert_eq!(
        verdict.notification_payload().as_deref(),
        Some("High CPU Usage: 95%\nHigh CPU Temperature: 85°C\nHigh Memory Usage: 92%\nHigh Disk Usage: 97%")
    );
}

#[test]
fn limits_are_exclusive() {
    let verdict = ThresholdEvaluator::evaluate(
        &sample(90.0, 80.0, 90.0, 90.0),
        &ThresholdSet::default(),
    );
    assert_eq!(verdict.status, HealthStatus::Healthy);
    assert!(verdict.notification_payload().is_none());
}

#[test]
fn network_status_never_affects_the_verdict() {
    let mut quiet = sample(10.0, 40.0, 10.0, 10.0);
    quiet.network_status = NetworkStatus::Skipped;
    assert_eq!(
        ThresholdEvaluator::evaluate(&quiet, &ThresholdSet::default()).status,
        HealthStatus::Healthy
    );
}

#[test]
fn thresholds_from_config_file_drive_evaluation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[thresholds]\ncpu_usage = 50\nmemory_usage = 60\ntemperature = 70\n",
    )
    .expect("write config");

    let config = AppConfig::load_from(&path).expect("load");
    let settings = config.validate().expect("valid");
    assert!((settings.thresholds.disk_usage - 90.0).abs() < f64::EPSILON);

    let verdict = ThresholdEvaluator::evaluate(&sample(55.0, 65.0, 61.0, 20.0), &settings.thresholds);
    assert_eq!(
        verdict.violations,
        vec!["High CPU Usage: 55%", "High Memory Usage: 61%"]
    );
}

#[test]
fn temperature_sentinel_never_breaches() {
    let thresholds = ThresholdSet {
        temperature: 0.0,
        ..ThresholdSet::default()
    };
    let verdict = ThresholdEvaluator::evaluate(&sample(10.0, 0.0, 10.0, 10.0), &thresholds);
    assert_eq!(verdict.status, HealthStatus::Healthy);
}
