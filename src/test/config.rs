use super::probe::{Probe, new_log};
use crate::error::SimError;
use crate::sim::{SimConfig, SimTime, Simulation};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn defaults_apply_to_missing_fields() {
    let cfg = SimConfig::from_json_str("{}").expect("empty config");
    assert_eq!(cfg.min_time_between_events, 0.1);
    assert_eq!(cfg.termination_time, None);
    assert_eq!(cfg.pause_at, None);

    let cfg = SimConfig::from_json_str(r#"{ "termination_time": 5.0 }"#).expect("partial config");
    assert_eq!(cfg.min_time_between_events, 0.1);
    assert_eq!(cfg.termination_time, Some(5.0));
}

#[test]
fn invalid_values_are_rejected() {
    let err = SimConfig::from_json_str(r#"{ "min_time_between_events": 0 }"#)
        .expect_err("zero granularity");
    assert!(matches!(err, SimError::InvalidConfig(_)));
    assert!(err.to_string().contains("min_time_between_events"));

    let err = SimConfig::from_json_str(r#"{ "pause_at": -1.0 }"#).expect_err("negative pause");
    assert!(err.to_string().contains("pause_at"));

    let err = SimConfig::from_json_str("{ not json").expect_err("malformed");
    assert!(matches!(err, SimError::Json(_)));
}

#[test]
fn config_loads_from_a_file() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "cloudsim-rs-config-{}-{nanos}.json",
        std::process::id()
    ));
    fs::write(&path, r#"{ "min_time_between_events": 0.5, "pause_at": 2.0 }"#)
        .expect("write temp file");

    let cfg = SimConfig::from_path(&path).expect("load config");
    assert_eq!(cfg.min_time_between_events, 0.5);
    assert_eq!(cfg.pause_at, Some(2.0));
    let _ = fs::remove_file(&path);

    let missing = SimConfig::from_path(std::env::temp_dir().join("cloudsim-rs-does-not-exist.json"));
    assert!(matches!(missing, Err(SimError::Io(_))));
}

#[test]
fn simulation_new_arms_configured_termination_and_pause() {
    let cfg = SimConfig {
        termination_time: Some(3.0),
        pause_at: Some(1.0),
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(cfg).expect("valid config");
    assert_eq!(sim.termination_time(), Some(SimTime(3.0)));
    assert_eq!(sim.pause_requested_at(), Some(SimTime(1.0)));

    sim.add_entity(Probe::new("p", &new_log())).expect("add");
    assert_eq!(sim.run_for(10.0).expect("run"), SimTime(1.0));
    assert!(sim.is_paused());
    assert!(sim.resume());
    assert_eq!(sim.run_for(10.0).expect("run"), SimTime(3.0));
    assert!(!sim.is_running());
}

#[test]
fn simulation_new_rejects_invalid_config() {
    let cfg = SimConfig {
        min_time_between_events: f64::NAN,
        ..SimConfig::default()
    };
    assert!(matches!(
        Simulation::new(cfg),
        Err(SimError::InvalidConfig(_))
    ));
}
