//! Threaded control unit: start, feed telemetry, stop.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tk_app::{ControlConfig, ControlUnit};
use tk_controls::RecordingActuator;
use tk_core::{Mode, MonotonicClock};

fn fast_config() -> ControlConfig {
    ControlConfig {
        tick_ms: 10,
        t1_ms: 50,
        t2_ms: 2_000,
        ..ControlConfig::default()
    }
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn unit_drives_valve_from_telemetry() {
    let actuator = Arc::new(RecordingActuator::new());
    let mut unit = ControlUnit::start(
        fast_config(),
        actuator.clone(),
        Arc::new(MonotonicClock::new()),
    )
    .unwrap();
    assert!(unit.is_running());

    unit.ingress().handle_payload("55").unwrap();
    assert!(wait_for(|| unit.state().valve_opening() == 100));
    assert_eq!(unit.state().mode(), Mode::Automatic);

    let stats = unit.stop().unwrap().expect("first stop returns stats");
    assert!(stats.ticks > 0);
    assert!(!unit.is_running());
    assert!(unit.stop().unwrap().is_none());
    assert_eq!(actuator.valve_commands(), vec![100]);
}

#[test]
fn concurrent_collaborators_share_state() {
    let actuator = Arc::new(RecordingActuator::new());
    let mut unit = ControlUnit::start(
        fast_config(),
        actuator.clone(),
        Arc::new(MonotonicClock::new()),
    )
    .unwrap();

    let ingress = unit.ingress();
    let feeder = thread::spawn(move || {
        for i in 0..200 {
            ingress.record(f64::from(i % 15)).unwrap();
            thread::sleep(Duration::from_millis(1));
        }
    });

    let operator = unit.operator();
    let reader = thread::spawn(move || {
        for _ in 0..200 {
            let history = operator.history();
            assert!(history.count <= 100);
            assert_eq!(history.count, history.readings.len());
            assert!(
                history
                    .readings
                    .windows(2)
                    .all(|w| w[0].timestamp <= w[1].timestamp)
            );
            let status = operator.status();
            assert!(status.valve_opening <= 100);
        }
    });

    feeder.join().unwrap();
    reader.join().unwrap();

    assert_eq!(unit.state().history().len(), 100);
    unit.stop().unwrap();
    // Levels never left the safe range.
    assert!(actuator.valve_commands().is_empty());
}

#[test]
fn invalid_config_refuses_to_start() {
    let config = ControlConfig {
        l1_cm: 50.0,
        l2_cm: 10.0,
        ..ControlConfig::default()
    };
    let result = ControlUnit::start(
        config,
        Arc::new(RecordingActuator::new()),
        Arc::new(MonotonicClock::new()),
    );
    assert!(result.is_err());
}

#[test]
fn drop_stops_the_loop() {
    let unit = ControlUnit::start(
        fast_config(),
        Arc::new(RecordingActuator::new()),
        Arc::new(MonotonicClock::new()),
    )
    .unwrap();
    let state = Arc::clone(unit.state());
    drop(unit);
    assert_eq!(Arc::strong_count(&state), 1);
}
