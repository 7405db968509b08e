use crate::common::TestHarness;
use fogsim_core::{Payload, PolicyKind, SimError, Task, VirtualTime};

const EPS: f64 = 1e-12;

#[test]
fn test_single_task_round_trip() {
    let mut h = TestHarness::new();
    h.fog_tier(1, PolicyKind::LeastLoad);
    h.add_sensor(100, "Camera1", 5.0, 0.0, 0.0);
    h.connect(100, 2);

    h.run().unwrap();

    assert!((h.node(10).energy_consumed() - 0.1).abs() < EPS);
    assert_eq!(h.dispatcher(2).energy_consumed(), 0.01);
    assert_eq!(h.storage(1).storage_used(), 0.5);
    assert_eq!(h.node(10).load(), 1);
    assert_eq!(h.sensor(100).last_latency(), Some(0.0));
}

#[test]
fn test_least_load_tie_goes_to_first_registered() {
    let mut h = TestHarness::new();
    h.fog_tier(3, PolicyKind::LeastLoad);
    h.add_sensor(100, "Sensor1", 2.0, 0.02, 0.0);
    h.connect(100, 2);

    h.run().unwrap();

    assert_eq!(h.loads([10, 11, 12]), vec![1, 0, 0]);
}

#[test]
fn test_no_candidates_fails_without_side_effects() {
    let mut h = TestHarness::new();
    h.add_storage(1);
    h.add_node(10, "Orphan", 0.02, 0.5);
    h.connect(10, 1);
    h.add_dispatcher(2, PolicyKind::LeastLoad, 0.01);
    h.add_sensor(100, "Sensor1", 2.0, 0.02, 0.0);
    h.connect(100, 2);

    let err = h.run().unwrap_err();

    assert!(matches!(err, SimError::NoAvailableNode { dispatcher: 2 }));
    assert_eq!(h.node(10).load(), 0);
    assert_eq!(h.storage(1).storage_used(), 0.0);
    assert_eq!(h.storage(1).stores(), 0);
    assert_eq!(h.dispatcher(2).energy_consumed(), 0.0);
    // Partial results stay readable.
    assert_eq!(h.sensor(100).data_generated(), 2.0);
    assert!(!h.sim.is_finished());
}

#[test]
fn test_payload_sent_to_wrong_tier_is_rejected() {
    let mut h = TestHarness::new();
    h.fog_tier(1, PolicyKind::LeastLoad);
    h.sim
        .schedule(fogsim_core::VirtualTime::ZERO, 1, fogsim_core::Payload::Generate)
        .unwrap();

    let err = h.run().unwrap_err();
    assert!(matches!(
        err,
        SimError::MalformedPayload { entity: 1, expected: "Store", found: "Generate" }
    ));
}

#[test]
fn test_task_relayed_by_non_sensor_is_still_stored() {
    let mut h = TestHarness::new();
    h.fog_tier(1, PolicyKind::LeastLoad);
    let task = Task {
        source: 10,
        seq: 0,
        size_mb: 2.0,
        sent_at: VirtualTime::ZERO,
    };
    h.sim
        .schedule(VirtualTime::ZERO, 2, Payload::TaskArrival { task })
        .unwrap();

    h.run().unwrap();

    assert_eq!(h.node(10).load(), 1);
    assert_eq!(h.dispatcher(2).tasks_dispatched(), 1);
    assert_eq!(h.storage(1).stores(), 1);
    assert_eq!(h.storage(1).storage_used(), 0.5);
}
