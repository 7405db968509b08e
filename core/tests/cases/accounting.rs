use crate::common::TestHarness;
use fogsim_core::{FogNode, PolicyKind, Sensor};

#[test]
fn test_source_energy_is_k_times_p_times_c() {
    let (k, p, c) = (7u32, 2.0, 0.02);
    let mut h = TestHarness::new();
    h.fog_tier(2, PolicyKind::LeastLoad);
    h.add(100, Box::new(Sensor::new("Sensor1", p, c).with_tasks(k, 0.25)));
    h.connect(100, 2);

    h.run().unwrap();

    let mut expected = 0.0;
    for _ in 0..k {
        expected += p * c;
    }
    assert_eq!(h.sensor(100).energy_used(), expected);
    assert_eq!(h.sensor(100).data_generated(), f64::from(k) * p);
    assert_eq!(h.sensor(100).tasks_generated(), u64::from(k));
}

#[test]
fn test_every_dispatched_task_is_stored_exactly_once() {
    let mut h = TestHarness::new();
    h.fog_tier(3, PolicyKind::RoundRobin);
    for (i, id) in (100..105).enumerate() {
        let sensor = Sensor::new("Sensor", 1.0, 0.01)
            .with_tasks(4 + i as u32, 0.3)
            .with_delay(0.05 * i as f64);
        h.add(id, Box::new(sensor));
        h.connect(id, 2);
    }

    h.run().unwrap();

    let dispatched = h.dispatcher(2).tasks_dispatched();
    assert_eq!(dispatched, 4 + 5 + 6 + 7 + 8);
    assert_eq!(h.storage(1).stores(), dispatched);
    assert_eq!(h.loads([10, 11, 12]).iter().sum::<u64>(), dispatched);
    assert_eq!(h.storage(1).storage_used(), 0.5 * dispatched as f64);
}

#[test]
fn test_delayed_processing_accounts_once_at_completion() {
    let mut h = TestHarness::new();
    h.add_storage(1);
    h.add(10, Box::new(FogNode::new("Slow", 0.02, 0.5).with_processing_delay(2.0)));
    h.connect(10, 1);
    h.add_dispatcher(2, PolicyKind::LeastLoad, 0.01);
    h.connect(2, 10);
    h.add(100, Box::new(Sensor::new("Cam", 5.0, 0.0).with_tasks(3, 0.5)));
    h.connect(100, 2);

    h.sim.run_until(crate::common::at(1.5)).unwrap();
    assert_eq!(h.node(10).load(), 0, "nothing completes before t=2");
    assert_eq!(h.node(10).in_flight(), 3);
    assert_eq!(h.storage(1).stores(), 0);

    h.run().unwrap();
    assert_eq!(h.node(10).load(), 3);
    assert_eq!(h.node(10).in_flight(), 0);
    assert_eq!(h.storage(1).stores(), 3);
    assert!((h.node(10).energy_consumed() - 0.3).abs() < 1e-12);
    assert_eq!(h.sim.now(), crate::common::at(3.0));
}

#[test]
fn test_dispatcher_latency_covers_transmission_delay() {
    let mut h = TestHarness::new();
    h.fog_tier(1, PolicyKind::LeastLoad);
    h.add_sensor(100, "Sensor1", 2.0, 0.02, 0.25);
    h.connect(100, 2);

    h.run().unwrap();

    assert_eq!(h.sensor(100).last_latency(), Some(0.25));
    let metrics = h.sim.report().get(2).unwrap().metrics.clone();
    assert!((metrics.mean_latency.unwrap() - 0.25).abs() < 1e-3);
}
