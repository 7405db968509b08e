use fogsim_core::{CloudStorage, Dispatcher, FogNode, Sensor, Topology};

const EPS: f64 = 1e-9;

#[test]
fn test_smart_healthcare_matches_reference_numbers() {
    let mut sim = Topology::smart_healthcare().unwrap().build().unwrap();
    sim.run().unwrap();

    assert_eq!(sim.entity::<CloudStorage>(1).unwrap().storage_used(), 2.0);

    let loads: Vec<_> = (10..13).map(|id| sim.entity::<FogNode>(id).unwrap().load()).collect();
    assert_eq!(loads, vec![2, 1, 1]);
    let energy: Vec<_> = (10..13)
        .map(|id| sim.entity::<FogNode>(id).unwrap().energy_consumed())
        .collect();
    assert!((energy[0] - 0.12).abs() < EPS);
    assert!((energy[1] - 0.06).abs() < EPS);
    assert!((energy[2] - 0.06).abs() < EPS);

    assert!((sim.entity::<Dispatcher>(2).unwrap().energy_consumed() - 0.04).abs() < EPS);

    for id in 20..24 {
        let sensor = sim.entity::<Sensor>(id).unwrap();
        assert_eq!(sensor.data_generated(), 2.0);
        assert!((sensor.energy_used() - 0.04).abs() < EPS);
        assert!((sensor.last_latency().unwrap() - 0.1).abs() < EPS);
    }
    assert!(sim.entity::<Sensor>(20).unwrap().is_critical());
    assert!(!sim.entity::<Sensor>(21).unwrap().is_critical());

    // 4 generations, 4 arrivals, 4 latency reports, 4 processings, 4 stores.
    assert_eq!(sim.events_processed(), 20);
    assert!((sim.now().as_secs() - 0.1).abs() < EPS);
}

#[test]
fn test_smart_parking_totals_are_policy_independent() {
    let mut sim = Topology::smart_parking().unwrap().with_seed(3).build().unwrap();
    sim.run().unwrap();
    let report = sim.report();

    assert_eq!(sim.entity::<CloudStorage>(1).unwrap().storage_used(), 2.0);
    let fog_energy: f64 = report.of_kind("FogNode").map(|e| e.metrics.energy_consumed).sum();
    assert!((fog_energy - 0.4).abs() < EPS);
    let fog_load: u64 = report.of_kind("FogNode").filter_map(|e| e.metrics.current_load).sum();
    assert_eq!(fog_load, 4);
    assert!((sim.entity::<Dispatcher>(2).unwrap().energy_consumed() - 0.04).abs() < EPS);
    assert!(report.of_kind("Sensor").all(|e| e.metrics.energy_consumed == 0.0));
}

#[test]
fn test_topology_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("fogsim-topology-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("healthcare.json");
    let topo = Topology::smart_healthcare().unwrap();
    std::fs::write(&path, topo.to_json_pretty().unwrap()).unwrap();

    let loaded = Topology::load(&path).unwrap();
    assert_eq!(loaded, topo);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_topology_file_is_an_io_error() {
    let err = Topology::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, fogsim_core::SimError::Io(_)));
}
