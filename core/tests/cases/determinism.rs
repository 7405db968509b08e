use fogsim_core::{SimulationReport, Topology};

fn parking(seed: u64) -> SimulationReport {
    let mut sim = Topology::smart_parking()
        .unwrap()
        .with_seed(seed)
        .build()
        .unwrap();
    sim.run().unwrap();
    sim.report()
}

#[test]
fn test_same_seed_same_report() {
    assert_eq!(parking(12345), parking(12345));
}

#[test]
fn test_replicas_are_isolated() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| serde_json::to_string(&parking(7)).unwrap()))
        .collect();
    let reports: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(reports.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_healthcare_is_deterministic_without_a_seed() {
    let run = || {
        let mut sim = Topology::smart_healthcare().unwrap().build().unwrap();
        sim.run().unwrap();
        sim.report()
    };
    assert_eq!(run(), run());
}
