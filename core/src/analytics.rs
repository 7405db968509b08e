use crate::traits::EntityId;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Latencies are bucketed in microseconds.
const LATENCY_SIGFIGS: u8 = 3;
// `Histogram::new` only rejects precisions above 5.
const _: () = assert!(LATENCY_SIGFIGS <= 5);
const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Per-entity accumulator. Each entity owns one and is the only writer.
#[derive(Clone)]
pub struct Meter {
    energy: f64,
    data_generated: f64,
    storage_used: f64,
    tasks: u64,
    last_latency: Option<f64>,
    latencies: Histogram<u64>,
}

impl Meter {
    pub fn new() -> Self {
        Self {
            energy: 0.0,
            data_generated: 0.0,
            storage_used: 0.0,
            tasks: 0,
            last_latency: None,
            latencies: Histogram::new(LATENCY_SIGFIGS)
                .expect("latency precision is checked at compile time"),
        }
    }

    pub fn add_energy(&mut self, joules: f64) {
        self.energy += joules;
    }

    pub fn add_data(&mut self, mb: f64) {
        self.data_generated += mb;
    }

    pub fn add_stored(&mut self, mb: f64) {
        self.storage_used += mb;
    }

    pub fn count_task(&mut self) {
        self.tasks += 1;
    }

    pub fn record_latency(&mut self, secs: f64) {
        self.last_latency = Some(secs);
        self.latencies
            .saturating_record((secs.max(0.0) * MICROS_PER_SEC).round() as u64);
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn data_generated(&self) -> f64 {
        self.data_generated
    }

    pub fn storage_used(&self) -> f64 {
        self.storage_used
    }

    pub fn tasks(&self) -> u64 {
        self.tasks
    }

    pub fn last_latency(&self) -> Option<f64> {
        self.last_latency
    }

    pub fn latency_samples(&self) -> u64 {
        self.latencies.len()
    }

    fn latency_quantile(&self, q: f64) -> Option<f64> {
        (!self.latencies.is_empty())
            .then(|| self.latencies.value_at_quantile(q) as f64 / MICROS_PER_SEC)
    }

    pub fn snapshot(&self, current_load: Option<u64>) -> EntityMetrics {
        EntityMetrics {
            energy_consumed: self.energy,
            data_generated: self.data_generated,
            storage_used: self.storage_used,
            tasks_handled: self.tasks,
            current_load,
            last_latency: self.last_latency,
            mean_latency: (!self.latencies.is_empty())
                .then(|| self.latencies.mean() / MICROS_PER_SEC),
            p50_latency: self.latency_quantile(0.5),
            p99_latency: self.latency_quantile(0.99),
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one entity's counters. Latencies are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub energy_consumed: f64,
    pub data_generated: f64,
    pub storage_used: f64,
    pub tasks_handled: u64,
    pub current_load: Option<u64>,
    pub last_latency: Option<f64>,
    pub mean_latency: Option<f64>,
    pub p50_latency: Option<f64>,
    pub p99_latency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub id: EntityId,
    pub name: String,
    pub kind: String,
    pub metrics: EntityMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub end_time: f64,
    pub events_processed: u64,
    pub entities: Vec<EntityReport>,
}

impl SimulationReport {
    pub fn get(&self, id: EntityId) -> Option<&EntityReport> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EntityReport> + 'a {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    pub fn total_energy(&self) -> f64 {
        self.entities.iter().map(|e| e.metrics.energy_consumed).sum()
    }

    pub fn total_storage(&self) -> f64 {
        self.entities.iter().map(|e| e.metrics.storage_used).sum()
    }
}
