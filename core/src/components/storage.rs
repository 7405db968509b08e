use crate::analytics::{EntityMetrics, Meter};
use crate::engine::{Event, Payload, ScheduleCmd, SystemInspector};
use crate::error::{SimError, SimResult};
use crate::traits::{Entity, FromConfig};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Storage has no tunables; capacity is unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {}

/// Cloud-tier sink for partial results.
pub struct CloudStorage {
    pub name: String,
    pub config: StorageConfig,
    meter: Meter,
}

impl CloudStorage {
    pub fn new(name: &str) -> Self {
        Self::with_config(name, StorageConfig::default())
    }

    pub fn store(&mut self, size_mb: f64) {
        self.meter.add_stored(size_mb);
        self.meter.count_task();
    }

    pub fn storage_used(&self) -> f64 {
        self.meter.storage_used()
    }

    /// Number of `store` calls so far.
    pub fn stores(&self) -> u64 {
        self.meter.tasks()
    }
}

impl Default for CloudStorage {
    fn default() -> Self {
        Self::new("CloudStorage")
    }
}

impl FromConfig for CloudStorage {
    type Config = StorageConfig;

    fn with_config(name: &str, config: StorageConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            meter: Meter::new(),
        }
    }
}

impl Entity for CloudStorage {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "CloudStorage"
    }

    fn on_event(
        &mut self,
        event: Event,
        _inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        match event.payload {
            Payload::Store { task, size_mb } => {
                self.store(size_mb);
                debug!(
                    storage = %self.name,
                    source = task.source,
                    seq = task.seq,
                    total_mb = self.storage_used(),
                    "stored {size_mb} MB"
                );
                Ok(vec![])
            }
            other => Err(SimError::MalformedPayload {
                entity: event.target,
                expected: "Store",
                found: other.tag(),
            }),
        }
    }

    fn metrics(&self) -> EntityMetrics {
        self.meter.snapshot(None)
    }
    fn encode_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
