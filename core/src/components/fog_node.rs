use crate::analytics::{EntityMetrics, Meter};
use crate::components::check_quantity;
use crate::engine::{Event, Payload, ScheduleCmd, SystemInspector, Task};
use crate::error::{SimError, SimResult};
use crate::traits::{Entity, EntityId, FromConfig};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FogNodeConfig {
    /// Processing energy per input MB.
    pub energy_per_mb: f64,
    /// Size of the partial result forwarded to storage.
    pub result_mb: f64,
    /// Simulated processing time in seconds. Zero processes on arrival.
    pub processing_delay: f64,
}

impl Default for FogNodeConfig {
    fn default() -> Self {
        Self {
            energy_per_mb: 0.02,
            result_mb: 0.5,
            processing_delay: 0.0,
        }
    }
}

/// Fog-tier processing node.
pub struct FogNode {
    pub name: String,
    pub config: FogNodeConfig,
    pub storage_id: Option<EntityId>,
    current_load: u64,
    in_flight: u64,
    meter: Meter,
}

impl FogNode {
    pub fn new(name: &str, energy_per_mb: f64, result_mb: f64) -> Self {
        Self::with_config(
            name,
            FogNodeConfig {
                energy_per_mb,
                result_mb,
                ..Default::default()
            },
        )
    }

    pub fn with_processing_delay(mut self, secs: f64) -> Self {
        self.config.processing_delay = secs;
        self
    }

    /// Accept a task. With no processing delay the task completes at once;
    /// otherwise a completion timer is queued and accounting waits for it.
    pub fn process(&mut self, id: EntityId, task: Task) -> SimResult<Vec<ScheduleCmd>> {
        if self.config.processing_delay > 0.0 {
            self.in_flight += 1;
            return Ok(vec![ScheduleCmd::after(
                self.config.processing_delay,
                id,
                Payload::ProcessComplete { task },
            )]);
        }
        self.complete(id, task)
    }

    fn complete(&mut self, id: EntityId, task: Task) -> SimResult<Vec<ScheduleCmd>> {
        let storage = self.storage_id.ok_or(SimError::Unlinked(id))?;
        self.meter.add_energy(task.size_mb * self.config.energy_per_mb);
        self.meter.count_task();
        self.current_load += 1;
        debug!(
            node = %self.name,
            source = task.source,
            seq = task.seq,
            load = self.current_load,
            "processed task, uploading {} MB",
            self.config.result_mb
        );
        Ok(vec![ScheduleCmd::now(
            storage,
            Payload::Store {
                task,
                size_mb: self.config.result_mb,
            },
        )])
    }

    pub fn energy_consumed(&self) -> f64 {
        self.meter.energy()
    }

    /// Tasks finished so far.
    pub fn load(&self) -> u64 {
        self.current_load
    }

    /// Tasks accepted but still waiting on their completion timer.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }
}

impl Default for FogNode {
    fn default() -> Self {
        Self::with_config("FogNode", FogNodeConfig::default())
    }
}

impl FromConfig for FogNode {
    type Config = FogNodeConfig;

    fn with_config(name: &str, config: FogNodeConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            storage_id: None,
            current_load: 0,
            in_flight: 0,
            meter: Meter::new(),
        }
    }

    fn validate(config: &FogNodeConfig) -> SimResult<()> {
        check_quantity("FogNode", "energy_per_mb", config.energy_per_mb)?;
        check_quantity("FogNode", "result_mb", config.result_mb)?;
        check_quantity("FogNode", "processing_delay", config.processing_delay)
    }
}

impl Entity for FogNode {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "FogNode"
    }

    fn on_event(
        &mut self,
        event: Event,
        _inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        match event.payload {
            Payload::ProcessTask { task } => self.process(event.target, task),
            Payload::ProcessComplete { task } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.complete(event.target, task)
            }
            other => Err(SimError::MalformedPayload {
                entity: event.target,
                expected: "ProcessTask or ProcessComplete",
                found: other.tag(),
            }),
        }
    }

    fn current_load(&self) -> Option<u64> {
        Some(self.current_load)
    }

    fn metrics(&self) -> EntityMetrics {
        self.meter.snapshot(Some(self.current_load))
    }
    fn encode_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn add_target(&mut self, id: EntityId, target: EntityId, kind: &str) -> SimResult<()> {
        if kind != "CloudStorage" {
            return Err(SimError::InvalidLink {
                from: id,
                to: target,
                reason: format!("a FogNode uploads to CloudStorage, not a {kind}"),
            });
        }
        self.storage_id = Some(target);
        Ok(())
    }
    fn get_targets(&self) -> Vec<EntityId> {
        self.storage_id.map(|id| vec![id]).unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
