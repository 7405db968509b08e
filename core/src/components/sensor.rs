use crate::analytics::{EntityMetrics, Meter};
use crate::components::check_quantity;
use crate::engine::{Event, Payload, ScheduleCmd, SystemInspector, Task};
use crate::error::{SimError, SimResult};
use crate::time::VirtualTime;
use crate::traits::{Entity, EntityId, FromConfig};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Size of every generated task.
    pub payload_mb: f64,
    /// Sensing/transmission energy per generated MB.
    pub energy_per_mb: f64,
    /// Propagation delay to the dispatcher, in seconds.
    pub transmission_delay: f64,
    /// Number of tasks to emit; the first is emitted at start-up.
    pub tasks: u32,
    /// Spacing between consecutive tasks, in seconds.
    pub interval: f64,
    pub critical: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            payload_mb: 2.0,
            energy_per_mb: 0.02,
            transmission_delay: 0.0,
            tasks: 1,
            interval: 1.0,
            critical: false,
        }
    }
}

/// Edge-tier source (patient sensor, camera, ...).
pub struct Sensor {
    pub name: String,
    pub config: SensorConfig,
    pub target_id: Option<EntityId>,
    meter: Meter,
    generated: u64,
}

impl Sensor {
    pub fn new(name: &str, payload_mb: f64, energy_per_mb: f64) -> Self {
        Self::with_config(
            name,
            SensorConfig {
                payload_mb,
                energy_per_mb,
                ..Default::default()
            },
        )
    }

    pub fn with_delay(mut self, transmission_delay: f64) -> Self {
        self.config.transmission_delay = transmission_delay;
        self
    }

    pub fn with_tasks(mut self, tasks: u32, interval: f64) -> Self {
        self.config.tasks = tasks;
        self.config.interval = interval;
        self
    }

    pub fn critical(mut self) -> Self {
        self.config.critical = true;
        self
    }

    /// Produce one task: account data and energy, then send it to the
    /// dispatcher after the transmission delay.
    pub fn generate(&mut self, id: EntityId, now: VirtualTime) -> SimResult<Vec<ScheduleCmd>> {
        let target = self.target_id.ok_or(SimError::Unlinked(id))?;
        let size = self.config.payload_mb;
        self.meter.add_data(size);
        self.meter.add_energy(size * self.config.energy_per_mb);
        self.meter.count_task();

        let task = Task {
            source: id,
            seq: self.generated,
            size_mb: size,
            sent_at: now,
        };
        self.generated += 1;
        debug!(sensor = %self.name, seq = task.seq, %now, "generated {size} MB");

        let mut cmds = vec![ScheduleCmd::after(
            self.config.transmission_delay,
            target,
            Payload::TaskArrival { task },
        )];
        if self.generated < u64::from(self.config.tasks) {
            cmds.push(ScheduleCmd::after(self.config.interval, id, Payload::Generate));
        }
        Ok(cmds)
    }

    pub fn data_generated(&self) -> f64 {
        self.meter.data_generated()
    }

    pub fn energy_used(&self) -> f64 {
        self.meter.energy()
    }

    pub fn last_latency(&self) -> Option<f64> {
        self.meter.last_latency()
    }

    pub fn tasks_generated(&self) -> u64 {
        self.generated
    }

    pub fn is_critical(&self) -> bool {
        self.config.critical
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self::with_config("Sensor", SensorConfig::default())
    }
}

impl FromConfig for Sensor {
    type Config = SensorConfig;

    fn with_config(name: &str, config: SensorConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            target_id: None,
            meter: Meter::new(),
            generated: 0,
        }
    }

    fn validate(config: &SensorConfig) -> SimResult<()> {
        check_quantity("Sensor", "payload_mb", config.payload_mb)?;
        check_quantity("Sensor", "energy_per_mb", config.energy_per_mb)?;
        check_quantity("Sensor", "transmission_delay", config.transmission_delay)?;
        check_quantity("Sensor", "interval", config.interval)
    }
}

impl Entity for Sensor {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "Sensor"
    }

    fn wake_up(&self, id: EntityId, _now: VirtualTime) -> Vec<ScheduleCmd> {
        if self.config.tasks == 0 {
            return vec![];
        }
        vec![ScheduleCmd::now(id, Payload::Generate)]
    }

    fn on_event(
        &mut self,
        event: Event,
        _inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        match event.payload {
            Payload::Generate => self.generate(event.target, event.time),
            Payload::LatencyReport { latency, .. } => {
                self.meter.record_latency(latency);
                Ok(vec![])
            }
            other => Err(SimError::MalformedPayload {
                entity: event.target,
                expected: "Generate or LatencyReport",
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

    fn add_target(&mut self, id: EntityId, target: EntityId, kind: &str) -> SimResult<()> {
        if kind != "Dispatcher" {
            return Err(SimError::InvalidLink {
                from: id,
                to: target,
                reason: format!("a Sensor sends to a Dispatcher, not a {kind}"),
            });
        }
        self.target_id = Some(target);
        Ok(())
    }
    fn get_targets(&self) -> Vec<EntityId> {
        self.target_id.map(|id| vec![id]).unwrap_or_default()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
