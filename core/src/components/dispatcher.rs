use crate::analytics::{EntityMetrics, Meter};
use crate::components::check_quantity;
use crate::engine::{Event, Payload, ScheduleCmd, SystemInspector, Task};
use crate::error::{SimError, SimResult};
use crate::policy::{Candidate, OffloadingPolicy, PolicyKind};
use crate::traits::{Entity, EntityId, FromConfig};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub policy: PolicyKind,
    /// Fixed energy spent per forwarded task.
    pub energy_per_task: f64,
    /// Seed for the random policy. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::LeastLoad,
            energy_per_task: 0.01,
            seed: None,
        }
    }
}

/// Proxy / load balancer between the edge and fog tiers.
pub struct Dispatcher {
    pub name: String,
    pub config: DispatcherConfig,
    pub targets: Vec<EntityId>,
    policy: Box<dyn OffloadingPolicy>,
    meter: Meter,
}

impl Dispatcher {
    pub fn new(name: &str, policy: PolicyKind, energy_per_task: f64) -> Self {
        Self::with_config(
            name,
            DispatcherConfig {
                policy,
                energy_per_task,
                ..Default::default()
            },
        )
    }

    /// Replace the policy built from the config, e.g. to inject a seeded
    /// random source.
    pub fn with_policy(mut self, policy: Box<dyn OffloadingPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Pick a node for `task` and hand it over synchronously. The latency
    /// the task experienced is reported back to its source when that source
    /// is a sensor.
    pub fn dispatch(
        &mut self,
        id: EntityId,
        task: Task,
        inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        if self.targets.is_empty() {
            return Err(SimError::NoAvailableNode { dispatcher: id });
        }
        let candidates = self
            .targets
            .iter()
            .map(|&node| {
                inspector
                    .current_load(node)
                    .map(|load| Candidate { id: node, load })
                    .ok_or(SimError::UnregisteredEntity(node))
            })
            .collect::<SimResult<Vec<_>>>()?;

        let now = inspector.now();
        let chosen = self
            .policy
            .select(&task, &candidates, now)
            .and_then(|idx| candidates.get(idx))
            .ok_or(SimError::NoAvailableNode { dispatcher: id })?;

        self.meter.add_energy(self.config.energy_per_task);
        self.meter.count_task();
        let latency = now.since(task.sent_at);
        self.meter.record_latency(latency);
        debug!(
            dispatcher = %self.name,
            policy = self.policy.name(),
            source = task.source,
            node = chosen.id,
            node_load = chosen.load,
            latency,
            "forwarded task"
        );

        let mut cmds = Vec::with_capacity(2);
        if inspector.kind(task.source) == Some("Sensor") {
            cmds.push(ScheduleCmd::now(
                task.source,
                Payload::LatencyReport {
                    task_seq: task.seq,
                    latency,
                },
            ));
        }
        cmds.push(ScheduleCmd::now(chosen.id, Payload::ProcessTask { task }));
        Ok(cmds)
    }

    pub fn energy_consumed(&self) -> f64 {
        self.meter.energy()
    }

    pub fn tasks_dispatched(&self) -> u64 {
        self.meter.tasks()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_config("Dispatcher", DispatcherConfig::default())
    }
}

impl FromConfig for Dispatcher {
    type Config = DispatcherConfig;

    fn with_config(name: &str, config: DispatcherConfig) -> Self {
        Self {
            name: name.to_string(),
            policy: config.policy.build(config.seed),
            config,
            targets: Vec::new(),
            meter: Meter::new(),
        }
    }

    fn validate(config: &DispatcherConfig) -> SimResult<()> {
        check_quantity("Dispatcher", "energy_per_task", config.energy_per_task)
    }
}

impl Entity for Dispatcher {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> &'static str {
        "Dispatcher"
    }

    fn on_event(
        &mut self,
        event: Event,
        inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        match event.payload {
            Payload::TaskArrival { task } => self.dispatch(event.target, task, inspector),
            other => Err(SimError::MalformedPayload {
                entity: event.target,
                expected: "TaskArrival",
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
        if kind != "FogNode" {
            return Err(SimError::InvalidLink {
                from: id,
                to: target,
                reason: format!("a Dispatcher offloads to FogNodes, not a {kind}"),
            });
        }
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
        Ok(())
    }
    fn get_targets(&self) -> Vec<EntityId> {
        self.targets.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
