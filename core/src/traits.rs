use crate::analytics::EntityMetrics;
use crate::engine::{Event, ScheduleCmd, SystemInspector};
use crate::error::{SimError, SimResult};
use crate::time::VirtualTime;
use serde::de::DeserializeOwned;
use std::any::Any;
use tracing::info;

pub type EntityId = u32;

/// An actor in the simulation.
///
/// The engine owns every entity in its table and hands each one its events
/// one at a time; entities never hold references to each other, only ids.
pub trait Entity: Any {
    fn name(&self) -> &str;
    fn kind(&self) -> &'static str;

    /// Called once before the first event is popped. Observational only.
    fn on_start(&mut self, id: EntityId, now: VirtualTime) {
        info!(entity = id, kind = self.kind(), %now, "{} is starting", self.name());
    }

    /// Bootstrap work queued when the run starts (sources emit their first
    /// generation here).
    fn wake_up(&self, _id: EntityId, _now: VirtualTime) -> Vec<ScheduleCmd> {
        vec![]
    }

    fn on_event(
        &mut self,
        event: Event,
        inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>>;

    /// Called once after the queue drains. Observational only.
    fn on_shutdown(&mut self, id: EntityId, now: VirtualTime) {
        info!(entity = id, kind = self.kind(), %now, "{} is shutting down", self.name());
    }

    /// Ranking key for load-aware offloading. `None` for entities that do
    /// not process tasks.
    fn current_load(&self) -> Option<u64> {
        None
    }

    fn metrics(&self) -> EntityMetrics;
    fn encode_config(&self) -> serde_json::Value;

    /// Wire a downstream entity. `kind` is the target's [`Entity::kind`].
    fn add_target(&mut self, id: EntityId, target: EntityId, kind: &str) -> SimResult<()> {
        Err(SimError::InvalidLink {
            from: id,
            to: target,
            reason: format!("{} accepts no downstream {}", self.kind(), kind),
        })
    }
    fn get_targets(&self) -> Vec<EntityId> {
        vec![]
    }

    fn as_any(&self) -> &dyn Any;
}

/// Entities that can be built from a kind-specific JSON config.
pub trait FromConfig: Entity + Sized {
    type Config: DeserializeOwned + Default;

    fn with_config(name: &str, config: Self::Config) -> Self;

    fn validate(_config: &Self::Config) -> SimResult<()> {
        Ok(())
    }
}
