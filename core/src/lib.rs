//! Deterministic discrete-event simulator for layered edge/fog/cloud
//! deployments.
//!
//! Sources generate tasks, a dispatcher offloads each one to a fog node
//! picked by an [`OffloadingPolicy`], fog nodes push partial results to
//! cloud storage, and every entity keeps its own energy / data / latency
//! accounting. Time is virtual and only moves when the engine pops an event.

pub mod analytics;
pub mod components;
pub mod engine;
pub mod error;
pub mod policy;
pub mod queue;
pub mod time;
pub mod topology;
pub mod traits;

pub use analytics::{EntityMetrics, EntityReport, Meter, SimulationReport};
pub use components::{component_kinds, create_component};
pub use components::dispatcher::{Dispatcher, DispatcherConfig};
pub use components::fog_node::{FogNode, FogNodeConfig};
pub use components::sensor::{Sensor, SensorConfig};
pub use components::storage::{CloudStorage, StorageConfig};
pub use engine::{Event, Payload, ScheduleCmd, Simulation, SystemInspector, Task, Timing};
pub use error::{SimError, SimResult};
pub use policy::{
    Candidate, LeastLoadPolicy, OffloadingPolicy, PolicyKind, RandomPolicy, RoundRobinPolicy,
};
pub use queue::EventQueue;
pub use time::VirtualTime;
pub use topology::{EntitySpec, Topology};
pub use traits::{Entity, EntityId, FromConfig};
