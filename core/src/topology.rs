//! Declarative description of an entity graph, loadable from JSON.
//!
//! ```json
//! {
//!   "name": "tiny",
//!   "seed": 7,
//!   "entities": [
//!     { "id": 1, "kind": "CloudStorage" },
//!     { "id": 2, "kind": "FogNode", "config": { "energy_per_mb": 0.02 } },
//!     { "id": 3, "kind": "Dispatcher", "config": { "policy": "random" } },
//!     { "id": 4, "kind": "Sensor", "name": "Camera1" }
//!   ],
//!   "links": [[2, 1], [3, 2], [4, 3]]
//! }
//! ```

use crate::components::create_component;
use crate::components::dispatcher::DispatcherConfig;
use crate::components::fog_node::FogNodeConfig;
use crate::components::sensor::SensorConfig;
use crate::engine::Simulation;
use crate::error::{SimError, SimResult};
use crate::policy::PolicyKind;
use crate::traits::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: EntityId,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Value,
}

impl EntitySpec {
    pub fn new(id: EntityId, kind: &str, name: &str, config: impl Serialize) -> SimResult<Self> {
        Ok(Self {
            id,
            kind: kind.to_string(),
            name: Some(name.to_string()),
            config: serde_json::to_value(config)?,
        })
    }

    fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.kind, self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    /// Base seed for random dispatchers that carry no seed of their own.
    #[serde(default)]
    pub seed: Option<u64>,
    pub entities: Vec<EntitySpec>,
    /// `[from, to]` pairs, applied in order. For a dispatcher the order of
    /// its links is the candidate order used for tie-breaking.
    #[serde(default)]
    pub links: Vec<(EntityId, EntityId)>,
}

impl Topology {
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override the policy of every dispatcher.
    pub fn with_policy(mut self, policy: PolicyKind) -> SimResult<Self> {
        let value = serde_json::to_value(policy)?;
        for spec in self.entities.iter_mut().filter(|s| s.kind == "Dispatcher") {
            set_field(&mut spec.config, "policy", value.clone());
        }
        Ok(self)
    }

    /// Reseed every dispatcher, replacing any per-dispatcher seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        for spec in self.entities.iter_mut().filter(|s| s.kind == "Dispatcher") {
            if let Value::Object(map) = &mut spec.config {
                map.remove("seed");
            }
        }
        self
    }

    fn validate(&self) -> SimResult<()> {
        if self.entities.is_empty() {
            return Err(SimError::InvalidScenario(format!(
                "topology '{}' has no entities",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for spec in &self.entities {
            if !seen.insert(spec.id) {
                return Err(SimError::DuplicateEntity(spec.id));
            }
            if !(spec.config.is_null() || spec.config.is_object()) {
                return Err(SimError::InvalidScenario(format!(
                    "config of entity {} must be an object",
                    spec.id
                )));
            }
        }
        Ok(())
    }

    /// Instantiate, register and wire every entity. The returned simulation
    /// has not been started.
    pub fn build(&self) -> SimResult<Simulation> {
        self.validate()?;
        let mut sim = Simulation::new();
        for spec in &self.entities {
            let mut config = spec.config.clone();
            if let (Some(seed), "Dispatcher") = (self.seed, spec.kind.as_str()) {
                if config.get("seed").map_or(true, Value::is_null) {
                    let seed = seed.wrapping_add(u64::from(spec.id));
                    set_field(&mut config, "seed", Value::from(seed));
                }
            }
            let entity = create_component(&spec.kind, &spec.display_name(), config)?;
            sim.add_component(spec.id, entity)?;
        }
        for &(from, to) in &self.links {
            sim.connect(from, to)?;
        }
        info!(
            topology = %self.name,
            entities = self.entities.len(),
            links = self.links.len(),
            "topology built"
        );
        Ok(sim)
    }

    /// Patient sensors offloading to three fog nodes through a least-load
    /// balancer.
    pub fn smart_healthcare() -> SimResult<Self> {
        let node = FogNodeConfig {
            energy_per_mb: 0.03,
            result_mb: 0.5,
            processing_delay: 0.0,
        };
        let storage = EntitySpec::new(1, "CloudStorage", "CloudDataCenter", Value::Null)?;
        let mut entities = vec![storage];
        for (i, id) in (10..13).enumerate() {
            entities.push(EntitySpec::new(id, "FogNode", &format!("FogNode{}", i + 1), &node)?);
        }
        entities.push(EntitySpec::new(
            2,
            "Dispatcher",
            "EQLSBalancer",
            DispatcherConfig {
                policy: PolicyKind::LeastLoad,
                energy_per_task: 0.01,
                seed: None,
            },
        )?);
        for (i, id) in (20..24).enumerate() {
            let sensor = SensorConfig {
                payload_mb: 2.0,
                energy_per_mb: 0.02,
                transmission_delay: 0.1,
                critical: i % 2 == 0,
                ..Default::default()
            };
            entities.push(EntitySpec::new(id, "Sensor", &format!("Sensor{}", i + 1), sensor)?);
        }

        let mut links = vec![(10, 1), (11, 1), (12, 1), (2, 10), (2, 11), (2, 12)];
        links.extend((20..24).map(|id| (id, 2)));
        Ok(Self {
            name: "smart-healthcare".to_string(),
            seed: None,
            entities,
            links,
        })
    }

    /// Parking cameras offloading images to two fog nodes through a proxy
    /// that picks uniformly at random.
    pub fn smart_parking() -> SimResult<Self> {
        let node = FogNodeConfig {
            energy_per_mb: 0.02,
            result_mb: 0.5,
            processing_delay: 0.0,
        };
        let storage = EntitySpec::new(1, "CloudStorage", "CloudDataCenter", Value::Null)?;
        let mut entities = vec![storage];
        for (i, id) in (10..12).enumerate() {
            entities.push(EntitySpec::new(id, "FogNode", &format!("FogNode{}", i + 1), &node)?);
        }
        entities.push(EntitySpec::new(
            2,
            "Dispatcher",
            "ProxyServer",
            DispatcherConfig {
                policy: PolicyKind::Random,
                energy_per_task: 0.01,
                seed: None,
            },
        )?);
        for (i, id) in (20..24).enumerate() {
            let camera = SensorConfig {
                payload_mb: 5.0,
                energy_per_mb: 0.0,
                transmission_delay: 0.0,
                ..Default::default()
            };
            entities.push(EntitySpec::new(id, "Sensor", &format!("Camera{}", i + 1), camera)?);
        }

        let mut links = vec![(10, 1), (11, 1), (2, 10), (2, 11)];
        links.extend((20..24).map(|id| (id, 2)));
        Ok(Self {
            name: "smart-parking".to_string(),
            seed: None,
            entities,
            links,
        })
    }
}

fn set_field(config: &mut Value, key: &str, value: Value) {
    if !config.is_object() {
        *config = Value::Object(Default::default());
    }
    if let Value::Object(map) = config {
        map.insert(key.to_string(), value);
    }
}
