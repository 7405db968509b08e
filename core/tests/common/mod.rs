#![allow(dead_code)]

use fogsim_core::*;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

pub struct TestHarness {
    pub sim: Simulation,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            sim: Simulation::new(),
        }
    }

    pub fn add(&mut self, id: EntityId, entity: Box<dyn Entity>) {
        self.sim.add_component(id, entity).unwrap();
    }

    pub fn add_storage(&mut self, id: EntityId) {
        self.add(id, Box::new(CloudStorage::new("Cloud")));
    }

    pub fn add_node(&mut self, id: EntityId, name: &str, energy_per_mb: f64, result_mb: f64) {
        self.add(id, Box::new(FogNode::new(name, energy_per_mb, result_mb)));
    }

    pub fn add_dispatcher(&mut self, id: EntityId, policy: PolicyKind, energy_per_task: f64) {
        self.add(id, Box::new(Dispatcher::new("Proxy", policy, energy_per_task)));
    }

    pub fn add_sensor(
        &mut self,
        id: EntityId,
        name: &str,
        payload_mb: f64,
        energy_per_mb: f64,
        delay: f64,
    ) {
        self.add(id, Box::new(Sensor::new(name, payload_mb, energy_per_mb).with_delay(delay)));
    }

    pub fn connect(&mut self, from: EntityId, to: EntityId) {
        self.sim.connect(from, to).unwrap();
    }

    /// Storage 1, `nodes` fog nodes from id 10, dispatcher 2, all wired.
    pub fn fog_tier(&mut self, nodes: u32, policy: PolicyKind) {
        self.add_storage(1);
        for i in 0..nodes {
            self.add_node(10 + i, &format!("FogNode{}", i + 1), 0.02, 0.5);
            self.connect(10 + i, 1);
        }
        self.add_dispatcher(2, policy, 0.01);
        for i in 0..nodes {
            self.connect(2, 10 + i);
        }
    }

    pub fn run(&mut self) -> SimResult<()> {
        self.sim.run()
    }

    pub fn storage(&self, id: EntityId) -> &CloudStorage {
        self.sim.entity::<CloudStorage>(id).unwrap()
    }

    pub fn node(&self, id: EntityId) -> &FogNode {
        self.sim.entity::<FogNode>(id).unwrap()
    }

    pub fn dispatcher(&self, id: EntityId) -> &Dispatcher {
        self.sim.entity::<Dispatcher>(id).unwrap()
    }

    pub fn sensor(&self, id: EntityId) -> &Sensor {
        self.sim.entity::<Sensor>(id).unwrap()
    }

    pub fn loads(&self, ids: impl IntoIterator<Item = EntityId>) -> Vec<u64> {
        ids.into_iter().map(|id| self.node(id).load()).collect()
    }
}

pub fn at(secs: f64) -> VirtualTime {
    VirtualTime::new(secs).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    pub target: EntityId,
    pub time: f64,
    pub seq: u64,
}

pub type DeliveryLog = Rc<RefCell<Vec<Delivery>>>;

/// Test entity that logs every delivery and can fan out follow-ups.
pub struct Recorder {
    log: DeliveryLog,
    follow_ups: Vec<ScheduleCmd>,
}

impl Recorder {
    pub fn new(log: &DeliveryLog) -> Self {
        Self {
            log: Rc::clone(log),
            follow_ups: Vec::new(),
        }
    }

    /// On its next delivery, schedule a `Generate` to `target` after `delay`.
    pub fn then(mut self, delay: f64, target: EntityId) -> Self {
        self.follow_ups.push(ScheduleCmd::after(delay, target, Payload::Generate));
        self
    }

    /// On its next delivery, hand a `Generate` to `target` synchronously.
    pub fn hand_off(mut self, target: EntityId) -> Self {
        self.follow_ups.push(ScheduleCmd::now(target, Payload::Generate));
        self
    }
}

impl Entity for Recorder {
    fn name(&self) -> &str {
        "Recorder"
    }
    fn kind(&self) -> &'static str {
        "Recorder"
    }
    fn on_event(
        &mut self,
        event: Event,
        _inspector: &dyn SystemInspector,
    ) -> SimResult<Vec<ScheduleCmd>> {
        self.log.borrow_mut().push(Delivery {
            target: event.target,
            time: event.time.as_secs(),
            seq: event.seq,
        });
        Ok(self.follow_ups.drain(..).collect())
    }
    fn metrics(&self) -> EntityMetrics {
        EntityMetrics::default()
    }
    fn encode_config(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
