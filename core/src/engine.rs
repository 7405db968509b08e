use crate::analytics::{EntityReport, SimulationReport};
use crate::error::{SimError, SimResult};
use crate::queue::EventQueue;
use crate::time::VirtualTime;
use crate::traits::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, error, info, trace};

/// A unit of work produced by a source and offloaded through the tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub source: EntityId,
    pub seq: u64,
    pub size_mb: f64,
    pub sent_at: VirtualTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Ask a source to produce its next task.
    Generate,
    /// A task reaching the dispatcher.
    TaskArrival { task: Task },
    /// A task handed to a fog node for processing.
    ProcessTask { task: Task },
    /// A fog node's own completion timer for a delayed task.
    ProcessComplete { task: Task },
    /// A partial result pushed to cloud storage.
    Store { task: Task, size_mb: f64 },
    /// Offload latency observed by the dispatcher, reported to the source.
    LatencyReport { task_seq: u64, latency: f64 },
}

impl Payload {
    pub fn tag(&self) -> &'static str {
        match self {
            Payload::Generate => "Generate",
            Payload::TaskArrival { .. } => "TaskArrival",
            Payload::ProcessTask { .. } => "ProcessTask",
            Payload::ProcessComplete { .. } => "ProcessComplete",
            Payload::Store { .. } => "Store",
            Payload::LatencyReport { .. } => "LatencyReport",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub time: VirtualTime,
    /// Tie-break among queued events at the same `time`. Synchronous
    /// hand-offs draw from the same counter but are delivered ahead of any
    /// queued peer, so `seq` is not a global delivery order.
    pub seq: u64,
    /// `None` for events injected from outside the entity graph.
    pub source: Option<EntityId>,
    pub target: EntityId,
    pub payload: Payload,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// Hand off synchronously: delivered at the current time, before the
    /// next queued event.
    Now,
    /// Queue at `now + delay` seconds.
    After(f64),
}

/// Work requested by a handler. The engine stamps the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleCmd {
    pub timing: Timing,
    pub target: EntityId,
    pub payload: Payload,
}

impl ScheduleCmd {
    pub fn now(target: EntityId, payload: Payload) -> Self {
        Self { timing: Timing::Now, target, payload }
    }

    pub fn after(delay: f64, target: EntityId, payload: Payload) -> Self {
        Self { timing: Timing::After(delay), target, payload }
    }
}

/// Read-only view of the rest of the entity table, given to each handler.
pub trait SystemInspector {
    fn now(&self) -> VirtualTime;
    fn is_registered(&self, id: EntityId) -> bool;
    /// Kind of a registered entity, `None` if unknown.
    fn kind(&self, id: EntityId) -> Option<&'static str>;
    fn current_load(&self, id: EntityId) -> Option<u64>;
}

struct TableView<'a> {
    now: VirtualTime,
    entities: &'a HashMap<EntityId, Box<dyn Entity>>,
}

impl SystemInspector for TableView<'_> {
    fn now(&self) -> VirtualTime {
        self.now
    }
    fn is_registered(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }
    fn kind(&self, id: EntityId) -> Option<&'static str> {
        self.entities.get(&id).map(|e| e.kind())
    }
    fn current_load(&self, id: EntityId) -> Option<u64> {
        self.entities.get(&id).and_then(|e| e.current_load())
    }
}

#[derive(Default)]
pub struct Simulation {
    queue: EventQueue,
    entities: HashMap<EntityId, Box<dyn Entity>>,
    order: Vec<EntityId>,
    started: bool,
    finished: bool,
    events_processed: u64,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> VirtualTime {
        self.queue.now()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Entity ids in registration order.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn add_component(&mut self, id: EntityId, entity: Box<dyn Entity>) -> SimResult<()> {
        if self.started {
            return Err(SimError::RegistrationClosed(id));
        }
        if self.entities.contains_key(&id) {
            return Err(SimError::DuplicateEntity(id));
        }
        debug!(entity = id, kind = entity.kind(), name = entity.name(), "registered");
        self.entities.insert(id, entity);
        self.order.push(id);
        Ok(())
    }

    /// Wire `from` to its downstream `to` (source -> dispatcher,
    /// dispatcher -> fog node, fog node -> storage).
    pub fn connect(&mut self, from: EntityId, to: EntityId) -> SimResult<()> {
        let kind = self
            .entities
            .get(&to)
            .ok_or(SimError::UnregisteredEntity(to))?
            .kind();
        self.entities
            .get_mut(&from)
            .ok_or(SimError::UnregisteredEntity(from))?
            .add_target(from, to, kind)
    }

    pub fn component(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(&id).map(|e| e.as_ref())
    }

    /// Typed access for reporting.
    pub fn entity<T: Entity>(&self, id: EntityId) -> SimResult<&T> {
        self.entities
            .get(&id)
            .ok_or(SimError::UnregisteredEntity(id))?
            .as_any()
            .downcast_ref::<T>()
            .ok_or(SimError::EntityTypeMismatch {
                entity: id,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Queue an event from outside the entity graph.
    pub fn schedule(
        &mut self,
        time: VirtualTime,
        target: EntityId,
        payload: Payload,
    ) -> SimResult<u64> {
        self.queue.schedule(time, None, target, payload)
    }

    /// Run the start hooks, then the bootstrap wake-ups, in registration
    /// order. Idempotent.
    pub fn start(&mut self) -> SimResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let now = self.now();
        for &id in &self.order {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.on_start(id, now);
            }
        }
        for id in self.order.clone() {
            let cmds = match self.entities.get(&id) {
                Some(entity) => entity.wake_up(id, now),
                None => continue,
            };
            let mut immediate = VecDeque::new();
            self.apply(id, cmds, &mut immediate)?;
            self.drain(immediate)?;
        }
        Ok(())
    }

    /// Deliver the next queued event plus any synchronous hand-offs it
    /// triggers. Returns `false` once the queue is empty.
    pub fn step(&mut self) -> SimResult<bool> {
        self.start()?;
        match self.queue.pop_next() {
            Some(event) => {
                self.drain(VecDeque::from([event]))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run until no events remain, then call every shutdown hook.
    pub fn run(&mut self) -> SimResult<()> {
        while self
            .step()
            .inspect_err(|e| error!(error = %e, now = %self.now(), "simulation halted"))?
        {}
        self.shutdown();
        info!(
            now = %self.now(),
            events = self.events_processed,
            "simulation completed"
        );
        Ok(())
    }

    /// Deliver every event due at or before `until`, then park the clock
    /// there. Later events stay queued.
    pub fn run_until(&mut self, until: VirtualTime) -> SimResult<()> {
        self.start()?;
        while self.queue.peek_time().is_some_and(|t| t <= until) {
            self.step()
                .inspect_err(|e| error!(error = %e, now = %self.now(), "simulation halted"))?;
        }
        if self.now() < until {
            self.queue.advance_to(until)?;
        }
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let now = self.now();
        for &id in &self.order {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.on_shutdown(id, now);
            }
        }
    }

    pub fn report(&self) -> SimulationReport {
        let entities = self
            .order
            .iter()
            .filter_map(|id| {
                self.entities.get(id).map(|e| EntityReport {
                    id: *id,
                    name: e.name().to_string(),
                    kind: e.kind().to_string(),
                    metrics: e.metrics(),
                })
            })
            .collect();
        SimulationReport {
            end_time: self.now().as_secs(),
            events_processed: self.events_processed,
            entities,
        }
    }

    fn drain(&mut self, mut immediate: VecDeque<Event>) -> SimResult<()> {
        while let Some(event) = immediate.pop_front() {
            let id = event.target;
            let mut entity = self
                .entities
                .remove(&id)
                .ok_or(SimError::UnregisteredEntity(id))?;
            trace!(
                seq = event.seq,
                time = %event.time,
                source = ?event.source,
                target = id,
                tag = event.payload.tag(),
                "deliver"
            );
            let outcome = {
                let view = TableView {
                    now: self.queue.now(),
                    entities: &self.entities,
                };
                entity.on_event(event, &view)
            };
            // Put the entity back before propagating so its partial state
            // stays visible to the caller.
            self.entities.insert(id, entity);
            self.events_processed += 1;
            self.apply(id, outcome?, &mut immediate)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        source: EntityId,
        cmds: Vec<ScheduleCmd>,
        immediate: &mut VecDeque<Event>,
    ) -> SimResult<()> {
        let now = self.queue.now();
        for cmd in cmds {
            match cmd.timing {
                Timing::Now => immediate.push_back(Event {
                    time: now,
                    seq: self.queue.mint_seq(),
                    source: Some(source),
                    target: cmd.target,
                    payload: cmd.payload,
                }),
                Timing::After(delay) => {
                    self.queue
                        .schedule(now.after(delay)?, Some(source), cmd.target, cmd.payload)?;
                }
            }
        }
        Ok(())
    }
}
