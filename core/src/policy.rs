//! Offloading policies: given a task and the dispatcher's candidate fog
//! nodes, pick the one that processes it.

use crate::engine::Task;
use crate::error::SimError;
use crate::time::VirtualTime;
use crate::traits::EntityId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: EntityId,
    pub load: u64,
}

pub trait OffloadingPolicy {
    fn name(&self) -> &'static str;

    /// Index into `candidates` of the chosen node, `None` if there is
    /// nothing to choose from.
    fn select(&mut self, task: &Task, candidates: &[Candidate], now: VirtualTime) -> Option<usize>;
}

/// Uniform choice. The generator is injected so runs can be replayed.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl OffloadingPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(
        &mut self,
        _task: &Task,
        candidates: &[Candidate],
        _now: VirtualTime,
    ) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..candidates.len()))
    }
}

/// Fewest completed tasks wins; ties go to the earliest candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoadPolicy;

impl OffloadingPolicy for LeastLoadPolicy {
    fn name(&self) -> &'static str {
        "least-load"
    }

    fn select(
        &mut self,
        _task: &Task,
        candidates: &[Candidate],
        _now: VirtualTime,
    ) -> Option<usize> {
        // `min_by_key` keeps the first of equal minima.
        candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.load)
            .map(|(idx, _)| idx)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinPolicy {
    next: usize,
}

impl OffloadingPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn select(
        &mut self,
        _task: &Task,
        candidates: &[Candidate],
        _now: VirtualTime,
    ) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let idx = self.next % candidates.len();
        self.next = (idx + 1) % candidates.len();
        Some(idx)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Random,
    #[default]
    LeastLoad,
    RoundRobin,
}

impl PolicyKind {
    /// Instantiate the policy. Without a seed the random policy draws
    /// from OS entropy and is not reproducible.
    pub fn build(self, seed: Option<u64>) -> Box<dyn OffloadingPolicy> {
        match self {
            PolicyKind::Random => Box::new(match seed {
                Some(seed) => RandomPolicy::seeded(seed),
                None => RandomPolicy::new(StdRng::from_entropy()),
            }),
            PolicyKind::LeastLoad => Box::new(LeastLoadPolicy),
            PolicyKind::RoundRobin => Box::new(RoundRobinPolicy::default()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::LeastLoad => "least-load",
            PolicyKind::RoundRobin => "round-robin",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(PolicyKind::Random),
            "least-load" | "leastload" | "eqls" => Ok(PolicyKind::LeastLoad),
            "round-robin" | "roundrobin" => Ok(PolicyKind::RoundRobin),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
