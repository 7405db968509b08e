//! Virtual clock plus the pending-event heap.
//!
//! Events are keyed by `(time, seq)`. `seq` comes from a single counter owned
//! by the queue, so events sharing a timestamp pop in the order they were
//! scheduled, including ones scheduled while that timestamp is being drained.

use crate::engine::{Event, Payload};
use crate::error::{SimError, SimResult};
use crate::time::VirtualTime;
use crate::traits::EntityId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Default)]
pub struct EventQueue {
    now: VirtualTime,
    events: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> VirtualTime {
        self.now
    }

    /// Queue `payload` for `target` at `time`. Fails if `time` is earlier
    /// than the clock. Returns the sequence number assigned to the event.
    pub fn schedule(
        &mut self,
        time: VirtualTime,
        source: Option<EntityId>,
        target: EntityId,
        payload: Payload,
    ) -> SimResult<u64> {
        if time.is_before(self.now) {
            return Err(SimError::InvalidSchedule {
                requested: time.as_secs(),
                current: self.now.as_secs(),
            });
        }
        let seq = self.mint_seq();
        self.events.push(Reverse(Event {
            time,
            seq,
            source,
            target,
            payload,
        }));
        Ok(seq)
    }

    /// Remove the earliest event and move the clock to its timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let Reverse(event) = self.events.pop()?;
        self.now = event.time;
        Some(event)
    }

    pub fn peek_time(&self) -> Option<VirtualTime> {
        self.events.peek().map(|Reverse(e)| e.time)
    }

    /// Move the clock forward without delivering anything. Refuses to jump
    /// backwards or past a pending event.
    pub fn advance_to(&mut self, time: VirtualTime) -> SimResult<()> {
        let next_due = self.peek_time().is_some_and(|next| next.is_before(time));
        if time.is_before(self.now) || next_due {
            return Err(SimError::InvalidSchedule {
                requested: time.as_secs(),
                current: self.now.as_secs(),
            });
        }
        self.now = time;
        Ok(())
    }

    /// Hand out the next sequence number. Also used for synchronous
    /// hand-offs that bypass the heap.
    pub(crate) fn mint_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
