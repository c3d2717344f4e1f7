//! Time-ordered priority queue of pending spike events (C1)

use crate::{NeuronId, SynapseId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Discriminant of an event, driving which neuron state-machine transition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Initial input spike injected from outside the network
    Initial,
    /// Spike generated by a neuron firing
    Generated,
    /// Marks the end of a synapse's integration window
    EndOfIntegration,
    /// Algebraically predicted threshold crossing (event-driven optimization)
    Prediction,
    /// Tells a decision/regression neuron to pick a winning class
    Decision,
    /// ULPEC programming waveform: rising edge start
    TriggerUp,
    /// ULPEC programming waveform: falling edge start
    TriggerDown,
    /// ULPEC programming waveform: falling-then-rising edge
    TriggerDownToUp,
    /// ULPEC programming waveform: end of the rising edge
    EndTriggerUp,
    /// ULPEC programming waveform: end of the falling edge
    EndTriggerDown,
    /// ULPEC hardware programming-pulse marker
    Programming,
    /// Clock-driven tick with no semantic payload
    None,
}

/// A unit of work dispatched by the [`EventQueue`]
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Simulated delivery time
    pub timestamp: f64,
    /// Edge that delivers this event; `None` for a stub/input-only event
    pub target_synapse_id: Option<SynapseId>,
    /// Postsynaptic neuron targeted by this event
    pub target_neuron_id: NeuronId,
    /// What kind of transition this event triggers
    pub kind: EventKind,
    /// Monotonically increasing insertion sequence, used to break timestamp ties
    insertion_order: u64,
}

impl Event {
    /// Construct a new event; `insertion_order` is assigned by [`EventQueue::push`]
    pub fn new(
        timestamp: f64,
        target_synapse_id: Option<SynapseId>,
        target_neuron_id: NeuronId,
        kind: EventKind,
    ) -> Self {
        Self {
            timestamp,
            target_synapse_id,
            target_neuron_id,
            kind,
            insertion_order: 0,
        }
    }

    /// The insertion sequence number assigned when this event was pushed
    pub fn insertion_order(&self) -> u64 {
        self.insertion_order
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    // BinaryHeap is a max-heap; we want the earliest timestamp (and, on a
    // tie, the earliest insertion) to compare greatest so it pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .partial_cmp(&self.timestamp)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.insertion_order.cmp(&self.insertion_order))
    }
}

/// Priority queue keyed on timestamp, ties broken by insertion order (FIFO)
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_insertion_order: u64,
}

impl EventQueue {
    /// Create a new, empty event queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_insertion_order: 0,
        }
    }

    /// Push an event, clamping `timestamp < now` up to `now`
    ///
    /// Delays are never negative in this model; clamping keeps the queue's
    /// monotonic-dispatch invariant even if a caller injects a stale spike.
    pub fn push(&mut self, mut event: Event, now: f64) {
        if event.timestamp < now {
            event.timestamp = now;
        }
        event.insertion_order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.heap.push(event);
    }

    /// Remove and return the earliest-timestamp, earliest-inserted event
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    /// Look at the earliest-timestamp, earliest-inserted event without removing it
    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek()
    }

    /// Drain and return, in dispatch order, all events with `timestamp <= t`
    pub fn drain_until(&mut self, t: f64) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Some(event) = self.heap.peek() {
            if event.timestamp <= t {
                drained.push(self.heap.pop().expect("peeked event must pop"));
            } else {
                break;
            }
        }
        drained
    }

    /// Remove all pending events
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_insertion_order = 0;
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue has no pending events
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
