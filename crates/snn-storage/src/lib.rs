//! Serialization boundary for the event-driven SNN simulation core
//!
//! This crate owns the binary log formats and the JSON network save/load
//! schema the simulation core writes to and reads from. It does not parse
//! dataset files, render a GUI, or run a classifier — those stay external
//! collaborators that only ever see the spike tuples or neuron-state
//! snapshots handed to them.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod myelin_log;
pub mod spike_log;
pub mod weight_map_log;

pub use error::{Result, StorageError};
pub use myelin_log::{MyelinEvent, MyelinLogReader, MyelinLogWriter, ModifiedSynapse};
pub use spike_log::{SpikeLogReader, SpikeLogWriter, SpikeRecord};
pub use weight_map_log::{WeightMapLogReader, WeightMapLogWriter, WeightMapRecord};

#[cfg(feature = "serde")]
pub use json::{KernelKind, LayerRecord, NeuronKind, NeuronRecord, SavedNetwork, SynapseRecord};

/// Storage crate version, bumped whenever a binary or JSON schema changes
pub const STORAGE_VERSION: u32 = 1;
