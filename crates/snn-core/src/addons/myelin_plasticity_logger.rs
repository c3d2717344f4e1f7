//! Myelin-plasticity delay-update event logger
//!
//! Unlike the other addons here, this one is not driven by the standard
//! `Addon` hooks: the `Mp1` learning rule calls
//! [`MyelinPlasticityLogger::log_event`] directly when it finds this addon
//! among a postsynaptic neuron's relevant addons, since the delay update it
//! logs happens inside a `learn` hook of a *different* addon.

use crate::addon::{Addon, NeuronMask};
use crate::error::Result;
use crate::{NeuronId, SynapseId};
use esnn_storage::{ModifiedSynapse, MyelinLogWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One dendrite `Mp1` modified during a single postsynaptic firing
#[derive(Debug, Clone, Copy)]
pub struct DelayUpdate {
    /// Presynaptic neuron id of the modified dendrite
    pub presynaptic_neuron_id: NeuronId,
    /// Synapse id of the modified dendrite
    pub synapse_id: SynapseId,
    /// Time difference used in the delay-update formula
    pub time_difference: f64,
    /// Synaptic delay after the update
    pub delay_after: f64,
    /// Synaptic weight at the time of the update
    pub weight: f64,
}

/// Logs every myelin-plasticity delay-update event to a binary log
#[derive(Debug)]
pub struct MyelinPlasticityLogger {
    mask: NeuronMask,
    writer: MyelinLogWriter<BufWriter<File>>,
}

impl MyelinPlasticityLogger {
    /// Open `path` for writing; fails fast if the file cannot be created
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).map_err(esnn_storage::StorageError::from)?;
        Ok(Self {
            mask: NeuronMask::new(),
            writer: MyelinLogWriter::new(BufWriter::new(file)),
        })
    }

    /// Record one postsynaptic firing's worth of delay updates
    pub fn log_event(&mut self, timestamp: f64, postsynaptic_neuron: NeuronId, updates: &[DelayUpdate]) {
        let modified: Vec<ModifiedSynapse> = updates
            .iter()
            .map(|u| ModifiedSynapse {
                time_difference: u.time_difference as f32,
                presynaptic_neuron_id: u.presynaptic_neuron_id.raw() as u16,
                delay: u.delay_after as f32,
                weight: u.weight as f32,
            })
            .collect();
        let _ = self
            .writer
            .write_event(timestamp, postsynaptic_neuron.raw() as u16, &modified);
    }

    /// Flush the underlying log file
    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Addon for MyelinPlasticityLogger {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn do_not_automatically_include(&self) -> bool {
        true
    }
}
