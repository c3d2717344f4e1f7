//! Binary spike-by-spike activity logger

use crate::addon::{Addon, NeuronMask};
use crate::error::Result;
use crate::network::Network;
use crate::{NeuronId, SynapseId};
use esnn_storage::{SpikeLogWriter, SpikeRecord};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Logs every incoming-spike and neuron-fired event to a binary spike log
///
/// Writes the 19-byte record spec.md §6 describes for both hooks, preceded
/// by an 8-byte `learning_off_time` header emitted at `on_start` (once the
/// run's learning cutoff, if any, has been configured).
#[derive(Debug)]
pub struct SpikeLogger {
    mask: NeuronMask,
    writer: SpikeLogWriter<BufWriter<File>>,
}

impl SpikeLogger {
    /// Open `path` for writing; fails fast if the file cannot be created
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path).map_err(esnn_storage::StorageError::from)?;
        Ok(Self {
            mask: NeuronMask::new(),
            writer: SpikeLogWriter::new(BufWriter::new(file)),
        })
    }

    fn record_for(t: f64, synapse_id: Option<SynapseId>, post: NeuronId, network: &Network) -> Option<SpikeRecord> {
        let post_neuron = network.neuron(post).ok()?;
        let common = post_neuron.common();
        let (delay, weight) = match synapse_id {
            Some(id) => match network.synapse(id) {
                Ok(synapse) => (synapse.delay as f32, synapse.weight as f32),
                Err(_) => (0.0, 0.0),
            },
            None => (0.0, 0.0),
        };
        Some(SpikeRecord {
            t,
            delay,
            weight,
            potential: common.potential as f32,
            neuron_id: common.id.raw() as u16,
            layer_id: common.layer_id.raw() as i8,
            rf_id: common.rf_id as i8,
            x: common.xy.0 as i8,
            y: common.xy.1 as i8,
        })
    }
}

impl Addon for SpikeLogger {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn on_start(&mut self, network: &mut Network) {
        let learning_off_time = network.learning_off_time().unwrap_or(0.0);
        let _ = self.writer.write_header(learning_off_time);
    }

    fn incoming_spike(&mut self, t: f64, synapse_id: SynapseId, post: NeuronId, network: &mut Network) {
        if let Some(record) = Self::record_for(t, Some(synapse_id), post, network) {
            let _ = self.writer.write_record(&record);
        }
    }

    fn neuron_fired(&mut self, t: f64, synapse_id: Option<SynapseId>, post: NeuronId, network: &mut Network) {
        if let Some(record) = Self::record_for(t, synapse_id, post, network) {
            let _ = self.writer.write_record(&record);
        }
    }

    fn on_completed(&mut self, _network: &mut Network) {
        let _ = self.writer.flush();
    }
}
