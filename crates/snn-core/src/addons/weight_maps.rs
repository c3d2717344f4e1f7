//! Periodic dendritic-weight snapshot logger

use crate::addon::{Addon, NeuronMask};
use crate::error::{Result, SnnError};
use crate::network::Network;
use esnn_storage::{WeightMapLogWriter, WeightMapRecord};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Snapshots every masked neuron's dendritic weights every `step`-th pattern
///
/// Must be explicitly bound to the neurons it should track via
/// `activate_for`: an un-activated instance would otherwise snapshot the
/// entire network, which is rarely what a weight-map study wants.
#[derive(Debug)]
pub struct WeightMaps {
    mask: NeuronMask,
    writer: WeightMapLogWriter<BufWriter<File>>,
    step: u32,
    pattern_count: u32,
}

impl WeightMaps {
    /// Open `path` for writing; `step` is the pattern-snapshot interval and
    /// must be positive
    pub fn new(path: impl AsRef<Path>, step: u32) -> Result<Self> {
        if step == 0 {
            return Err(SnnError::invalid_config(
                "weight-map snapshot step must be greater than zero",
            ));
        }
        let file = File::create(path).map_err(esnn_storage::StorageError::from)?;
        Ok(Self {
            mask: NeuronMask::new(),
            writer: WeightMapLogWriter::new(BufWriter::new(file)),
            step,
            pattern_count: 0,
        })
    }
}

impl Addon for WeightMaps {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn do_not_automatically_include(&self) -> bool {
        true
    }

    fn on_pattern_end(&mut self, network: &mut Network) {
        self.pattern_count += 1;
        if self.pattern_count % self.step != 0 {
            return;
        }
        let ids: Vec<_> = self.mask.ids().copied().collect();
        for neuron_id in ids {
            let Ok(neuron) = network.neuron(neuron_id) else {
                continue;
            };
            let weights: Vec<f64> = neuron
                .common()
                .dendritic_tree
                .iter()
                .filter_map(|synapse_id| network.synapse(*synapse_id).ok().map(|s| s.weight))
                .collect();
            let _ = self.writer.write_record(&WeightMapRecord {
                neuron_id: neuron_id.raw() as u16,
                weights,
            });
        }
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::SchedulingMode;
    use crate::neuron::{Neuron, NeuronCommon, ParrotNeuron};
    use crate::synapse::{Kernel, Synapse};
    use crate::{NeuronId, SynapseId};

    #[test]
    fn test_zero_step_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = WeightMaps::new(dir.path().join("w.log"), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshots_only_on_step_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.log");
        let mut addon = WeightMaps::new(&path, 2).unwrap();

        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let layer = net.add_layer("l");
        let pre = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let post = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let synapse = Synapse::new(SynapseId::new(0), pre, post, 0.3, 1.0, Kernel::Dirac, 1.0).unwrap();
        net.add_synapse(synapse).unwrap();
        addon.activate_for(&[post]);

        addon.on_pattern_end(&mut net);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        addon.on_pattern_end(&mut net);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
