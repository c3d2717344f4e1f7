//! Output-layer axon-terminal connectivity report

use crate::addon::{Addon, NeuronMask};
use crate::error::Result;
use crate::network::Network;
use crate::{LayerId, NeuronId};
use std::io::Write;
use std::path::PathBuf;

/// Records, for each neuron in a decision/regression output layer, whether
/// it has any outgoing synapses
///
/// The original collaborator serialized this as an interleaved flat integer
/// array for a numpy consumer; here it is a plain `Vec<(NeuronId, bool)>`,
/// optionally also written to `path` as `neuron_id has_axon_terminals` lines.
#[derive(Debug)]
pub struct Connectivity {
    mask: NeuronMask,
    output_layer: LayerId,
    path: Option<PathBuf>,
    results: Vec<(NeuronId, bool)>,
}

impl Connectivity {
    /// Inspect `output_layer`'s neurons at `on_completed`, optionally writing the report to `path`
    pub fn new(output_layer: LayerId, path: Option<PathBuf>) -> Self {
        Self {
            mask: NeuronMask::new(),
            output_layer,
            path,
            results: Vec::new(),
        }
    }

    /// The connectivity report computed by the most recent `on_completed` call
    pub fn results(&self) -> &[(NeuronId, bool)] {
        &self.results
    }
}

impl Addon for Connectivity {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn on_completed(&mut self, network: &mut Network) {
        let Ok(layer) = network.layer(self.output_layer) else {
            return;
        };
        self.results = layer
            .neuron_ids
            .iter()
            .filter_map(|&id| {
                network
                    .neuron(id)
                    .ok()
                    .map(|n| (id, !n.common().axon_terminals.is_empty()))
            })
            .collect();

        if let Some(path) = &self.path {
            if let Ok(mut file) = std::fs::File::create(path) {
                for (id, has_terminals) in &self.results {
                    let _ = writeln!(file, "{} {}", id.raw(), *has_terminals as u8);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::SchedulingMode;
    use crate::neuron::{Neuron, NeuronCommon, ParrotNeuron};
    use crate::synapse::{Kernel, Synapse};
    use crate::SynapseId;

    #[test]
    fn test_reports_axon_terminal_presence() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let layer = net.add_layer("out");
        let connected = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let isolated = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let sink = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let synapse = Synapse::new(SynapseId::new(0), connected, sink, 0.5, 1.0, Kernel::Dirac, 1.0).unwrap();
        net.add_synapse(synapse).unwrap();

        let mut addon = Connectivity::new(layer, None);
        addon.on_completed(&mut net);

        let results = addon.results();
        assert!(results.contains(&(connected, true)));
        assert!(results.contains(&(isolated, false)));
    }
}
