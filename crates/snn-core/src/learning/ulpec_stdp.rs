//! Hardware-compatible STDP rule for the ULPEC memristor demonstrator

use crate::addon::{Addon, NeuronMask};
use crate::network::Network;
use crate::{NeuronId, SynapseId};

/// Simplified STDP rule compatible with the ULPEC memristor demonstrator
///
/// Potentiates a synapse's weight when the last-injected reading on it was
/// below `thres_pot`, depresses it when the reading was above `thres_dep`,
/// and clamps the result to `[g_min, g_max]`.
#[derive(Debug, Clone)]
pub struct UlpecStdp {
    mask: NeuronMask,
    /// Potentiation learning rate
    pub a_pot: f64,
    /// Depression learning rate
    pub a_dep: f64,
    /// Reading threshold below which potentiation is applied
    pub thres_pot: f64,
    /// Reading threshold above which depression is applied
    pub thres_dep: f64,
    /// Maximum conductance (weight) reachable by potentiation
    pub g_max: f64,
    /// Minimum conductance (weight) reachable by depression
    pub g_min: f64,
}

impl UlpecStdp {
    /// Construct a new rule; must be explicitly bound to dendrites via `activate_for`
    pub fn new(a_pot: f64, a_dep: f64, thres_pot: f64, thres_dep: f64, g_max: f64, g_min: f64) -> Self {
        Self {
            mask: NeuronMask::new(),
            a_pot,
            a_dep,
            thres_pot,
            thres_dep,
            g_max,
            g_min,
        }
    }
}

impl Default for UlpecStdp {
    fn default() -> Self {
        Self::new(0.1, -0.1, -1.2, 1.2, 1e-6, 1e-8)
    }
}

impl Addon for UlpecStdp {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn do_not_automatically_include(&self) -> bool {
        true
    }

    fn learn(&mut self, _t: f64, synapse_id: SynapseId, _post: NeuronId, network: &mut Network) {
        let Ok(synapse) = network.synapse(synapse_id) else {
            return;
        };
        let g0 = synapse.weight;
        let reading = synapse.synaptic_current;

        let delta = if reading <= self.thres_pot {
            self.a_pot * (self.g_max - g0)
        } else if reading >= self.thres_dep {
            self.a_dep * (g0 - self.g_min)
        } else {
            return;
        };

        if let Ok(synapse) = network.synapse_mut(synapse_id) {
            let new_weight = (g0 + delta).clamp(self.g_min, self.g_max);
            synapse.set_weight(new_weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::neuron::{NeuronCommon, ParrotNeuron};
    use crate::network::SchedulingMode;
    use crate::synapse::{Kernel, Synapse};
    use crate::LayerId;

    fn build_network_with_synapse(weight: f64) -> (Network, SynapseId) {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let layer = net.add_layer("l");
        let pre = net
            .add_neuron(layer, parrot_neuron(layer))
            .unwrap();
        let post = net
            .add_neuron(layer, parrot_neuron(layer))
            .unwrap();
        let synapse = Synapse::new(SynapseId::new(0), pre, post, weight, 1.0, Kernel::Memristor, 1.0).unwrap();
        let id = net.add_synapse(synapse).unwrap();
        (net, id)
    }

    fn parrot_neuron(layer: LayerId) -> crate::neuron::Neuron {
        crate::neuron::Neuron::Parrot(ParrotNeuron {
            common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0),
        })
    }

    #[test]
    fn test_potentiation_below_threshold() {
        let (mut net, synapse_id) = build_network_with_synapse(1e-8);
        net.synapse_mut(synapse_id).unwrap().synaptic_current = -2.0;
        let mut rule = UlpecStdp::default();
        rule.learn(0.0, synapse_id, NeuronId::new(1), &mut net);
        let w = net.synapse(synapse_id).unwrap().weight;
        assert!(w > 1e-8);
        assert!(w <= 1e-6);
    }

    #[test]
    fn test_depression_above_threshold() {
        let (mut net, synapse_id) = build_network_with_synapse(1e-6);
        net.synapse_mut(synapse_id).unwrap().synaptic_current = 2.0;
        let mut rule = UlpecStdp::default();
        rule.learn(0.0, synapse_id, NeuronId::new(1), &mut net);
        let w = net.synapse(synapse_id).unwrap().weight;
        assert!(w < 1e-6);
        assert!(w >= 1e-8);
    }

    #[test]
    fn test_no_change_inside_deadband() {
        let (mut net, synapse_id) = build_network_with_synapse(5e-7);
        net.synapse_mut(synapse_id).unwrap().synaptic_current = 0.0;
        let mut rule = UlpecStdp::default();
        rule.learn(0.0, synapse_id, NeuronId::new(1), &mut net);
        assert_eq!(net.synapse(synapse_id).unwrap().weight, 5e-7);
    }
}
