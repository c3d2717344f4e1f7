//! Myelin-plasticity v1: delay learning from pre/post trace timing

use crate::addon::{Addon, NeuronMask};
use crate::error::{Result, SnnError};
use crate::neuron::CubaLifNeuron;
use crate::network::Network;
use crate::{NeuronId, SynapseId};

/// Delay-learning rule: shifts a dendrite's transmission delay based on how
/// far its presynaptic trace lags the postsynaptic neuron's last input
///
/// `tau_mp` must differ from the postsynaptic neuron's membrane time
/// constant; the two terms share a `1 / (tau_mp - tau_m)` coefficient that
/// is singular when they're equal, so this is rejected at `learn` time (the
/// original rejects it as soon as the rule runs against a given neuron,
/// since `tau_m` is a per-neuron value not known until then).
#[derive(Debug, Clone)]
pub struct Mp1 {
    mask: NeuronMask,
    /// Delay-learning time constant
    pub tau_mp: f64,
    /// Learning rate
    pub learning_rate: f64,
}

impl Mp1 {
    /// Construct a new rule; must be explicitly bound to dendrites via `activate_for`
    pub fn new(tau_mp: f64, learning_rate: f64) -> Self {
        Self {
            mask: NeuronMask::new(),
            tau_mp,
            learning_rate,
        }
    }
}

impl Default for Mp1 {
    fn default() -> Self {
        Self::new(15.0, 0.001)
    }
}

impl Mp1 {
    /// Fail fast at topology-construction time if this rule's `tau_mp` would
    /// be singular against `neuron`'s membrane time constant, per the
    /// documented configuration-error invariant
    pub fn validate_against(&self, neuron: &CubaLifNeuron) -> Result<()> {
        if (self.tau_mp - neuron.tau_m).abs() < f64::EPSILON {
            return Err(SnnError::plasticity_error(
                "myelin plasticity time constant cannot equal the neuron's membrane time constant",
            ));
        }
        Ok(())
    }
}

impl Addon for Mp1 {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn do_not_automatically_include(&self) -> bool {
        true
    }

    fn learn(&mut self, t: f64, _synapse_id: SynapseId, post: NeuronId, network: &mut Network) {
        let Ok(post_neuron) = network.neuron(post) else {
            return;
        };
        let crate::neuron::Neuron::CubaLif(post_cuba) = post_neuron else {
            return;
        };
        let tau_m = post_cuba.tau_m;
        if (self.tau_mp - tau_m).abs() < f64::EPSILON {
            // the 1/(tau_mp - tau_m) coefficient is singular here; refuse to act
            return;
        }
        let post_current = post_cuba.common.current;
        let post_previous_input_time = post_cuba.common.previous_input_time;
        let dendrites = post_cuba.common.dendritic_tree.clone();
        let relevant_addons = post_cuba.common.relevant_addons.clone();

        let mut updates = Vec::new();
        for synapse_id in dendrites {
            let Ok(synapse) = network.synapse(synapse_id) else {
                continue;
            };
            let pre = synapse.pre;
            let spike_arrival_time = synapse.previous_input_time;
            let Ok(pre_neuron) = network.neuron(pre) else {
                continue;
            };
            let pre_trace = pre_neuron.common().trace;
            if pre_trace <= 0.0 {
                continue;
            }

            let time_difference = post_previous_input_time - spike_arrival_time;
            let delta_delay = self.learning_rate
                * (1.0 / (self.tau_mp - tau_m))
                * post_current
                * ((-time_difference / self.tau_mp).exp() - (-time_difference / tau_m).exp());

            let mut delay_after = synapse.delay;
            let weight = synapse.weight;
            if let Ok(synapse) = network.synapse_mut(synapse_id) {
                synapse.increment_delay(delta_delay);
                delay_after = synapse.delay;
            }
            if let Ok(pre_neuron) = network.neuron_mut(pre) {
                pre_neuron.common_mut().trace = 0.0;
            }

            updates.push(crate::addons::DelayUpdate {
                presynaptic_neuron_id: pre,
                synapse_id,
                time_difference,
                delay_after,
                weight,
            });
        }

        if updates.is_empty() {
            return;
        }
        for index in relevant_addons {
            let Some(mut addon) = network.take_addon(index) else {
                continue;
            };
            if let Some(logger) = addon
                .as_any_mut()
                .downcast_mut::<crate::addons::MyelinPlasticityLogger>()
            {
                logger.log_event(t, post, &updates);
            }
            network.return_addon(index, addon);
        }
    }
}
