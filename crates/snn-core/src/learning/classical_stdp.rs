//! Classical pair-based STDP: a double-exponential kernel over `t_post - t_pre`

use crate::addon::{Addon, NeuronMask};
use crate::network::Network;
use crate::{NeuronId, SynapseId};

/// Weight update from a double-exponential STDP kernel
///
/// For `Δt = t_post - t_pre > 0` (pre fired before post) the synapse is
/// potentiated by `a_plus * exp(-Δt / tau_plus)`; for `Δt < 0` it is
/// depressed by `a_minus * exp(Δt / tau_minus)`. `Δt == 0` is a no-op.
#[derive(Debug, Clone)]
pub struct ClassicalStdp {
    mask: NeuronMask,
    /// Potentiation amplitude
    pub a_plus: f64,
    /// Depression amplitude
    pub a_minus: f64,
    /// Potentiation time constant
    pub tau_plus: f64,
    /// Depression time constant
    pub tau_minus: f64,
}

impl ClassicalStdp {
    /// Construct a new rule; must be explicitly bound to dendrites via `activate_for`
    pub fn new(a_plus: f64, a_minus: f64, tau_plus: f64, tau_minus: f64) -> Self {
        Self {
            mask: NeuronMask::new(),
            a_plus,
            a_minus,
            tau_plus,
            tau_minus,
        }
    }
}

impl Default for ClassicalStdp {
    fn default() -> Self {
        Self::new(0.01, 0.012, 20.0, 20.0)
    }
}

impl Addon for ClassicalStdp {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn do_not_automatically_include(&self) -> bool {
        true
    }

    fn learn(&mut self, t_post: f64, synapse_id: SynapseId, _post: NeuronId, network: &mut Network) {
        let Ok(synapse) = network.synapse(synapse_id) else {
            return;
        };
        let pre = synapse.pre;
        let Ok(pre_neuron) = network.neuron(pre) else {
            return;
        };
        let Some(t_pre) = pre_neuron.common().previous_spike_time else {
            return;
        };

        let dt = t_post - t_pre;
        let delta_w = if dt > 0.0 {
            self.a_plus * (-dt / self.tau_plus).exp()
        } else if dt < 0.0 {
            -self.a_minus * (dt / self.tau_minus).exp()
        } else {
            return;
        };

        if let Ok(synapse) = network.synapse_mut(synapse_id) {
            synapse.set_weight(synapse.weight + delta_w);
        }
    }
}
