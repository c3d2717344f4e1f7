//! Polymorphic synaptic edge state (C2)

use crate::error::{Result, SnnError};
use crate::{NeuronId, SynapseId};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Current-integration law used by a synapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// Instant additive step: a spike contributes its full weight for exactly
    /// one update, then the current collapses back to zero.
    Dirac,
    /// A spike holds the current constant at `weight` for `time_constant`
    /// simulated time units, then resets to zero.
    Square,
    /// A spike's contribution decays as `exp(-Δt / time_constant)`.
    ///
    /// Only valid in clock-driven networks — the decay law has no closed
    /// form the event-driven scheduler can exploit for predictive spikes,
    /// so it is rejected at `Network::validate` when the network is
    /// event-driven.
    Exponential,
    /// Conductance-like kernel: accumulates and resets on read, modelling a
    /// memristive device whose state is consumed by a read/write cycle.
    Memristor,
}

impl Kernel {
    /// Requires a positive time constant (division by it appears in the decay law)
    pub fn requires_positive_time_constant(&self) -> bool {
        matches!(self, Kernel::Exponential | Kernel::Square)
    }

    /// Whether this kernel can only be used in a clock-driven network
    pub fn clock_driven_only(&self) -> bool {
        matches!(self, Kernel::Exponential)
    }
}

/// A weighted, delayed connection between two neurons
#[derive(Debug, Clone)]
pub struct Synapse {
    /// Stable id, unique within the owning network
    pub id: SynapseId,
    /// Presynaptic (source) neuron
    pub pre: NeuronId,
    /// Postsynaptic (target) neuron
    pub post: NeuronId,
    /// Synaptic weight
    pub weight: f64,
    /// Transmission delay; must be non-negative
    pub delay: f64,
    /// Current-integration law
    pub kernel: Kernel,
    /// Time constant used by `Square`/`Exponential` kernels
    pub time_constant: f64,
    /// Constant bias current added on every `receive_spike`
    pub external_current: f64,
    /// Standard deviation of zero-mean Gaussian noise added on every spike
    pub noise_sigma: f64,
    /// Current post-synaptic current contribution
    pub synaptic_current: f64,
    /// Timestamp of the last accepted input, monotonically non-decreasing
    pub previous_input_time: f64,
}

impl Synapse {
    /// Construct a new synapse, validating delay and kernel time-constant requirements
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SynapseId,
        pre: NeuronId,
        post: NeuronId,
        weight: f64,
        delay: f64,
        kernel: Kernel,
        time_constant: f64,
    ) -> Result<Self> {
        if delay < 0.0 {
            return Err(SnnError::invalid_parameter(
                "delay",
                delay.to_string(),
                ">= 0.0",
            ));
        }
        if kernel.requires_positive_time_constant() && time_constant <= 0.0 {
            return Err(SnnError::invalid_parameter(
                "time_constant",
                time_constant.to_string(),
                "> 0.0",
            ));
        }

        Ok(Self {
            id,
            pre,
            post,
            weight,
            delay,
            kernel,
            time_constant,
            external_current: 1.0,
            noise_sigma: 0.0,
            synaptic_current: 0.0,
            previous_input_time: 0.0,
        })
    }

    /// Advance the synapse's current per the kernel's decay law
    ///
    /// `now` must be `>= previous_input_time`; callers are expected to feed
    /// monotonically increasing timestamps (the scheduler never rewinds).
    pub fn update(&mut self, now: f64) -> f64 {
        let dt = (now - self.previous_input_time).max(0.0);
        self.synaptic_current = match self.kernel {
            Kernel::Dirac => 0.0,
            Kernel::Square => {
                if dt < self.time_constant {
                    self.synaptic_current
                } else {
                    0.0
                }
            }
            Kernel::Exponential => self.synaptic_current * (-dt / self.time_constant).exp(),
            Kernel::Memristor => self.synaptic_current,
        };
        self.synaptic_current
    }

    /// Apply an incoming spike's contribution at time `now`
    ///
    /// Adds `weight * (external_current + N(0, noise_sigma^2))` for
    /// current-based kernels; for `Memristor`, the weight itself is the
    /// conductance read out and is not re-added to an existing current.
    pub fn receive_spike(&mut self, now: f64, rng: &mut impl Rng) -> f64 {
        let noise = if self.noise_sigma > 0.0 {
            Normal::new(0.0, self.noise_sigma)
                .expect("noise_sigma validated positive")
                .sample(rng)
        } else {
            0.0
        };

        match self.kernel {
            Kernel::Memristor => {
                self.synaptic_current = self.weight;
            }
            _ => {
                self.synaptic_current += self.weight * (self.external_current + noise);
            }
        }
        self.previous_input_time = self.previous_input_time.max(now);
        self.synaptic_current
    }

    /// Clear the synapse's accumulated current
    pub fn reset(&mut self) {
        self.synaptic_current = 0.0;
    }

    /// Plasticity write: overwrite the synaptic weight
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Plasticity write: shift the transmission delay by `delta`, floored at zero
    pub fn increment_delay(&mut self, delta: f64) {
        self.delay = (self.delay + delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn syn(kernel: Kernel, tau: f64) -> Synapse {
        Synapse::new(SynapseId::new(0), NeuronId::new(0), NeuronId::new(1), 1.0, 1.0, kernel, tau)
            .unwrap()
    }

    #[test]
    fn test_negative_delay_rejected() {
        let result = Synapse::new(
            SynapseId::new(0),
            NeuronId::new(0),
            NeuronId::new(1),
            1.0,
            -1.0,
            Kernel::Dirac,
            1.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_exponential_requires_positive_tau() {
        let result = Synapse::new(
            SynapseId::new(0),
            NeuronId::new(0),
            NeuronId::new(1),
            1.0,
            1.0,
            Kernel::Exponential,
            0.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dirac_collapses_after_one_update() {
        let mut s = syn(Kernel::Dirac, 1.0);
        let mut rng = StdRng::seed_from_u64(0);
        s.receive_spike(0.0, &mut rng);
        assert!(s.synaptic_current > 0.0);
        let current = s.update(1.0);
        assert_eq!(current, 0.0);
    }

    #[test]
    fn test_exponential_decay() {
        let mut s = syn(Kernel::Exponential, 2.0);
        let mut rng = StdRng::seed_from_u64(0);
        s.receive_spike(0.0, &mut rng);
        let before = s.synaptic_current;
        let after = s.update(2.0);
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn test_square_holds_then_resets() {
        let mut s = syn(Kernel::Square, 5.0);
        let mut rng = StdRng::seed_from_u64(0);
        s.receive_spike(0.0, &mut rng);
        let held = s.update(2.0);
        assert!(held > 0.0);
        let after = s.update(10.0);
        assert_eq!(after, 0.0);
    }

    #[test]
    fn test_previous_input_time_monotonic() {
        let mut s = syn(Kernel::Dirac, 1.0);
        let mut rng = StdRng::seed_from_u64(0);
        s.receive_spike(5.0, &mut rng);
        assert_eq!(s.previous_input_time, 5.0);
        s.receive_spike(3.0, &mut rng);
        assert_eq!(s.previous_input_time, 5.0);
    }

    #[test]
    fn test_plasticity_writes() {
        let mut s = syn(Kernel::Dirac, 1.0);
        s.set_weight(0.42);
        assert_eq!(s.weight, 0.42);
        s.increment_delay(-100.0);
        assert_eq!(s.delay, 0.0);
    }
}
