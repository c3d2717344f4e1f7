//! Default parameters and ambient run settings for a [`crate::network::Network`]

/// Default CUBA-LIF neuron parameters applied by the topology generators
/// unless a caller overrides them
#[derive(Debug, Clone)]
pub struct DefaultCubaLifParams {
    /// Membrane time constant
    pub tau_m: f64,
    /// Firing threshold
    pub threshold: f64,
    /// Resting potential
    pub resting_potential: f64,
    /// Refractory period
    pub refractory_period: f64,
    /// Activity-trace time constant
    pub trace_tau: f64,
}

impl Default for DefaultCubaLifParams {
    fn default() -> Self {
        Self {
            tau_m: 20.0,
            threshold: -50.0,
            resting_potential: -70.0,
            refractory_period: 2.0,
            trace_tau: 20.0,
        }
    }
}

/// Default classical-STDP learning-rule parameters
#[derive(Debug, Clone)]
pub struct DefaultStdpParams {
    /// Potentiation amplitude
    pub a_plus: f64,
    /// Depression amplitude
    pub a_minus: f64,
    /// Potentiation time constant
    pub tau_plus: f64,
    /// Depression time constant
    pub tau_minus: f64,
}

impl Default for DefaultStdpParams {
    fn default() -> Self {
        Self {
            a_plus: 0.01,
            a_minus: 0.012,
            tau_plus: 20.0,
            tau_minus: 20.0,
        }
    }
}

/// Default myelin-plasticity-v1 (delay learning) parameters
#[derive(Debug, Clone)]
pub struct DefaultMp1Params {
    /// Delay-learning time constant; must differ from the neuron's membrane time constant
    pub tau_mp: f64,
    /// Learning rate
    pub learning_rate: f64,
}

impl Default for DefaultMp1Params {
    fn default() -> Self {
        Self {
            tau_mp: 15.0,
            learning_rate: 0.001,
        }
    }
}

/// Network-wide defaults and ambient settings, analogous to the runtime's
/// per-network configuration bundle
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Default CUBA-LIF parameters used by topology generators
    pub default_cuba_lif_params: DefaultCubaLifParams,
    /// Default classical-STDP parameters
    pub default_stdp_params: DefaultStdpParams,
    /// Default myelin-plasticity-v1 parameters
    pub default_mp1_params: DefaultMp1Params,
    /// Default synaptic weight assigned by topology generators that don't sample one
    pub default_weight: f64,
    /// Whether plasticity addons run at all, independent of per-run `turn_off_learning`
    pub plasticity_enabled: bool,
    /// Logging verbosity level, mirrored into addon loggers (0 = silent)
    pub verbosity: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            default_cuba_lif_params: DefaultCubaLifParams::default(),
            default_stdp_params: DefaultStdpParams::default(),
            default_mp1_params: DefaultMp1Params::default(),
            default_weight: 0.1,
            plasticity_enabled: true,
            verbosity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_sane() {
        let config = NetworkConfig::default();
        assert!(config.default_cuba_lif_params.tau_m > 0.0);
        assert!(config.default_stdp_params.a_plus > 0.0);
        assert_ne!(
            config.default_mp1_params.tau_mp,
            config.default_cuba_lif_params.tau_m
        );
    }
}
