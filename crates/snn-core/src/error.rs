//! Error types for the simulation core

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, SnnError>;

/// Errors that can occur while building or running a network
#[derive(Error, Debug)]
pub enum SnnError {
    /// Storage layer error (binary log / JSON save-load)
    #[error("Storage error: {source}")]
    Storage {
        #[from]
        /// Source storage error
        source: esnn_storage::StorageError,
    },

    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Neuron not found
    #[error("Neuron {neuron_id} not found")]
    NeuronNotFound {
        /// Neuron id that was not found
        neuron_id: u32,
    },

    /// Synapse not found
    #[error("Synapse {synapse_id} not found")]
    SynapseNotFound {
        /// Synapse id that was not found
        synapse_id: u32,
    },

    /// Layer not found
    #[error("Layer {layer_id} not found")]
    LayerNotFound {
        /// Layer id that was not found
        layer_id: u32,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Simulation step failed
    #[error("Simulation step failed at time {time}: {reason}")]
    SimulationStep {
        /// Time when the step failed
        time: f64,
        /// Reason for failure
        reason: String,
    },

    /// Network topology error
    #[error("Network topology error: {reason}")]
    NetworkTopology {
        /// Reason for the topology error
        reason: String,
    },

    /// Plasticity rule configuration or runtime error
    #[error("Plasticity rule error: {reason}")]
    PlasticityError {
        /// Reason for the plasticity error
        reason: String,
    },

    /// Numerical computation error
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Reason for the numerical error
        reason: String,
    },
}

impl SnnError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a neuron-not-found error
    pub fn neuron_not_found(neuron_id: crate::NeuronId) -> Self {
        Self::NeuronNotFound {
            neuron_id: neuron_id.raw(),
        }
    }

    /// Create a synapse-not-found error
    pub fn synapse_not_found(synapse_id: crate::SynapseId) -> Self {
        Self::SynapseNotFound {
            synapse_id: synapse_id.raw(),
        }
    }

    /// Create a layer-not-found error
    pub fn layer_not_found(layer_id: crate::LayerId) -> Self {
        Self::LayerNotFound {
            layer_id: layer_id.raw(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a simulation step error
    pub fn simulation_step(time: f64, reason: impl Into<String>) -> Self {
        Self::SimulationStep {
            time,
            reason: reason.into(),
        }
    }

    /// Create a network topology error
    pub fn network_topology(reason: impl Into<String>) -> Self {
        Self::NetworkTopology {
            reason: reason.into(),
        }
    }

    /// Create a plasticity error
    pub fn plasticity_error(reason: impl Into<String>) -> Self {
        Self::PlasticityError {
            reason: reason.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical_error(reason: impl Into<String>) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SnnError::invalid_config("missing neurons");
        assert!(matches!(err, SnnError::InvalidConfiguration { .. }));

        let err = SnnError::invalid_parameter("tau_m", "0.0", "> 0.0");
        assert!(matches!(err, SnnError::InvalidParameter { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = SnnError::NeuronNotFound { neuron_id: 42 };
        let msg = format!("{}", err);
        assert!(msg.contains("Neuron 42 not found"));
    }
}
