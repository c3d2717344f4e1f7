//! JSON save/load schema for a saved network snapshot
//!
//! A saved network is a JSON document with top-level `neurons` and
//! `synapses` arrays. Each neuron record carries a `type` discriminant
//! (0-5) and whichever dynamical/topology fields that variant needs;
//! each synapse record carries a `json_id` kernel discriminant (0-3),
//! its endpoints, and its dynamical parameters.

#![cfg(feature = "serde")]

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Neuron type discriminant, matching the order neuron variants are
/// declared in the simulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum NeuronKind {
    /// Current-based leaky integrate-and-fire
    CubaLif = 0,
    /// ULPEC memristor-crossbar input neuron
    UlpecInput = 1,
    /// ULPEC memristor-crossbar LIF neuron
    UlpecLif = 2,
    /// Winner-take-all decision neuron
    Decision = 3,
    /// Regression output neuron
    Regression = 4,
    /// Pass-through parrot neuron
    Parrot = 5,
}

/// Synapse kernel discriminant, matching `Kernel`'s declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum KernelKind {
    /// Instantaneous delta-function kernel
    Dirac = 0,
    /// Fixed-width rectangular kernel
    Square = 1,
    /// Exponentially decaying kernel
    Exponential = 2,
    /// Memristor conductance-update kernel
    Memristor = 3,
}

/// One saved synapse record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseRecord {
    /// Synapse id
    pub id: u32,
    /// Kernel discriminant
    pub json_id: KernelKind,
    /// Presynaptic neuron id
    pub pre: u32,
    /// Postsynaptic neuron id
    pub post: u32,
    /// Synaptic weight
    pub weight: f64,
    /// Transmission delay
    pub delay: f64,
    /// Kernel time constant, if applicable
    pub time_constant: Option<f64>,
    /// External current offset
    pub external_current: f64,
}

/// One saved neuron record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    /// Neuron id
    pub id: u32,
    /// Neuron type discriminant
    #[serde(rename = "type")]
    pub kind: NeuronKind,
    /// Layer this neuron belongs to
    pub layer_id: u32,
    /// Firing threshold
    pub threshold: f64,
    /// Resting potential
    pub resting_potential: f64,
    /// Membrane time constant, where applicable
    pub tau_m: Option<f64>,
    /// Refractory period
    pub refractory_period: f64,
    /// Dendrite synapse ids
    pub dendritic_synapses: Vec<u32>,
    /// Axon-terminal synapse ids
    pub axonal_synapses: Vec<u32>,
}

/// One saved layer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Layer id
    pub id: u32,
    /// Layer name
    pub name: String,
    /// Whether the layer is active
    pub active: bool,
}

/// Full saved-network document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNetwork {
    /// Schema version, bumped whenever a field is added or reinterpreted
    pub version: u32,
    /// Saved layers, in creation order
    pub layers: Vec<LayerRecord>,
    /// Saved neurons, in creation order
    pub neurons: Vec<NeuronRecord>,
    /// Saved synapses, in creation order
    pub synapses: Vec<SynapseRecord>,
}

impl SavedNetwork {
    /// Serialize to a pretty-printed JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a JSON string
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
