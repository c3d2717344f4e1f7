//! Stable integer identifiers for arena-owned objects

use core::fmt;

/// Unique identifier for a neuron, stable for the lifetime of the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeuronId(pub u32);

impl NeuronId {
    /// Create a new neuron id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Unique identifier for a synapse, stable for the lifetime of the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SynapseId(pub u32);

impl SynapseId {
    /// Create a new synapse id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SynapseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Unique identifier for a layer, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u32);

impl LayerId {
    /// Create a new layer id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}
