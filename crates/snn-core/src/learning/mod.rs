//! Plasticity rules: addons that mutate synaptic weight/delay from `learn` hooks

mod classical_stdp;
mod mp1;
mod ulpec_stdp;

pub use classical_stdp::ClassicalStdp;
pub use mp1::Mp1;
pub use ulpec_stdp::UlpecStdp;
