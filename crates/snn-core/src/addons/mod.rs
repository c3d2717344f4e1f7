//! Logging and analysis addons: observers that consume the event stream
//! without mutating network dynamics (contrast with `learning`, whose
//! addons mutate weight/delay)

mod analysis;
mod connectivity;
mod myelin_plasticity_logger;
mod spike_logger;
mod weight_maps;

pub use analysis::Analysis;
pub use connectivity::Connectivity;
pub use myelin_plasticity_logger::MyelinPlasticityLogger;
pub use spike_logger::SpikeLogger;
pub use weight_maps::WeightMaps;
