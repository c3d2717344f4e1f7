//! Layer/connection topology generators (C5)
//!
//! Free functions that build [`Neuron`]/[`Synapse`] values and hand them to
//! a [`Network`]'s construction API; `Network` itself owns no knowledge of
//! *how* a grid, circle, or random projection is laid out.

use crate::error::{Result, SnnError};
use crate::network::Network;
use crate::neuron::Neuron;
use crate::synapse::{Kernel, Synapse};
use crate::{LayerId, NeuronId, SynapseId};
use rand::Rng;
use rand_distr::{Cauchy, Distribution as _, LogNormal, Normal, Uniform as UniformDist};

/// A weight/delay sampling strategy for connection generators
///
/// Mirrors the weight/delay-pair generators a connection call is handed:
/// each variant draws both values from the same family of distribution,
/// with delays always clamped non-negative.
#[derive(Debug, Clone)]
pub enum WeightDelayDistribution {
    /// Fixed weight and delay, no sampling
    Fixed {
        /// Constant synaptic weight
        weight: f64,
        /// Constant synaptic delay
        delay: f64,
    },
    /// Gaussian-distributed weight and delay
    Normal {
        /// Weight distribution mean
        weight_mean: f64,
        /// Weight distribution standard deviation
        weight_std_dev: f64,
        /// Delay distribution mean
        delay_mean: f64,
        /// Delay distribution standard deviation
        delay_std_dev: f64,
    },
    /// Uniformly distributed weight and delay
    Uniform {
        /// Weight lower bound
        weight_low: f64,
        /// Weight upper bound
        weight_high: f64,
        /// Delay lower bound, must be non-negative
        delay_low: f64,
        /// Delay upper bound, must be non-negative
        delay_high: f64,
    },
    /// Cauchy-distributed weight and delay (delay magnitude only)
    Cauchy {
        /// Weight distribution location
        weight_location: f64,
        /// Weight distribution scale
        weight_scale: f64,
        /// Delay distribution location
        delay_location: f64,
        /// Delay distribution scale
        delay_scale: f64,
    },
    /// Log-normally distributed weight and delay
    LogNormal {
        /// Weight distribution mu
        weight_mu: f64,
        /// Weight distribution sigma
        weight_sigma: f64,
        /// Delay distribution mu
        delay_mu: f64,
        /// Delay distribution sigma
        delay_sigma: f64,
    },
}

impl WeightDelayDistribution {
    /// Draw a `(weight, delay)` pair, clamping delay to non-negative
    pub fn sample(&self, rng: &mut impl Rng) -> Result<(f64, f64)> {
        match self {
            Self::Fixed { weight, delay } => Ok((*weight, delay.max(0.0))),
            Self::Normal {
                weight_mean,
                weight_std_dev,
                delay_mean,
                delay_std_dev,
            } => {
                let w = Normal::new(*weight_mean, *weight_std_dev)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                let d = Normal::new(*delay_mean, *delay_std_dev)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                Ok((w, d.max(0.0)))
            }
            Self::Uniform {
                weight_low,
                weight_high,
                delay_low,
                delay_high,
            } => {
                if *delay_low < 0.0 || *delay_high < 0.0 {
                    return Err(SnnError::invalid_config("delay range cannot be negative"));
                }
                if *weight_low >= *weight_high || *delay_low >= *delay_high {
                    return Err(SnnError::invalid_config("uniform distribution bounds must be non-empty"));
                }
                let w = UniformDist::new(*weight_low, *weight_high).sample(rng);
                let d = UniformDist::new(*delay_low, *delay_high).sample(rng);
                Ok((w, d))
            }
            Self::Cauchy {
                weight_location,
                weight_scale,
                delay_location,
                delay_scale,
            } => {
                let w = Cauchy::new(*weight_location, *weight_scale)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                let d = Cauchy::new(*delay_location, *delay_scale)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                Ok((w, d.abs()))
            }
            Self::LogNormal {
                weight_mu,
                weight_sigma,
                delay_mu,
                delay_sigma,
            } => {
                let w = LogNormal::new(*weight_mu, *weight_sigma)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                let d = LogNormal::new(*delay_mu, *delay_sigma)
                    .map_err(|e| SnnError::invalid_config(e.to_string()))?
                    .sample(rng);
                Ok((w, d.max(0.0)))
            }
        }
    }
}

/// A rectangular sub-region of a grid layer, used to bind receptive fields
/// for convolutional/pooling connection generators
#[derive(Debug, Clone, Copy)]
pub struct Sublayer {
    /// Receptive-field index within the owning layer
    pub rf_id: u32,
    /// Grid x origin
    pub x0: i32,
    /// Grid y origin
    pub y0: i32,
    /// Sub-region width
    pub width: i32,
    /// Sub-region height
    pub height: i32,
}

/// Create an empty layer and populate it with `count` neurons built by `factory`
///
/// `factory(index)` returns a fully formed `Neuron`; its `id`/`layer_id`
/// fields are overwritten by `add_neuron` and need not be set correctly.
pub fn make_layer(
    net: &mut Network,
    name: impl Into<String>,
    count: usize,
    mut factory: impl FnMut(usize) -> Neuron,
) -> Result<(LayerId, Vec<NeuronId>)> {
    let layer_id = net.add_layer(name);
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(net.add_neuron(layer_id, factory(i))?);
    }
    Ok((layer_id, ids))
}

/// Create a `width * height` grid layer, row-major, with `xy` set on each neuron
pub fn make_grid(
    net: &mut Network,
    name: impl Into<String>,
    width: i32,
    height: i32,
    mut factory: impl FnMut(i32, i32) -> Neuron,
) -> Result<(LayerId, Vec<NeuronId>)> {
    if width <= 0 || height <= 0 {
        return Err(SnnError::invalid_config("grid dimensions must be positive"));
    }
    let layer_id = net.add_layer(name);
    let mut ids = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let mut neuron = factory(x, y);
            neuron.common_mut().xy = (x, y);
            ids.push(net.add_neuron(layer_id, neuron)?);
        }
    }
    Ok((layer_id, ids))
}

/// Partition a grid layer's neurons into overlapping receptive fields of
/// `rf_size * rf_size` with the given `stride`, tagging each neuron's `rf_id`
///
/// `grid_ids` must be in the row-major order `make_grid` produces.
pub fn make_convolutional_grid(
    net: &mut Network,
    grid_ids: &[NeuronId],
    width: i32,
    height: i32,
    rf_size: i32,
    stride: i32,
) -> Result<Vec<Sublayer>> {
    if rf_size <= 0 || stride <= 0 {
        return Err(SnnError::invalid_config("receptive-field size and stride must be positive"));
    }
    let mut sublayers = Vec::new();
    let mut rf_id = 0u32;
    let mut y0 = 0;
    while y0 + rf_size <= height {
        let mut x0 = 0;
        while x0 + rf_size <= width {
            for y in y0..y0 + rf_size {
                for x in x0..x0 + rf_size {
                    let idx = (y * width + x) as usize;
                    if let Some(&id) = grid_ids.get(idx) {
                        if let Ok(neuron) = net.neuron_mut(id) {
                            neuron.common_mut().rf_id = rf_id;
                        }
                    }
                }
            }
            sublayers.push(Sublayer {
                rf_id,
                x0,
                y0,
                width: rf_size,
                height: rf_size,
            });
            rf_id += 1;
            x0 += stride;
        }
        y0 += stride;
    }
    Ok(sublayers)
}

/// Create a `count`-neuron layer whose neurons are positioned evenly around
/// a circle of the given radius, with `xy` rounded to the nearest grid cell
pub fn make_circle(
    net: &mut Network,
    name: impl Into<String>,
    count: usize,
    radius: f64,
    mut factory: impl FnMut(usize) -> Neuron,
) -> Result<(LayerId, Vec<NeuronId>)> {
    if count == 0 {
        return Err(SnnError::invalid_config("circle layer must have at least one neuron"));
    }
    let layer_id = net.add_layer(name);
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let angle = 2.0 * std::f64::consts::PI * (i as f64) / (count as f64);
        let mut neuron = factory(i);
        neuron.common_mut().xy = ((radius * angle.cos()).round() as i32, (radius * angle.sin()).round() as i32);
        ids.push(net.add_neuron(layer_id, neuron)?);
    }
    Ok((layer_id, ids))
}

/// Create a `count`-neuron decision layer, one neuron per entry in `class_labels`
pub fn make_decision(
    net: &mut Network,
    name: impl Into<String>,
    class_labels: &[i32],
    threshold: f64,
    resting_potential: f64,
) -> Result<(LayerId, Vec<NeuronId>)> {
    use crate::neuron::{DecisionNeuron, NeuronCommon};

    if class_labels.is_empty() {
        return Err(SnnError::invalid_config("decision layer needs at least one class label"));
    }
    let layer_id = net.add_layer(name);
    let mut ids = Vec::with_capacity(class_labels.len());
    for &label in class_labels {
        let mut common = NeuronCommon::new(NeuronId::new(0), layer_id, threshold, resting_potential);
        common.class_label = Some(label);
        ids.push(net.add_neuron(layer_id, Neuron::Decision(DecisionNeuron { common, intensity: 0.0 }))?);
    }
    Ok((layer_id, ids))
}

/// Create a single-neuron regression layer backed by `model`
pub fn make_logistic_regression(
    net: &mut Network,
    name: impl Into<String>,
    model: Box<dyn crate::neuron::RegressionModel>,
) -> Result<(LayerId, NeuronId)> {
    use crate::neuron::{NeuronCommon, RegressionNeuron};

    let layer_id = net.add_layer(name);
    let common = NeuronCommon::new(NeuronId::new(0), layer_id, f64::INFINITY, 0.0);
    let id = net.add_neuron(
        layer_id,
        Neuron::Regression(RegressionNeuron {
            common,
            features: Vec::new(),
            model,
        }),
    )?;
    Ok((layer_id, id))
}

fn push_synapse(
    net: &mut Network,
    pre: NeuronId,
    post: NeuronId,
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<SynapseId> {
    let (weight, delay) = dist.sample(net.rng_mut())?;
    let synapse = Synapse::new(SynapseId::new(0), pre, post, weight, delay, kernel, time_constant)?;
    net.add_synapse(synapse)
}

/// Connect every neuron in `pre` to every neuron in `post`
pub fn all_to_all(
    net: &mut Network,
    pre: &[NeuronId],
    post: &[NeuronId],
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<Vec<SynapseId>> {
    let mut ids = Vec::with_capacity(pre.len() * post.len());
    for &pre_id in pre {
        for &post_id in post {
            ids.push(push_synapse(net, pre_id, post_id, kernel, time_constant, dist)?);
        }
    }
    Ok(ids)
}

/// Connect `pre[i]` to `post[i]` for every index; the two slices must be equal length
pub fn one_to_one(
    net: &mut Network,
    pre: &[NeuronId],
    post: &[NeuronId],
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<Vec<SynapseId>> {
    if pre.len() != post.len() {
        return Err(SnnError::network_topology(format!(
            "one_to_one requires equal layer shapes, got {} and {}",
            pre.len(),
            post.len()
        )));
    }
    let mut ids = Vec::with_capacity(pre.len());
    for (&pre_id, &post_id) in pre.iter().zip(post) {
        ids.push(push_synapse(net, pre_id, post_id, kernel, time_constant, dist)?);
    }
    Ok(ids)
}

/// Connect each post-layer receptive field to its corresponding pre-grid neurons
pub fn convolution(
    net: &mut Network,
    pre_grid: &[NeuronId],
    pre_width: i32,
    post_sublayers: &[Sublayer],
    post: &[NeuronId],
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<Vec<SynapseId>> {
    if post_sublayers.len() != post.len() {
        return Err(SnnError::network_topology(
            "convolution requires one sublayer per output neuron",
        ));
    }
    let mut ids = Vec::new();
    for (sublayer, &post_id) in post_sublayers.iter().zip(post) {
        for y in sublayer.y0..sublayer.y0 + sublayer.height {
            for x in sublayer.x0..sublayer.x0 + sublayer.width {
                let idx = (y * pre_width + x) as usize;
                if let Some(&pre_id) = pre_grid.get(idx) {
                    ids.push(push_synapse(net, pre_id, post_id, kernel, time_constant, dist)?);
                }
            }
        }
    }
    Ok(ids)
}

/// Connect each post-layer neuron to every pre-grid neuron in its pooling window
///
/// Identical wiring to [`convolution`]; kept as a distinct name because the
/// post layer it feeds plays a different topological role (downsampling
/// rather than feature extraction).
pub fn pooling(
    net: &mut Network,
    pre_grid: &[NeuronId],
    pre_width: i32,
    post_sublayers: &[Sublayer],
    post: &[NeuronId],
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<Vec<SynapseId>> {
    convolution(net, pre_grid, pre_width, post_sublayers, post, kernel, time_constant, dist)
}

/// Connect each post neuron to a random `sample_percentage`% subset of `pre`
///
/// `sample_percentage` must lie in `[1, 100]`.
pub fn random_to_all(
    net: &mut Network,
    pre: &[NeuronId],
    post: &[NeuronId],
    sample_percentage: f64,
    kernel: Kernel,
    time_constant: f64,
    dist: &WeightDelayDistribution,
) -> Result<Vec<SynapseId>> {
    if !(1.0..=100.0).contains(&sample_percentage) {
        return Err(SnnError::invalid_config(
            "sample percentage must lie in [1, 100]",
        ));
    }
    let sample_count = ((pre.len() as f64) * sample_percentage / 100.0).round().max(1.0) as usize;
    let mut ids = Vec::new();
    for &post_id in post {
        let mut candidates: Vec<NeuronId> = pre.to_vec();
        let rng = net.rng_mut();
        for i in (1..candidates.len()).rev() {
            let j = rng.gen_range(0..=i);
            candidates.swap(i, j);
        }
        for &pre_id in candidates.iter().take(sample_count) {
            ids.push(push_synapse(net, pre_id, post_id, kernel, time_constant, dist)?);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::SchedulingMode;
    use crate::neuron::{NeuronCommon, ParrotNeuron};

    fn parrot(layer: LayerId) -> Neuron {
        Neuron::Parrot(ParrotNeuron {
            common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0),
        })
    }

    #[test]
    fn test_make_grid_assigns_xy() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let (_layer, ids) = make_grid(&mut net, "grid", 2, 2, |_, _| parrot(LayerId::new(0))).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(net.neuron(ids[1]).unwrap().common().xy, (1, 0));
        assert_eq!(net.neuron(ids[2]).unwrap().common().xy, (0, 1));
    }

    #[test]
    fn test_one_to_one_rejects_mismatched_shapes() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let (layer, pre) = make_layer(&mut net, "a", 3, |_| parrot(LayerId::new(0))).unwrap();
        let (_, post) = make_layer(&mut net, "b", 2, |_| parrot(layer)).unwrap();
        let dist = WeightDelayDistribution::Fixed { weight: 1.0, delay: 0.0 };
        let result = one_to_one(&mut net, &pre, &post, Kernel::Dirac, 1.0, &dist);
        assert!(result.is_err());
    }

    #[test]
    fn test_all_to_all_connects_every_pair() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let (_, pre) = make_layer(&mut net, "a", 2, |_| parrot(LayerId::new(0))).unwrap();
        let (_, post) = make_layer(&mut net, "b", 3, |_| parrot(LayerId::new(0))).unwrap();
        let dist = WeightDelayDistribution::Fixed { weight: 0.5, delay: 1.0 };
        let ids = all_to_all(&mut net, &pre, &post, Kernel::Dirac, 1.0, &dist).unwrap();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_random_to_all_rejects_out_of_range_percentage() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let (_, pre) = make_layer(&mut net, "a", 3, |_| parrot(LayerId::new(0))).unwrap();
        let (_, post) = make_layer(&mut net, "b", 1, |_| parrot(LayerId::new(0))).unwrap();
        let dist = WeightDelayDistribution::Fixed { weight: 1.0, delay: 0.0 };
        let result = random_to_all(&mut net, &pre, &post, 150.0, Kernel::Dirac, 1.0, &dist);
        assert!(result.is_err());
    }

    #[test]
    fn test_make_decision_assigns_class_labels() {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let (_, ids) = make_decision(&mut net, "out", &[0, 1, 2], -50.0, -70.0).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(net.neuron(ids[1]).unwrap().common().class_label, Some(1));
    }
}
