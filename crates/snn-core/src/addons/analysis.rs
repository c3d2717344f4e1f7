//! Test-time classification accuracy tracker

use crate::addon::{Addon, NeuronMask};
use crate::network::Network;
use crate::{LayerId, NeuronId, SynapseId};
use std::io::Write;
use std::path::PathBuf;

/// Tallies predicted vs. actual labels across a test run's patterns
///
/// Only records a prediction once learning has been turned off (§7: the
/// core never retries; a `decision_failed` pattern is scored as label `-1`
/// rather than treated as an error).
#[derive(Debug)]
pub struct Analysis {
    mask: NeuronMask,
    decision_layer: LayerId,
    test_labels: Vec<i32>,
    output_path: Option<PathBuf>,
    current_prediction: Option<i32>,
    predicted: Vec<i32>,
}

impl Analysis {
    /// Track accuracy against `test_labels` for decisions fired from `decision_layer`
    pub fn new(decision_layer: LayerId, test_labels: Vec<i32>, output_path: Option<PathBuf>) -> Self {
        Self {
            mask: NeuronMask::new(),
            decision_layer,
            test_labels,
            output_path,
            current_prediction: None,
            predicted: Vec::new(),
        }
    }

    fn learning_is_off(network: &Network) -> bool {
        network
            .learning_off_time()
            .map(|t| network.current_time() >= t)
            .unwrap_or(false)
    }

    /// Classification accuracy over patterns scored so far, as a percentage
    ///
    /// Returns the `-1.0` sentinel if no test labels were supplied (a bad
    /// label mapping, per §7, is logged elsewhere and never treated as an
    /// error here).
    pub fn accuracy(&self) -> f64 {
        if self.test_labels.is_empty() {
            return -1.0;
        }
        let total = self.test_labels.len().min(self.predicted.len());
        if total == 0 {
            return -1.0;
        }
        let correct = self.test_labels[..total]
            .iter()
            .zip(&self.predicted[..total])
            .filter(|(a, b)| a == b)
            .count();
        100.0 * correct as f64 / total as f64
    }

    /// Predicted labels, one per completed pattern, `-1` where no decision fired
    pub fn predicted(&self) -> &[i32] {
        &self.predicted
    }
}

impl Addon for Analysis {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn neuron_fired(&mut self, _t: f64, _synapse_id: Option<SynapseId>, post: NeuronId, network: &mut Network) {
        if !Self::learning_is_off(network) {
            return;
        }
        let Ok(neuron) = network.neuron(post) else {
            return;
        };
        if neuron.common().layer_id != self.decision_layer {
            return;
        }
        if let Some(label) = neuron.common().class_label {
            self.current_prediction = Some(label);
        }
    }

    fn decision_failed(&mut self, _t: f64, network: &mut Network) {
        if !Self::learning_is_off(network) {
            return;
        }
        self.current_prediction = Some(-1);
    }

    fn on_pattern_end(&mut self, network: &mut Network) {
        if !Self::learning_is_off(network) {
            return;
        }
        self.predicted.push(self.current_prediction.take().unwrap_or(-1));
    }

    fn on_completed(&mut self, _network: &mut Network) {
        let Some(path) = &self.output_path else {
            return;
        };
        let Ok(mut file) = std::fs::File::create(path) else {
            return;
        };
        for (actual, predicted) in self.test_labels.iter().zip(&self.predicted) {
            let _ = writeln!(file, "{} {}", actual, predicted);
        }
    }
}
