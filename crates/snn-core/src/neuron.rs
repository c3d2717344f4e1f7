//! Polymorphic vertex state machine (C3)

use crate::addon::Addon;
use crate::error::{Result, SnnError};
use crate::event::{Event, EventKind};
use crate::network::Network;
use crate::{LayerId, NeuronId, SynapseId};

/// Fields shared by every neuron variant
#[derive(Debug, Clone)]
pub struct NeuronCommon {
    /// Stable id, unique within the owning network
    pub id: NeuronId,
    /// Layer this neuron belongs to
    pub layer_id: LayerId,
    /// Sublayer index within the layer
    pub sublayer_id: u32,
    /// Receptive-field index, set by convolutional topology generators
    pub rf_id: u32,
    /// Grid coordinates, set by grid/convolutional topology generators
    pub xy: (i32, i32),
    /// Minimum time between consecutive fires
    pub refractory_period: f64,
    /// Membrane capacitance
    pub capacitance: f64,
    /// Leak conductance
    pub leak_conductance: f64,
    /// Time constant of the activity trace used as a plasticity eligibility signal
    pub trace_tau: f64,
    /// Firing threshold
    pub threshold: f64,
    /// Resting (and reset) potential
    pub resting_potential: f64,
    /// Class label this neuron represents, for decision/classifier layers
    pub class_label: Option<i32>,

    /// Membrane potential
    pub potential: f64,
    /// Exponentially filtered recent-activity trace
    pub trace: f64,
    /// Accumulated input current
    pub current: f64,
    /// Timestamp of the most recent fire, if any
    pub previous_spike_time: Option<f64>,
    /// Timestamp of the most recent accepted input
    pub previous_input_time: f64,
    /// Soonest time this neuron may fire again
    pub refractory_until: f64,
    /// Whether the neuron is eligible to integrate/fire (distinct from layer activation)
    pub active: bool,
    /// Incoming synapse ids
    pub dendritic_tree: Vec<SynapseId>,
    /// Outgoing synapse ids
    pub axon_terminals: Vec<SynapseId>,
    /// Indices into the owning network's addon list, bound at `initialise`
    pub relevant_addons: Vec<usize>,
    /// Recent fired-class labels, used by histogram-vote decision neurons
    pub decision_queue: Vec<i32>,
}

impl NeuronCommon {
    /// Construct a new neuron in its resting state
    pub fn new(id: NeuronId, layer_id: LayerId, threshold: f64, resting_potential: f64) -> Self {
        Self {
            id,
            layer_id,
            sublayer_id: 0,
            rf_id: 0,
            xy: (0, 0),
            refractory_period: 0.0,
            capacitance: 1.0,
            leak_conductance: 1.0,
            trace_tau: 20.0,
            threshold,
            resting_potential,
            class_label: None,
            potential: resting_potential,
            trace: 0.0,
            current: 0.0,
            previous_spike_time: None,
            previous_input_time: 0.0,
            refractory_until: f64::NEG_INFINITY,
            active: true,
            dendritic_tree: Vec::new(),
            axon_terminals: Vec::new(),
            relevant_addons: Vec::new(),
            decision_queue: Vec::new(),
        }
    }

    /// Reset runtime state back to the resting configuration
    pub fn reset(&mut self) {
        self.potential = self.resting_potential;
        self.trace = 0.0;
        self.current = 0.0;
        self.previous_spike_time = None;
        self.previous_input_time = 0.0;
        self.refractory_until = f64::NEG_INFINITY;
        self.decision_queue.clear();
    }

    fn is_refractory(&self, now: f64) -> bool {
        now < self.refractory_until
    }
}

/// Homeostatic threshold adaptation parameters (clock-driven mode only)
#[derive(Debug, Clone)]
pub struct Homeostasis {
    /// Fixed point the threshold decays toward
    pub resting_threshold: f64,
    /// Increment applied to the threshold on every accepted input
    pub beta: f64,
    /// Time constant of the threshold decay
    pub tau_h: f64,
}

/// Leaky integrate-and-fire neuron with optional bursting, homeostasis, and WTA
#[derive(Debug, Clone)]
pub struct CubaLifNeuron {
    /// Shared fields
    pub common: NeuronCommon,
    /// Membrane time constant
    pub tau_m: f64,
    /// If true, current is not reset to zero after firing
    pub bursting: bool,
    /// Adaptive-threshold homeostasis, valid only in clock-driven mode
    pub homeostasis: Option<Homeostasis>,
    /// Whether firing resets peer potentials in the same layer
    pub wta: bool,
}

/// Hardware-model input neuron generating ULPEC voltage-waveform trigger events
#[derive(Debug, Clone)]
pub struct UlpecInputNeuron {
    /// Shared fields
    pub common: NeuronCommon,
    /// Rising-edge waveform time constant
    pub tau_up: f64,
    /// Time after which an `EndOfIntegration` closes the event window
    pub tau_down_event: f64,
}

/// Hardware-model neuron driving memristive on-chip STDP programming pulses
#[derive(Debug, Clone)]
pub struct UlpecLifNeuron {
    /// Shared fields
    pub common: NeuronCommon,
    /// Membrane time constant
    pub tau_m: f64,
    /// Rising-edge programming-pulse time constant
    pub tau_up: f64,
    /// Falling-edge programming-pulse time constant, used after a fire
    pub tau_down_spike: f64,
    /// Fast-forward the presentation once the postsynaptic pulse has been issued
    pub skip_after_post: bool,
    /// Forces the refractory period to zero, used by the test harness
    pub forced_zero_refractory: bool,
}

impl UlpecLifNeuron {
    /// Rising-edge offset before the falling-edge waveform begins (12 microseconds)
    pub const TRIGGER_DOWN_OFFSET: f64 = 12.0;
    /// Offset from fire time to the down-to-up transition (14 microseconds)
    pub const TRIGGER_DOWN_TO_UP_OFFSET: f64 = 14.0;
}

/// Accumulates an intensity counter and fires a winning class on `Decision`
#[derive(Debug, Clone)]
pub struct DecisionNeuron {
    /// Shared fields
    pub common: NeuronCommon,
    /// Intensity accumulator used for histogram-vote winner selection
    pub intensity: f64,
}

/// Feature vector produced for a `Regression` neuron's external linear model
pub type FeatureVector = Vec<f64>;

/// External collaborator performing classification/regression from collected features
///
/// The source binds a linear model from an external tensor library; here it
/// is an explicit trait so the simulation core never depends on a specific
/// modelling crate.
pub trait RegressionModel: std::fmt::Debug {
    /// Fit the model incrementally on one labeled feature vector
    fn fit(&mut self, features: &[f64], label: i32);
    /// Predict a class id from a feature vector
    fn predict(&self, features: &[f64]) -> i32;
}

/// Collects per-class feature vectors and delegates classification to an
/// external linear model at pattern boundaries
pub struct RegressionNeuron {
    /// Shared fields
    pub common: NeuronCommon,
    /// Feature accumulator for the pattern currently being presented
    pub features: FeatureVector,
    /// External classifier
    pub model: Box<dyn RegressionModel>,
}

impl std::fmt::Debug for RegressionNeuron {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionNeuron")
            .field("common", &self.common)
            .field("features", &self.features)
            .finish()
    }
}

impl Clone for RegressionNeuron {
    fn clone(&self) -> Self {
        // The external model is not required to be cloneable; a freshly
        // bound collaborator is expected whenever a regression neuron is
        // duplicated (e.g. across multi-trial batches), see §5.
        panic!("RegressionNeuron cannot be cloned; rebuild the network for a new trial")
    }
}

/// Passes input-spike events through unchanged to its axon terminals
#[derive(Debug, Clone)]
pub struct ParrotNeuron {
    /// Shared fields
    pub common: NeuronCommon,
}

/// The closed set of neuron state machines this simulator supports
#[derive(Debug)]
pub enum Neuron {
    /// Pass-through neuron
    Parrot(ParrotNeuron),
    /// Current-based leaky integrate-and-fire neuron
    CubaLif(CubaLifNeuron),
    /// ULPEC hardware input neuron
    UlpecInput(UlpecInputNeuron),
    /// ULPEC hardware LIF neuron
    UlpecLif(UlpecLifNeuron),
    /// Histogram-vote decision neuron
    Decision(DecisionNeuron),
    /// External-model-backed regression/classification neuron
    Regression(RegressionNeuron),
}

impl Neuron {
    /// Shared fields, regardless of variant
    pub fn common(&self) -> &NeuronCommon {
        match self {
            Neuron::Parrot(n) => &n.common,
            Neuron::CubaLif(n) => &n.common,
            Neuron::UlpecInput(n) => &n.common,
            Neuron::UlpecLif(n) => &n.common,
            Neuron::Decision(n) => &n.common,
            Neuron::Regression(n) => &n.common,
        }
    }

    /// Mutable shared fields, regardless of variant
    pub fn common_mut(&mut self) -> &mut NeuronCommon {
        match self {
            Neuron::Parrot(n) => &mut n.common,
            Neuron::CubaLif(n) => &mut n.common,
            Neuron::UlpecInput(n) => &mut n.common,
            Neuron::UlpecLif(n) => &mut n.common,
            Neuron::Decision(n) => &mut n.common,
            Neuron::Regression(n) => &mut n.common,
        }
    }

    /// Stable id
    pub fn id(&self) -> NeuronId {
        self.common().id
    }

    /// Reject configurations the spec documents as invalid (C3 failure modes)
    pub fn validate(&self, event_driven: bool) -> Result<()> {
        if let Neuron::CubaLif(n) = self {
            if n.homeostasis.is_some() && event_driven {
                return Err(SnnError::invalid_config(
                    "homeostasis is only valid in clock-driven mode",
                ));
            }
        }
        Ok(())
    }

    /// Bind to every addon whose mask covers this neuron
    pub fn initialise(&mut self, addons: &[Box<dyn Addon>]) {
        let id = self.id();
        let common = self.common_mut();
        common.relevant_addons.clear();
        for (index, addon) in addons.iter().enumerate() {
            if addon.watches(id) {
                common.relevant_addons.push(index);
            }
        }
    }

    /// Event-driven update, dispatched by the scheduler on queue pop
    pub fn update(
        &mut self,
        now: f64,
        via_synapse: Option<SynapseId>,
        kind: EventKind,
        net: &mut Network,
    ) -> Result<()> {
        match self {
            Neuron::Parrot(n) => parrot_update(n, now, via_synapse, net),
            Neuron::CubaLif(n) => cuba_lif_update(n, now, via_synapse, kind, net),
            Neuron::UlpecInput(n) => ulpec_input_update(n, now, via_synapse, kind, net),
            Neuron::UlpecLif(n) => ulpec_lif_update(n, now, via_synapse, kind, net),
            Neuron::Decision(n) => decision_update(n, now, kind, net),
            Neuron::Regression(n) => regression_update(n, now, via_synapse, kind, net),
        }
    }

    /// Clock-driven update, invoked once per tick on every neuron in an active layer
    pub fn update_sync(&mut self, now: f64, dt: f64, net: &mut Network) -> Result<()> {
        match self {
            Neuron::CubaLif(n) => cuba_lif_update_sync(n, now, dt, net),
            _ => self.update(now, None, EventKind::None, net),
        }
    }
}

fn schedule_axon_terminals(common: &NeuronCommon, now: f64, net: &mut Network) -> Result<()> {
    for &synapse_id in &common.axon_terminals {
        let (target, delay, target_layer) = {
            let synapse = net.synapse(synapse_id)?;
            let target = synapse.post;
            let target_layer = net.neuron(target)?.common().layer_id;
            (target, synapse.delay, target_layer)
        };
        if !net.layer_active(target_layer) {
            continue;
        }
        net.event_queue_mut().push(
            Event::new(now + delay, Some(synapse_id), target, EventKind::Generated),
            now,
        );
    }
    Ok(())
}

fn run_learn_hooks(common: &NeuronCommon, now: f64, net: &mut Network) -> Result<()> {
    for &synapse_id in &common.dendritic_tree {
        let addon_indices = common.relevant_addons.clone();
        for index in addon_indices {
            net.call_addon_learn(index, now, synapse_id, common.id)?;
        }
    }
    Ok(())
}

fn run_neuron_fired_hooks(common: &NeuronCommon, now: f64, net: &mut Network) -> Result<()> {
    let addon_indices = common.relevant_addons.clone();
    for index in addon_indices {
        net.call_addon_neuron_fired(index, now, None, common.id)?;
    }
    Ok(())
}

fn fire(
    common: &mut NeuronCommon,
    now: f64,
    bursting: bool,
    wta: bool,
    net: &mut Network,
) -> Result<()> {
    common.previous_spike_time = Some(now);
    if let Some(label) = common.class_label {
        common.decision_queue.push(label);
    }
    schedule_axon_terminals(common, now, net)?;
    run_learn_hooks(common, now, net)?;
    run_neuron_fired_hooks(common, now, net)?;

    if wta {
        net.reset_layer_peers(common.layer_id, common.id)?;
    }
    if !bursting {
        common.current = 0.0;
    }
    common.refractory_until = now + common.refractory_period;
    Ok(())
}

fn parrot_update(
    n: &mut ParrotNeuron,
    now: f64,
    via_synapse: Option<SynapseId>,
    net: &mut Network,
) -> Result<()> {
    if let Some(synapse_id) = via_synapse {
        net.integrate_synapse(synapse_id, now)?;
    }
    fire(&mut n.common, now, false, false, net)
}

fn cuba_lif_decay_and_integrate(n: &CubaLifNeuron, now: f64, input_current: f64) -> f64 {
    let dt = (now - n.common.previous_input_time).max(0.0);
    let decay = (-dt / n.tau_m).exp();
    let driven = n.common.resting_potential + input_current * n.common.leak_conductance.recip();
    driven + (n.common.potential - driven) * decay
}

fn cuba_lif_update(
    n: &mut CubaLifNeuron,
    now: f64,
    via_synapse: Option<SynapseId>,
    kind: EventKind,
    net: &mut Network,
) -> Result<()> {
    if n.common.is_refractory(now) {
        return Ok(());
    }

    match kind {
        EventKind::Initial | EventKind::Generated => {
            let Some(synapse_id) = via_synapse else {
                return Ok(());
            };
            if net.event_driven() && synapse_id_kernel_requires_clock(net, synapse_id)? {
                return Err(SnnError::invalid_config(
                    "exponential-kernel synapses are not valid in event-driven mode",
                ));
            }
            let current = net.integrate_synapse(synapse_id, now)?;
            n.common.potential = cuba_lif_decay_and_integrate(n, now, current);
            let trace_dt = (now - n.common.previous_input_time).max(0.0);
            n.common.trace = n.common.trace * (-trace_dt / n.common.trace_tau).exp() + 1.0;
            n.common.previous_input_time = now;

            let synapse_tau = net.synapse(synapse_id)?.time_constant.max(1.0);
            net.event_queue_mut().push(
                Event::new(
                    now + synapse_tau,
                    Some(synapse_id),
                    n.common.id,
                    EventKind::EndOfIntegration,
                ),
                now,
            );

            if net.event_driven() && current > 0.0 {
                if let Some(t_star) = predictive_spike_time(n, now, current) {
                    if now < t_star && t_star <= now + synapse_tau {
                        net.event_queue_mut().push(
                            Event::new(t_star, Some(synapse_id), n.common.id, EventKind::Prediction),
                            now,
                        );
                    }
                }
            }

            if n.common.potential >= n.common.threshold {
                fire(&mut n.common, now, n.bursting, n.wta, net)?;
            }
            Ok(())
        }
        EventKind::Prediction | EventKind::EndOfIntegration => {
            n.common.potential = cuba_lif_decay_and_integrate(n, now, 0.0);
            if n.common.potential >= n.common.threshold {
                fire(&mut n.common, now, n.bursting, n.wta, net)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn cuba_lif_update_sync(n: &mut CubaLifNeuron, now: f64, dt: f64, net: &mut Network) -> Result<()> {
    if n.common.is_refractory(now) {
        return Ok(());
    }

    let decay = (-dt / n.tau_m).exp();
    let driven = n.common.resting_potential + n.common.current * n.common.leak_conductance.recip();
    n.common.potential = driven + (n.common.potential - driven) * decay;

    if let Some(h) = &n.homeostasis {
        n.common.threshold += (h.resting_threshold - n.common.threshold) / h.tau_h * dt;
        if n.common.current != 0.0 {
            n.common.threshold += h.beta / h.tau_h;
        }
    }

    if n.common.potential >= n.common.threshold {
        fire(&mut n.common, now, n.bursting, n.wta, net)?;
    }

    let addon_indices = n.common.relevant_addons.clone();
    for index in addon_indices {
        net.call_addon_timestep(index, now, n.common.id)?;
    }
    Ok(())
}

/// Algebraic threshold-crossing prediction under pure exponential relaxation (§4.6)
fn predictive_spike_time(n: &CubaLifNeuron, now: f64, current: f64) -> Option<f64> {
    let driven = n.common.resting_potential + current * n.common.leak_conductance.recip();
    let numerator = driven - n.common.potential;
    let denominator = driven - n.common.threshold;
    if numerator <= 0.0 || denominator <= 0.0 || numerator <= denominator {
        return None;
    }
    Some(now + n.tau_m * (numerator / denominator).ln())
}

fn synapse_id_kernel_requires_clock(net: &Network, synapse_id: SynapseId) -> Result<bool> {
    Ok(net.synapse(synapse_id)?.kernel.clock_driven_only())
}

fn ulpec_input_update(
    n: &mut UlpecInputNeuron,
    now: f64,
    via_synapse: Option<SynapseId>,
    kind: EventKind,
    net: &mut Network,
) -> Result<()> {
    match kind {
        EventKind::Initial | EventKind::Generated => {
            n.common.previous_input_time = now;
            fire(&mut n.common, now, false, false, net)?;
            net.event_queue_mut().push(
                Event::new(now + n.tau_up, via_synapse, n.common.id, EventKind::TriggerUp),
                now,
            );
            net.event_queue_mut().push(
                Event::new(
                    now + n.tau_down_event,
                    via_synapse,
                    n.common.id,
                    EventKind::EndOfIntegration,
                ),
                now,
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

fn ulpec_lif_update(
    n: &mut UlpecLifNeuron,
    now: f64,
    via_synapse: Option<SynapseId>,
    kind: EventKind,
    net: &mut Network,
) -> Result<()> {
    let refractory_period = if n.forced_zero_refractory {
        0.0
    } else {
        n.common.refractory_period
    };
    if now < n.common.refractory_until && refractory_period > 0.0 {
        return Ok(());
    }

    match kind {
        EventKind::Initial | EventKind::Generated => {
            let Some(synapse_id) = via_synapse else {
                return Ok(());
            };
            let current = net.integrate_synapse(synapse_id, now)?;
            let dt = (now - n.common.previous_input_time).max(0.0);
            let decay = (-dt / n.tau_m).exp();
            n.common.potential = n.common.resting_potential
                + (n.common.potential - n.common.resting_potential) * decay
                + current;
            n.common.previous_input_time = now;

            if n.common.potential >= n.common.threshold {
                fire(&mut n.common, now, false, false, net)?;
                for &dendrite in &n.common.dendritic_tree.clone() {
                    net.event_queue_mut().push(
                        Event::new(
                            now + UlpecLifNeuron::TRIGGER_DOWN_OFFSET,
                            Some(dendrite),
                            n.common.id,
                            EventKind::TriggerDown,
                        ),
                        now,
                    );
                    net.event_queue_mut().push(
                        Event::new(
                            now + UlpecLifNeuron::TRIGGER_DOWN_TO_UP_OFFSET,
                            Some(dendrite),
                            n.common.id,
                            EventKind::TriggerDownToUp,
                        ),
                        now,
                    );
                    net.event_queue_mut().push(
                        Event::new(now + n.tau_up, Some(dendrite), n.common.id, EventKind::EndTriggerUp),
                        now,
                    );
                    net.event_queue_mut().push(
                        Event::new(
                            now + n.tau_down_spike,
                            Some(dendrite),
                            n.common.id,
                            EventKind::EndTriggerDown,
                        ),
                        now,
                    );
                }
                if n.skip_after_post {
                    net.fast_forward_presentation();
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn decision_update(n: &mut DecisionNeuron, now: f64, kind: EventKind, net: &mut Network) -> Result<()> {
    if kind != EventKind::Decision {
        return Ok(());
    }
    let current_label = net.current_label();
    let votes = n
        .common
        .decision_queue
        .iter()
        .filter(|&&l| Some(l) == current_label)
        .count();
    n.intensity = votes as f64;
    if votes > 0 {
        fire(&mut n.common, now, false, true, net)?;
    } else {
        net.notify_decision_failed(now)?;
    }
    Ok(())
}

fn regression_update(
    n: &mut RegressionNeuron,
    now: f64,
    via_synapse: Option<SynapseId>,
    kind: EventKind,
    net: &mut Network,
) -> Result<()> {
    match kind {
        EventKind::Initial | EventKind::Generated => {
            if let Some(synapse_id) = via_synapse {
                let current = net.integrate_synapse(synapse_id, now)?;
                n.features.push(current);
            }
            Ok(())
        }
        EventKind::Decision => {
            let predicted = n.model.predict(&n.features);
            n.common.class_label = Some(predicted);
            if let Some(label) = net.current_label() {
                n.model.fit(&n.features, label);
            }
            n.features.clear();
            fire(&mut n.common, now, false, false, net)
        }
        _ => Ok(()),
    }
}
