//! Network-wide state and the accessor/mutator surface every neuron,
//! synapse, and addon call back into (C7)

use crate::addon::Addon;
use crate::config::NetworkConfig;
use crate::error::{Result, SnnError};
use crate::event::{Event, EventKind, EventQueue};
use crate::neuron::Neuron;
use crate::synapse::Synapse;
use crate::{LayerId, NeuronId, SynapseId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// A named group of neurons sharing activation control and topology-generator metadata
#[derive(Debug, Clone)]
pub struct Layer {
    /// Stable id, assigned in creation order
    pub id: LayerId,
    /// Human-readable label, used by logging and the JSON save format
    pub name: String,
    /// Neurons belonging to this layer, in insertion order
    pub neuron_ids: Vec<NeuronId>,
    /// Whether neurons in this layer currently integrate input and fire
    pub active: bool,
}

impl Layer {
    /// Construct an empty, active layer
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            neuron_ids: Vec::new(),
            active: true,
        }
    }
}

/// Whether the simulation advances by discrete events or fixed-size ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulingMode {
    /// Dispatch strictly by the event queue's timestamp order
    EventDriven,
    /// Advance every active neuron by a fixed `dt` each tick
    ClockDriven {
        /// Simulated time advanced per tick
        dt: f64,
    },
}

/// The simulated network: neurons, synapses, layers, addons, and the pending event queue
///
/// Every hook and state-machine transition receives `&mut Network` rather
/// than direct references into its arenas; this keeps the core
/// single-threaded and cooperative (§5) and lets a neuron or addon touch any
/// other part of the network by id without the borrow checker seeing
/// aliasing, since object ownership never leaves `Network`'s arenas.
pub struct Network {
    neurons: HashMap<NeuronId, Neuron>,
    synapses: HashMap<SynapseId, Synapse>,
    layers: HashMap<LayerId, Layer>,
    addons: Vec<Box<dyn Addon>>,
    event_queue: EventQueue,
    rng: StdRng,
    mode: SchedulingMode,
    learning_enabled: bool,
    learning_off_time: Option<f64>,
    current_time: f64,
    current_label: Option<i32>,
    decision_failed_count: u64,
    fast_forward_requested: bool,
    config: NetworkConfig,
    next_neuron_id: u32,
    next_synapse_id: u32,
    next_layer_id: u32,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("neurons", &self.neurons.len())
            .field("synapses", &self.synapses.len())
            .field("layers", &self.layers.len())
            .field("addons", &self.addons.len())
            .field("mode", &self.mode)
            .field("current_time", &self.current_time)
            .finish()
    }
}

impl Network {
    /// Construct an empty network in the given scheduling mode
    pub fn new(mode: SchedulingMode, config: NetworkConfig, seed: u64) -> Self {
        Self {
            neurons: HashMap::new(),
            synapses: HashMap::new(),
            layers: HashMap::new(),
            addons: Vec::new(),
            event_queue: EventQueue::new(),
            rng: StdRng::seed_from_u64(seed),
            mode,
            learning_enabled: true,
            learning_off_time: None,
            current_time: 0.0,
            current_label: None,
            decision_failed_count: 0,
            fast_forward_requested: false,
            config,
            next_neuron_id: 0,
            next_synapse_id: 0,
            next_layer_id: 0,
        }
    }

    /// Whether this network dispatches by event-queue order rather than fixed ticks
    pub fn event_driven(&self) -> bool {
        matches!(self.mode, SchedulingMode::EventDriven)
    }

    /// The scheduling mode this network was constructed with
    pub fn mode(&self) -> SchedulingMode {
        self.mode
    }

    /// Shared network configuration (default neuron/plasticity parameters, verbosity)
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Most recent dispatch timestamp
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// The class label currently being presented, if any
    pub fn current_label(&self) -> Option<i32> {
        self.current_label
    }

    /// Set the class label for the pattern currently being presented
    pub fn set_current_label(&mut self, label: Option<i32>) {
        self.current_label = label;
    }

    /// Number of times a decision layer failed to reach a winner
    pub fn decision_failed_count(&self) -> u64 {
        self.decision_failed_count
    }

    // -- topology construction --------------------------------------------

    /// Create a new, empty, active layer and return its id
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId::new(self.next_layer_id);
        self.next_layer_id += 1;
        self.layers.insert(id, Layer::new(id, name));
        id
    }

    /// Add a neuron to a layer, assigning it a fresh id and binding it to every
    /// addon whose mask already covers it
    pub fn add_neuron(&mut self, layer_id: LayerId, mut neuron: Neuron) -> Result<NeuronId> {
        if !self.layers.contains_key(&layer_id) {
            return Err(SnnError::layer_not_found(layer_id));
        }
        let id = NeuronId::new(self.next_neuron_id);
        self.next_neuron_id += 1;
        {
            let common = neuron.common_mut();
            common.id = id;
            common.layer_id = layer_id;
        }
        neuron.initialise(&self.addons);
        self.layers.get_mut(&layer_id).unwrap().neuron_ids.push(id);
        self.neurons.insert(id, neuron);
        Ok(id)
    }

    /// Connect two existing neurons with a synapse, assigning it a fresh id
    pub fn add_synapse(&mut self, mut synapse: Synapse) -> Result<SynapseId> {
        if !self.neurons.contains_key(&synapse.pre) {
            return Err(SnnError::neuron_not_found(synapse.pre));
        }
        if !self.neurons.contains_key(&synapse.post) {
            return Err(SnnError::neuron_not_found(synapse.post));
        }
        let id = SynapseId::new(self.next_synapse_id);
        self.next_synapse_id += 1;
        synapse.id = id;
        let pre = synapse.pre;
        let post = synapse.post;
        self.synapses.insert(id, synapse);
        self.neurons.get_mut(&pre).unwrap().common_mut().axon_terminals.push(id);
        self.neurons.get_mut(&post).unwrap().common_mut().dendritic_tree.push(id);
        Ok(id)
    }

    /// Attach an addon, rebinding every existing neuron's relevant-addon index cache
    pub fn add_addon(&mut self, addon: Box<dyn Addon>) -> usize {
        let index = self.addons.len();
        self.addons.push(addon);
        for neuron in self.neurons.values_mut() {
            neuron.initialise(&self.addons);
        }
        index
    }

    /// Validate every neuron against the network's scheduling mode (C3 failure modes)
    pub fn validate(&self) -> Result<()> {
        let event_driven = self.event_driven();
        for neuron in self.neurons.values() {
            neuron.validate(event_driven)?;
        }
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    /// Look up a synapse by id
    pub fn synapse(&self, id: SynapseId) -> Result<&Synapse> {
        self.synapses.get(&id).ok_or_else(|| SnnError::synapse_not_found(id))
    }

    /// Look up a synapse by id, mutably (used by learning-rule addons)
    pub fn synapse_mut(&mut self, id: SynapseId) -> Result<&mut Synapse> {
        self.synapses.get_mut(&id).ok_or_else(|| SnnError::synapse_not_found(id))
    }

    /// Look up a neuron by id
    pub fn neuron(&self, id: NeuronId) -> Result<&Neuron> {
        self.neurons.get(&id).ok_or_else(|| SnnError::neuron_not_found(id))
    }

    /// Look up a neuron by id, mutably (used by learning-rule addons)
    pub fn neuron_mut(&mut self, id: NeuronId) -> Result<&mut Neuron> {
        self.neurons.get_mut(&id).ok_or_else(|| SnnError::neuron_not_found(id))
    }

    /// Look up a layer by id
    pub fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers.get(&id).ok_or_else(|| SnnError::layer_not_found(id))
    }

    /// Whether the given layer currently accepts input and may fire
    pub fn layer_active(&self, layer_id: LayerId) -> bool {
        self.layers.get(&layer_id).map(|l| l.active).unwrap_or(false)
    }

    /// Neuron ids belonging to active layers, in no particular order
    pub fn active_neuron_ids(&self) -> Vec<NeuronId> {
        self.layers
            .values()
            .filter(|l| l.active)
            .flat_map(|l| l.neuron_ids.iter().copied())
            .collect()
    }

    /// All neuron ids
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.keys().copied().collect()
    }

    /// All layer ids, in no particular order
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.keys().copied().collect()
    }

    /// Mark a layer active
    pub fn activate_layer(&mut self, layer_id: LayerId) -> Result<()> {
        self.layers
            .get_mut(&layer_id)
            .ok_or_else(|| SnnError::layer_not_found(layer_id))?
            .active = true;
        Ok(())
    }

    /// Mark a layer inactive; events targeting it are not scheduled
    pub fn deactivate_layer(&mut self, layer_id: LayerId) -> Result<()> {
        self.layers
            .get_mut(&layer_id)
            .ok_or_else(|| SnnError::layer_not_found(layer_id))?
            .active = false;
        Ok(())
    }

    /// Disable plasticity from time `t` onward
    pub fn turn_off_learning(&mut self, t: f64) {
        self.learning_off_time = Some(t);
    }

    /// Re-enable plasticity unconditionally
    pub fn turn_on_learning(&mut self) {
        self.learning_enabled = true;
        self.learning_off_time = None;
    }

    /// The time learning will be (or was) turned off, if `turn_off_learning` has been called
    pub fn learning_off_time(&self) -> Option<f64> {
        self.learning_off_time
    }

    fn learning_active(&self) -> bool {
        self.learning_enabled
            && !matches!(self.learning_off_time, Some(t) if self.current_time >= t)
    }

    // -- event queue ----------------------------------------------------------

    /// Mutable access to the pending-event priority queue
    pub fn event_queue_mut(&mut self) -> &mut EventQueue {
        &mut self.event_queue
    }

    /// Read-only access to the pending-event priority queue
    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    /// The network's RNG, for topology generators sampling weight/delay distributions
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Inject an externally driven input spike, clamped to not precede `current_time`
    pub fn inject_spike(&mut self, neuron_id: NeuronId, t: f64) -> Result<()> {
        if !self.neurons.contains_key(&neuron_id) {
            return Err(SnnError::neuron_not_found(neuron_id));
        }
        let now = self.current_time;
        self.event_queue.push(Event::new(t, None, neuron_id, EventKind::Initial), now);
        Ok(())
    }

    // -- dispatch -------------------------------------------------------------

    /// Advance a synapse's current law, apply the incoming spike, and notify
    /// addons watching the postsynaptic neuron, returning the resulting current
    pub fn integrate_synapse(&mut self, synapse_id: SynapseId, now: f64) -> Result<f64> {
        let post;
        let current;
        {
            let synapse = self
                .synapses
                .get_mut(&synapse_id)
                .ok_or_else(|| SnnError::synapse_not_found(synapse_id))?;
            synapse.update(now);
            current = synapse.receive_spike(now, &mut self.rng);
            post = synapse.post;
        }
        let addon_indices = self.neuron(post)?.common().relevant_addons.clone();
        for index in addon_indices {
            self.call_addon_incoming_spike(index, now, synapse_id, post)?;
        }
        Ok(current)
    }

    /// Pop-dispatch a single event: remove its target neuron from the arena,
    /// run its state-machine transition with `self` as the network handle,
    /// then reinsert it
    pub fn dispatch_event(&mut self, event: Event) -> Result<()> {
        self.current_time = event.timestamp;
        let neuron_id = event.target_neuron_id;
        let mut neuron = self
            .neurons
            .remove(&neuron_id)
            .ok_or_else(|| SnnError::neuron_not_found(neuron_id))?;
        let result = neuron.update(event.timestamp, event.target_synapse_id, event.kind, self);
        self.neurons.insert(neuron_id, neuron);
        result
    }

    /// Clock-driven tick-dispatch of a single neuron, using the same
    /// remove/mutate/reinsert pattern as [`Network::dispatch_event`]
    pub fn dispatch_tick(&mut self, neuron_id: NeuronId, now: f64, dt: f64) -> Result<()> {
        self.current_time = now;
        let mut neuron = self
            .neurons
            .remove(&neuron_id)
            .ok_or_else(|| SnnError::neuron_not_found(neuron_id))?;
        let result = neuron.update_sync(now, dt, self);
        self.neurons.insert(neuron_id, neuron);
        result
    }

    // -- addon dispatch (remove/mutate/reinsert, mirroring neuron dispatch) ---

    pub(crate) fn take_addon(&mut self, index: usize) -> Option<Box<dyn Addon>> {
        if index >= self.addons.len() {
            None
        } else {
            Some(self.addons.remove(index))
        }
    }

    pub(crate) fn return_addon(&mut self, index: usize, addon: Box<dyn Addon>) {
        let index = index.min(self.addons.len());
        self.addons.insert(index, addon);
    }

    /// Invoke addon `index`'s `incoming_spike` hook
    pub fn call_addon_incoming_spike(
        &mut self,
        index: usize,
        t: f64,
        synapse_id: SynapseId,
        post: NeuronId,
    ) -> Result<()> {
        if let Some(mut addon) = self.take_addon(index) {
            addon.incoming_spike(t, synapse_id, post, self);
            self.return_addon(index, addon);
        }
        Ok(())
    }

    /// Invoke addon `index`'s `neuron_fired` hook
    pub fn call_addon_neuron_fired(
        &mut self,
        index: usize,
        t: f64,
        synapse_id: Option<SynapseId>,
        post: NeuronId,
    ) -> Result<()> {
        if let Some(mut addon) = self.take_addon(index) {
            addon.neuron_fired(t, synapse_id, post, self);
            self.return_addon(index, addon);
        }
        Ok(())
    }

    /// Invoke addon `index`'s `timestep` hook
    pub fn call_addon_timestep(&mut self, index: usize, t: f64, post: NeuronId) -> Result<()> {
        if let Some(mut addon) = self.take_addon(index) {
            addon.timestep(t, post, self);
            self.return_addon(index, addon);
        }
        Ok(())
    }

    /// Invoke addon `index`'s `learn` hook, a no-op once learning has been turned off
    pub fn call_addon_learn(
        &mut self,
        index: usize,
        t: f64,
        synapse_id: SynapseId,
        post: NeuronId,
    ) -> Result<()> {
        if !self.learning_active() {
            return Ok(());
        }
        if let Some(mut addon) = self.take_addon(index) {
            addon.learn(t, synapse_id, post, self);
            self.return_addon(index, addon);
        }
        Ok(())
    }

    /// Invoke addon `index`'s `decision_failed` hook
    pub fn call_addon_decision_failed(&mut self, index: usize, t: f64) -> Result<()> {
        if let Some(mut addon) = self.take_addon(index) {
            addon.decision_failed(t, self);
            self.return_addon(index, addon);
        }
        Ok(())
    }

    /// Notify every addon that a pattern ended without a decision winner
    pub fn notify_decision_failed(&mut self, t: f64) -> Result<()> {
        self.decision_failed_count += 1;
        for index in 0..self.addons.len() {
            self.call_addon_decision_failed(index, t)?;
        }
        Ok(())
    }

    /// Broadcast the `on_start` lifecycle hook to every addon
    pub fn notify_on_start(&mut self) -> Result<()> {
        for index in 0..self.addons.len() {
            if let Some(mut addon) = self.take_addon(index) {
                addon.on_start(self);
                self.return_addon(index, addon);
            }
        }
        Ok(())
    }

    /// Broadcast the `on_predict` lifecycle hook to every addon
    pub fn notify_on_predict(&mut self) -> Result<()> {
        for index in 0..self.addons.len() {
            if let Some(mut addon) = self.take_addon(index) {
                addon.on_predict(self);
                self.return_addon(index, addon);
            }
        }
        Ok(())
    }

    /// Broadcast the `on_completed` lifecycle hook to every addon
    pub fn notify_on_completed(&mut self) -> Result<()> {
        for index in 0..self.addons.len() {
            if let Some(mut addon) = self.take_addon(index) {
                addon.on_completed(self);
                self.return_addon(index, addon);
            }
        }
        Ok(())
    }

    /// Broadcast the `on_pattern_end` lifecycle hook to every addon
    pub fn notify_on_pattern_end(&mut self) -> Result<()> {
        for index in 0..self.addons.len() {
            if let Some(mut addon) = self.take_addon(index) {
                addon.on_pattern_end(self);
                self.return_addon(index, addon);
            }
        }
        Ok(())
    }

    // -- WTA / fast-forward ----------------------------------------------------

    /// Reset every other neuron in `layer_id` back to its resting potential
    /// (winner-take-all inhibition)
    pub fn reset_layer_peers(&mut self, layer_id: LayerId, except: NeuronId) -> Result<()> {
        let ids = self
            .layers
            .get(&layer_id)
            .ok_or_else(|| SnnError::layer_not_found(layer_id))?
            .neuron_ids
            .clone();
        for id in ids {
            if id == except {
                continue;
            }
            if let Some(neuron) = self.neurons.get_mut(&id) {
                let common = neuron.common_mut();
                common.potential = common.resting_potential;
                common.current = 0.0;
            }
        }
        Ok(())
    }

    /// Request that the scheduler skip ahead to the next pattern boundary
    pub fn fast_forward_presentation(&mut self) {
        self.fast_forward_requested = true;
    }

    /// Consume and clear a pending fast-forward request
    pub fn take_fast_forward_request(&mut self) -> bool {
        std::mem::replace(&mut self.fast_forward_requested, false)
    }

    // -- reset ------------------------------------------------------------------

    /// Reset every neuron and synapse to its resting state and clear the event queue
    pub fn reset_network(&mut self) {
        log::debug!(
            "resetting network: {} pending events discarded",
            self.event_queue.len()
        );
        for neuron in self.neurons.values_mut() {
            neuron.common_mut().reset();
        }
        for synapse in self.synapses.values_mut() {
            synapse.reset();
        }
        self.event_queue.clear();
        self.current_time = 0.0;
        self.current_label = None;
        self.decision_failed_count = 0;
        self.fast_forward_requested = false;
    }
}
