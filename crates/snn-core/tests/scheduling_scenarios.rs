//! End-to-end checks driving whole small networks through the public
//! `Network`/`scheduler` API, rather than exercising one module in isolation.

use std::cell::RefCell;
use std::rc::Rc;

use esnn_core::addon::{Addon, NeuronMask};
use esnn_core::neuron::{CubaLifNeuron, Neuron, NeuronCommon, ParrotNeuron};
use esnn_core::scheduler::{self, RunParams};
use esnn_core::synapse::{Kernel, Synapse};
use esnn_core::{Network, NetworkConfig, NeuronId, SchedulingMode, SynapseId};

/// Records every `incoming_spike`/`neuron_fired` call an addon observes,
/// shared with the test via an `Rc` so assertions can run after the network
/// is handed back by `scheduler::run`.
#[derive(Debug, Default)]
struct ObservedActivity {
    incoming_times: Vec<f64>,
    incoming_synapses: Vec<SynapseId>,
    fired_times: Vec<f64>,
}

#[derive(Debug)]
struct Probe {
    mask: NeuronMask,
    log: Rc<RefCell<ObservedActivity>>,
}

impl Probe {
    fn new(watch: NeuronId) -> (Self, Rc<RefCell<ObservedActivity>>) {
        let log = Rc::new(RefCell::new(ObservedActivity::default()));
        let mut mask = NeuronMask::new();
        mask.activate_for(watch);
        (Self { mask, log: log.clone() }, log)
    }
}

impl Addon for Probe {
    fn mask(&self) -> &NeuronMask {
        &self.mask
    }

    fn mask_mut(&mut self) -> &mut NeuronMask {
        &mut self.mask
    }

    fn incoming_spike(&mut self, t: f64, synapse_id: SynapseId, _post: NeuronId, _network: &mut Network) {
        let mut log = self.log.borrow_mut();
        log.incoming_times.push(t);
        log.incoming_synapses.push(synapse_id);
    }

    fn neuron_fired(&mut self, t: f64, _synapse_id: Option<SynapseId>, _post: NeuronId, _network: &mut Network) {
        self.log.borrow_mut().fired_times.push(t);
    }
}

fn cuba_lif(layer: esnn_core::LayerId, threshold: f64, rest: f64, tau_m: f64, wta: bool) -> Neuron {
    Neuron::CubaLif(CubaLifNeuron {
        common: NeuronCommon::new(NeuronId::new(0), layer, threshold, rest),
        tau_m,
        bursting: false,
        homeostasis: None,
        wta,
    })
}

fn parrot(layer: esnn_core::LayerId) -> Neuron {
    Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) })
}

#[test]
fn parrot_relays_injected_spikes_through_delayed_synapse_to_one_eventual_fire() {
    let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
    let layer = net.add_layer("l");

    let pre = net.add_neuron(layer, parrot(layer)).unwrap();
    let post = net.add_neuron(layer, cuba_lif(layer, -50.0, -70.0, 20.0, false)).unwrap();
    net.add_synapse(Synapse::new(SynapseId::new(0), pre, post, 30.0, 5.0, Kernel::Dirac, 1.0).unwrap())
        .unwrap();

    let (probe, log) = Probe::new(post);
    net.add_addon(Box::new(probe));

    net.inject_spike(pre, 10.0).unwrap();
    net.inject_spike(pre, 11.0).unwrap();
    net.inject_spike(pre, 30.0).unwrap();

    scheduler::run(&mut net, RunParams { t_max: 200.0, dt: None }).unwrap();

    let log = log.borrow();
    assert_eq!(log.incoming_times, vec![15.0, 16.0, 35.0]);
    assert_eq!(log.fired_times.len(), 1, "two sub-threshold pulses plus a third should fire exactly once");
    assert!(log.fired_times[0] >= 16.0 && log.fired_times[0] <= 35.0);
}

#[test]
fn two_spikes_at_the_same_timestamp_integrate_in_registration_order() {
    let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
    let layer = net.add_layer("l");

    // A high threshold keeps the neuron from firing (and re-entering
    // refractory), isolating the ordering check from firing dynamics.
    let post = net.add_neuron(layer, cuba_lif(layer, 1_000.0, -70.0, 20.0, false)).unwrap();
    let pre_a = net.add_neuron(layer, parrot(layer)).unwrap();
    let pre_b = net.add_neuron(layer, parrot(layer)).unwrap();

    let syn_a =
        net.add_synapse(Synapse::new(SynapseId::new(0), pre_a, post, 1.0, 0.0, Kernel::Dirac, 1.0).unwrap())
            .unwrap();
    let syn_b =
        net.add_synapse(Synapse::new(SynapseId::new(0), pre_b, post, 1.0, 0.0, Kernel::Dirac, 1.0).unwrap())
            .unwrap();

    let (probe, log) = Probe::new(post);
    net.add_addon(Box::new(probe));

    net.event_queue_mut().push(
        esnn_core::Event::new(10.0, Some(syn_a), post, esnn_core::EventKind::Generated),
        0.0,
    );
    net.event_queue_mut().push(
        esnn_core::Event::new(10.0, Some(syn_b), post, esnn_core::EventKind::Generated),
        0.0,
    );

    scheduler::run(&mut net, RunParams { t_max: 100.0, dt: None }).unwrap();

    assert_eq!(log.borrow().incoming_synapses, vec![syn_a, syn_b]);
}

#[test]
fn winner_takes_all_lets_only_the_more_strongly_driven_neuron_fire() {
    let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
    let layer = net.add_layer("decision");

    let strong = net.add_neuron(layer, cuba_lif(layer, -50.0, -70.0, 20.0, true)).unwrap();
    let weak = net.add_neuron(layer, cuba_lif(layer, -50.0, -70.0, 20.0, true)).unwrap();
    let pre = net.add_neuron(layer, parrot(layer)).unwrap();

    // Registered first, so its Generated event wins the same-timestamp
    // FIFO tie-break and fires (and resets its peer) before the weaker
    // synapse's event is even processed.
    net.add_synapse(Synapse::new(SynapseId::new(0), pre, strong, 90.0, 0.0, Kernel::Dirac, 1.0).unwrap())
        .unwrap();
    net.add_synapse(Synapse::new(SynapseId::new(0), pre, weak, 10.0, 0.0, Kernel::Dirac, 1.0).unwrap())
        .unwrap();

    let (probe_strong, log_strong) = Probe::new(strong);
    let (probe_weak, log_weak) = Probe::new(weak);
    net.add_addon(Box::new(probe_strong));
    net.add_addon(Box::new(probe_weak));

    net.inject_spike(pre, 10.0).unwrap();
    scheduler::run(&mut net, RunParams { t_max: 100.0, dt: None }).unwrap();

    assert_eq!(log_strong.borrow().fired_times.len(), 1);
    assert!(log_weak.borrow().fired_times.is_empty());
}

#[test]
fn deactivating_a_layer_suppresses_delivery_until_it_is_reactivated() {
    let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
    let hidden_layer = net.add_layer("hidden");
    let classifier_layer = net.add_layer("classifier");

    let hidden = net.add_neuron(hidden_layer, parrot(hidden_layer)).unwrap();
    let classifier = net.add_neuron(classifier_layer, parrot(classifier_layer)).unwrap();
    net.add_synapse(
        Synapse::new(SynapseId::new(0), hidden, classifier, 1.0, 1.0, Kernel::Dirac, 1.0).unwrap(),
    )
    .unwrap();

    let (probe, log) = Probe::new(classifier);
    net.add_addon(Box::new(probe));

    net.deactivate_layer(classifier_layer).unwrap();
    net.inject_spike(hidden, 5.0).unwrap();
    scheduler::run(&mut net, RunParams { t_max: 100.0, dt: None }).unwrap();
    assert!(log.borrow().incoming_times.is_empty(), "deactivated layer must receive nothing");

    net.activate_layer(classifier_layer).unwrap();
    net.inject_spike(hidden, 50.0).unwrap();
    scheduler::run(&mut net, RunParams { t_max: 200.0, dt: None }).unwrap();
    assert_eq!(log.borrow().incoming_times, vec![51.0]);
}
