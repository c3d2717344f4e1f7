//! Event-driven and clock-driven run loops, and dataset-driven pattern
//! presentation (C6)

use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::network::Network;
use crate::NeuronId;

/// Summary of one `run`/`run_data`/`run_es_database` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunOutcome {
    /// Number of events dispatched (event-driven) or ticks advanced (clock-driven)
    pub events_processed: u64,
    /// The network's `current_time` when the run stopped
    pub final_time: f64,
}

/// Parameters shared by every run entry point
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Stop once the event queue drains or `current_time` would exceed this
    pub t_max: f64,
    /// `Some(dt)` selects clock-driven scheduling at this step size;
    /// `None` selects event-driven scheduling
    pub dt: Option<f64>,
}

/// A single spike to inject, consumed by `run_data`/`run_es_database`
#[derive(Debug, Clone, Copy)]
pub struct InputSpike {
    /// Target neuron
    pub neuron_id: NeuronId,
    /// Spike timestamp
    pub t: f64,
}

/// One labeled pattern: its input spikes, and the class label to present
/// alongside them (used both for STDP-style unsupervised runs, where
/// `label` is `None`, and for decision/regression-layer training)
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Input spikes belonging to this pattern
    pub spikes: Vec<InputSpike>,
    /// Class label presented alongside this pattern, if any
    pub label: Option<i32>,
}

/// Run until the queue drains or `params.t_max` is reached, dispatching
/// through whichever scheduling mode `params.dt` selects
pub fn run(net: &mut Network, params: RunParams) -> Result<RunOutcome> {
    log::info!(
        "starting run: t_max={} dt={:?} mode={}",
        params.t_max,
        params.dt,
        if params.dt.is_none() { "event" } else { "clock" }
    );
    let outcome = match params.dt {
        None => run_event_driven(net, params.t_max),
        Some(dt) => run_clock_driven(net, params.t_max, dt),
    }?;
    log::info!(
        "run completed: {} steps, final_time={}",
        outcome.events_processed,
        outcome.final_time
    );
    Ok(outcome)
}

fn run_event_driven(net: &mut Network, t_max: f64) -> Result<RunOutcome> {
    let mut events_processed = 0u64;
    loop {
        let Some(event) = net.event_queue().peek() else {
            break;
        };
        if event.timestamp > t_max {
            break;
        }
        let Some(event) = net.event_queue_mut().pop() else {
            break;
        };
        net.dispatch_event(event)?;
        events_processed += 1;
        if events_processed % 100_000 == 0 {
            log::debug!("event-driven progress: {events_processed} events processed");
        }
    }
    Ok(RunOutcome {
        events_processed,
        final_time: net.current_time(),
    })
}

fn run_clock_driven(net: &mut Network, t_max: f64, dt: f64) -> Result<RunOutcome> {
    let mut now = net.current_time();
    let mut ticks = 0u64;
    while now < t_max {
        now += dt;
        for event in net.event_queue_mut().drain_until(now) {
            net.dispatch_event(event)?;
        }
        for neuron_id in net.active_neuron_ids() {
            net.dispatch_tick(neuron_id, now, dt)?;
        }
        ticks += 1;
    }
    Ok(RunOutcome {
        events_processed: ticks,
        final_time: net.current_time(),
    })
}

/// Present each pattern in turn: inject its spikes, run until the queue
/// drains (or `dt` ticks it forward), insert a pattern-boundary sentinel,
/// notify `on_pattern_end`, and optionally request a decision
pub fn run_data(
    net: &mut Network,
    patterns: &[Pattern],
    dt: Option<f64>,
    decision_neuron: Option<NeuronId>,
) -> Result<RunOutcome> {
    let mut total = RunOutcome::default();
    for pattern in patterns {
        net.set_current_label(pattern.label);
        for spike in &pattern.spikes {
            net.inject_spike(spike.neuron_id, spike.t)?;
        }

        let t_max = pattern
            .spikes
            .iter()
            .map(|s| s.t)
            .fold(net.current_time(), f64::max);
        let outcome = run(net, RunParams { t_max, dt })?;
        total.events_processed += outcome.events_processed;
        total.final_time = outcome.final_time;

        net.event_queue_mut().push(
            Event::new(total.final_time, None, NeuronId::new(0), EventKind::None),
            total.final_time,
        );
        net.notify_on_pattern_end()?;

        if let Some(decision_id) = decision_neuron {
            net.event_queue_mut().push(
                Event::new(total.final_time, None, decision_id, EventKind::Decision),
                total.final_time,
            );
            let outcome = run(net, RunParams { t_max: total.final_time, dt })?;
            total.events_processed += outcome.events_processed;
            total.final_time = outcome.final_time;
        }

        if net.take_fast_forward_request() {
            net.event_queue_mut().clear();
        }
    }
    Ok(total)
}

/// Run a full train/test split: every training pattern with plasticity on,
/// then every test pattern after learning has been turned off
pub fn run_es_database(
    net: &mut Network,
    train_patterns: &[Pattern],
    test_patterns: &[Pattern],
    dt: Option<f64>,
    decision_neuron: Option<NeuronId>,
) -> Result<(RunOutcome, RunOutcome)> {
    net.notify_on_start()?;
    let train_outcome = run_data(net, train_patterns, dt, decision_neuron)?;

    net.turn_off_learning(train_outcome.final_time);
    net.notify_on_predict()?;
    let test_outcome = run_data(net, test_patterns, dt, decision_neuron)?;
    net.notify_on_completed()?;

    Ok((train_outcome, test_outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::network::SchedulingMode;
    use crate::neuron::{CubaLifNeuron, Neuron, NeuronCommon, ParrotNeuron};
    use crate::synapse::{Kernel, Synapse};
    use crate::SynapseId;

    fn build_parrot_to_lif() -> (Network, NeuronId, NeuronId) {
        let mut net = Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 0);
        let layer = net.add_layer("l");
        let pre = net
            .add_neuron(layer, Neuron::Parrot(ParrotNeuron { common: NeuronCommon::new(NeuronId::new(0), layer, 1.0, 0.0) }))
            .unwrap();
        let post = net
            .add_neuron(
                layer,
                Neuron::CubaLif(CubaLifNeuron {
                    common: NeuronCommon::new(NeuronId::new(0), layer, -50.0, -70.0),
                    tau_m: 20.0,
                    bursting: false,
                    homeostasis: None,
                    wta: false,
                }),
            )
            .unwrap();
        let synapse = Synapse::new(SynapseId::new(0), pre, post, 30.0, 5.0, Kernel::Dirac, 1.0).unwrap();
        net.add_synapse(synapse).unwrap();
        (net, pre, post)
    }

    #[test]
    fn test_event_driven_run_drains_queue() {
        let (mut net, pre, _post) = build_parrot_to_lif();
        net.inject_spike(pre, 10.0).unwrap();
        let outcome = run(&mut net, RunParams { t_max: 1000.0, dt: None }).unwrap();
        assert!(outcome.events_processed > 0);
        assert!(net.event_queue().is_empty());
    }

    #[test]
    fn test_clock_driven_run_advances_time() {
        let (mut net, pre, _post) = build_parrot_to_lif();
        net.inject_spike(pre, 10.0).unwrap();
        let outcome = run(&mut net, RunParams { t_max: 20.0, dt: Some(1.0) }).unwrap();
        assert!(outcome.final_time >= 20.0);
    }

    #[test]
    fn test_run_data_sets_current_label_per_pattern() {
        let (mut net, pre, _post) = build_parrot_to_lif();
        let patterns = vec![
            Pattern { spikes: vec![InputSpike { neuron_id: pre, t: 1.0 }], label: Some(0) },
            Pattern { spikes: vec![InputSpike { neuron_id: pre, t: 1.0 }], label: Some(1) },
        ];
        let outcome = run_data(&mut net, &patterns, None, None).unwrap();
        assert!(outcome.events_processed > 0);
        assert_eq!(net.current_label(), Some(1));
    }
}
