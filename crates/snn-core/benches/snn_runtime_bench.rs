use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use esnn_core::neuron::{CubaLifNeuron, Neuron, NeuronCommon, ParrotNeuron};
use esnn_core::scheduler::{self, InputSpike, Pattern};
use esnn_core::synapse::Kernel;
use esnn_core::topology::{self, WeightDelayDistribution};
use esnn_core::{NetworkConfig, SchedulingMode};

fn build_network(neurons: u32, fully_connected: bool, weight: f64) -> esnn_core::Network {
    let mut net = esnn_core::Network::new(SchedulingMode::EventDriven, NetworkConfig::default(), 1234);

    let (_, input_ids) = topology::make_layer(&mut net, "input", 1, |_| {
        Neuron::Parrot(ParrotNeuron {
            common: NeuronCommon::new(esnn_core::NeuronId::new(0), esnn_core::LayerId::new(0), 1.0, 0.0),
        })
    })
    .unwrap();

    let (_, hidden_ids) = topology::make_layer(&mut net, "hidden", neurons as usize, |_| {
        Neuron::CubaLif(CubaLifNeuron {
            common: NeuronCommon::new(esnn_core::NeuronId::new(0), esnn_core::LayerId::new(0), -50.0, -70.0),
            tau_m: 20.0,
            bursting: false,
            homeostasis: None,
            wta: false,
        })
    })
    .unwrap();

    let dist = WeightDelayDistribution::Fixed { weight, delay: 1.0 };
    if fully_connected {
        topology::all_to_all(&mut net, &input_ids, &hidden_ids, Kernel::Dirac, 1.0, &dist).unwrap();
    } else {
        for window in hidden_ids.windows(2) {
            topology::one_to_one(&mut net, &window[..1], &window[1..], Kernel::Dirac, 1.0, &dist).unwrap();
        }
        topology::all_to_all(&mut net, &input_ids, &hidden_ids[..1], Kernel::Dirac, 1.0, &dist).unwrap();
    }
    net
}

fn bench_event_driven_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_event_driven");

    for &n in &[8u32, 16u32, 32u32] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, &n| {
            b.iter_batched(
                || build_network(n, false, 0.2),
                |mut net| {
                    let input = net.layer(esnn_core::LayerId::new(0)).unwrap().neuron_ids[0];
                    let patterns = vec![Pattern {
                        spikes: vec![InputSpike { neuron_id: input, t: 0.0 }],
                        label: None,
                    }];
                    scheduler::run_data(&mut net, &patterns, None, None).unwrap();
                },
                BatchSize::SmallInput,
            );
        });

        if n <= 16 {
            group.bench_with_input(BenchmarkId::new("fully_connected", n), &n, |b, &n| {
                b.iter_batched(
                    || build_network(n, true, 0.1),
                    |mut net| {
                        let input = net.layer(esnn_core::LayerId::new(0)).unwrap().neuron_ids[0];
                        let patterns = vec![Pattern {
                            spikes: vec![InputSpike { neuron_id: input, t: 0.0 }],
                            label: None,
                        }];
                        scheduler::run_data(&mut net, &patterns, None, None).unwrap();
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_event_driven_run);
criterion_main!(benches);
