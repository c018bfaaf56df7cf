// Both kernels driven side by side through the same spike/run/clear sequences.

use proptest::prelude::*;
use snn_codegen::{Backend, Kernel};
use snn_core::{Network, NetworkConfig, NeuronSpec, SynapseSpec};

#[derive(Clone, Debug)]
struct Batch {
    clear: bool,
    spikes: Vec<(u32, u32, f64)>, // (input, time, value)
    duration: u32,
}

#[derive(Clone, Debug)]
struct Case {
    thresholds: Vec<f64>,
    leaks: Vec<bool>,
    synapses: Vec<(usize, usize, f64, u32)>, // (from, to, weight, delay)
    inputs: Vec<u32>,
    config: NetworkConfig,
    horizon: Option<u32>,
    batches: Vec<Batch>,
}

impl Case {
    /// The generated network plus one silent neuron whose self-synapses raise the
    /// event-driven kernel's per-slot capacity above anything the batches can inject.
    fn network(&self) -> Network {
        let n = self.thresholds.len();
        let mut neurons: Vec<NeuronSpec> = (0..n)
            .map(|i| NeuronSpec::new(i as u32, self.thresholds[i], self.leaks[i]))
            .collect();
        for &(from, to, weight, delay) in &self.synapses {
            neurons[from].outgoing.push(SynapseSpec::new(to as u32, delay, weight));
        }

        let injected: usize = self.batches.iter().map(|b| b.spikes.len()).sum();
        let mut padding = NeuronSpec::new(n as u32, 1.0e6, self.leaks.iter().all(|&l| l));
        for _ in 0..injected {
            padding = padding.with_synapse(n as u32, 0.0, 1);
        }
        neurons.push(padding);

        Network::new(neurons, self.inputs.clone(), (0..n as u32).collect(), self.config).unwrap()
    }
}

/// Multiples of 0.25: sums stay exact, so summation order never flips a threshold test.
fn quarters(lo: i32, hi: i32) -> impl Strategy<Value = f64> {
    (lo..=hi).prop_map(|q| q as f64 * 0.25)
}

fn config() -> impl Strategy<Value = NetworkConfig> {
    (
        quarters(-4, 0),
        prop::sample::select(vec![0.5, 1.0, 2.0]),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(min_potential, spike_value_factor, run_time_inclusive, threshold_inclusive)| NetworkConfig {
                spike_value_factor,
                min_potential,
                run_time_inclusive,
                threshold_inclusive,
                fire_like_ravens: false,
            },
        )
}

fn batch() -> impl Strategy<Value = Batch> {
    (
        prop::bool::weighted(0.2),
        // input 3 and times past the horizon exercise the ignored paths
        prop::collection::vec((0u32..4, 0u32..10, quarters(-2, 8)), 0..6),
        0u32..7,
    )
        .prop_map(|(clear, spikes, duration)| Batch {
            clear,
            spikes,
            duration,
        })
}

fn case() -> impl Strategy<Value = Case> {
    (1usize..=5).prop_flat_map(|n| {
        (
            prop::collection::vec(quarters(1, 8), n),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((0..n, 0..n, quarters(-4, 8), 0u32..=4), 0..10),
            prop::collection::vec(0..n as u32, 1..=3),
            config(),
            prop::option::of(0u32..8),
            prop::collection::vec(batch(), 1..4),
        )
            .prop_map(
                |(thresholds, leaks, synapses, inputs, config, horizon, batches)| Case {
                    thresholds,
                    leaks,
                    synapses,
                    inputs,
                    config,
                    horizon,
                    batches,
                },
            )
    })
}

fn drive(kernel: &mut dyn Kernel, batch: &Batch) {
    if batch.clear {
        kernel.clear_activity();
    }
    for &(input, time, value) in &batch.spikes {
        kernel.apply_spike(input, time, value);
    }
    kernel.run(batch.duration as f64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn backends_agree_on_every_output(case in case()) {
        let net = case.network();
        let outputs = case.thresholds.len() as u32;
        let mut aos = Backend::Aos.instantiate(&net, case.horizon).unwrap();
        let mut soa = Backend::Soa.instantiate(&net, case.horizon).unwrap();

        for (step, batch) in case.batches.iter().enumerate() {
            drive(aos.as_mut(), batch);
            drive(soa.as_mut(), batch);

            // one past the last output checks the sentinels too
            for output in 0..=outputs {
                prop_assert_eq!(
                    aos.output_count(output),
                    soa.output_count(output),
                    "fire count of output {} after batch {}", output, step
                );
                prop_assert_eq!(
                    aos.output_last_fire(output),
                    soa.output_last_fire(output),
                    "last fire of output {} after batch {}", output, step
                );
            }
        }
    }

    #[test]
    fn both_backends_compile(case in case()) {
        let net = case.network();
        let aos = Backend::Aos.compile(&net, case.horizon).unwrap();
        let soa = Backend::Soa.compile(&net, case.horizon).unwrap();

        let define = format!("#define NUM_NEURONS ({})\n", net.num_neurons());
        prop_assert!(aos.contains(&define));
        prop_assert!(soa.contains(&define));
    }
}

fn self_loop(config: NetworkConfig) -> Network {
    Network::new(
        vec![
            NeuronSpec::new(0, 1.0, false).with_synapse(0, 2.0, 1),
            NeuronSpec::new(1, 1.0, false),
        ],
        vec![0],
        vec![0],
        config,
    )
    .unwrap()
}

#[test]
fn self_loop_scenarios() {
    let inclusive = NetworkConfig {
        run_time_inclusive: true,
        ..NetworkConfig::default()
    };
    let strict = NetworkConfig {
        threshold_inclusive: false,
        ..inclusive
    };

    for backend in Backend::ALL {
        let mut k = backend.instantiate(&self_loop(inclusive), None).unwrap();
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
        assert_eq!(k.output_count(0), 2, "{}", backend);
        assert_eq!(k.output_last_fire(0), 1.0, "{}", backend);

        let mut k = backend.instantiate(&self_loop(NetworkConfig::default()), None).unwrap();
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        assert_eq!(k.output_count(0), 2, "{}", backend);
        assert_eq!(k.output_last_fire(0), 1.0, "{}", backend);

        let mut k = backend.instantiate(&self_loop(strict), None).unwrap();
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        assert_eq!(k.output_count(0), 0, "{}", backend);
        assert_eq!(k.output_last_fire(0), -1.0, "{}", backend);
    }
}

#[test]
fn clear_then_empty_run_is_silent() {
    for backend in Backend::ALL {
        let mut k = backend.instantiate(&self_loop(NetworkConfig::default()), None).unwrap();
        k.apply_spike(0, 0, 1.0);
        k.run(3.0);
        assert!(k.output_count(0) > 0);

        k.clear_activity();
        k.run(0.0);
        assert_eq!(k.output_count(0), 0, "{}", backend);
        assert_eq!(k.output_last_fire(0), -1.0, "{}", backend);
    }
}

#[test]
fn zero_synapse_network_diverges_by_capacity() {
    // The event-driven kernel has no room for events without synapses; the dense one does.
    let net = Network::new(
        vec![NeuronSpec::new(0, 0.5, false)],
        vec![0],
        vec![0],
        NetworkConfig::default(),
    )
    .unwrap();
    let mut aos = Backend::Aos.instantiate(&net, None).unwrap();
    let mut soa = Backend::Soa.instantiate(&net, None).unwrap();
    for k in [&mut aos, &mut soa] {
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
    }
    assert_eq!(aos.output_count(0), 0);
    assert_eq!(soa.output_count(0), 1);
}
