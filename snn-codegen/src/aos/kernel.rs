//! Host-side model of the event-driven kernel.

use snn_core::{run_time, ChargeEvent, EventRing, KernelLayout, Network, NetworkConfig, SynapseSpec};

use crate::backend::Backend;
use crate::kernel::Kernel;

#[derive(Clone, Debug)]
struct NeuronState {
    leak: bool,
    check: bool,
    fire_count: u32,
    last_fire: i32,
    charge: f64,
    threshold: f64,
    outgoing: Vec<SynapseSpec>,
    fire_times: Vec<u32>, // MAX_NUM_TIMESTEPS entries
}

impl NeuronState {
    fn record_fire(&mut self, time: u32) {
        if let Some(slot) = self.fire_times.get_mut(self.fire_count as usize) {
            *slot = time;
        }
        self.last_fire = time as i32;
        self.fire_count += 1;
        self.charge = 0.0;
    }

    fn settle(&mut self, min_potential: f64) {
        if self.leak {
            self.charge = 0.0;
        }
        if self.charge < min_potential {
            self.charge = min_potential;
        }
    }
}

/// State of one compiled event-driven kernel. All buffers are sized at construction.
#[derive(Clone, Debug)]
pub struct AosKernel {
    layout: KernelLayout,
    config: NetworkConfig,
    neurons: Vec<NeuronState>,
    input_map: Vec<u32>,
    output_map: Vec<u32>,
    ring: EventRing,
    to_fire: Vec<u32>, // capacity NUM_NEURONS
}

impl AosKernel {
    pub fn new(network: &Network, horizon: Option<u32>) -> Self {
        let layout = KernelLayout::resolve(network, horizon);
        let neurons = network
            .neurons()
            .iter()
            .map(|n| NeuronState {
                leak: n.leak,
                check: false,
                fire_count: 0,
                last_fire: -1,
                charge: 0.0,
                threshold: n.threshold,
                outgoing: n
                    .outgoing
                    .iter()
                    .map(|s| SynapseSpec::new(s.target_index, s.effective_delay(), s.weight))
                    .collect(),
                fire_times: vec![0; layout.max_num_timesteps],
            })
            .collect();

        Self {
            layout,
            config: *network.config(),
            neurons,
            input_map: network.inputs().to_vec(),
            output_map: network.outputs().to_vec(),
            ring: EventRing::new(layout.max_num_timesteps, layout.num_synapses),
            to_fire: Vec::with_capacity(layout.num_neurons),
        }
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    /// Current charge of a neuron (as held by its record, not including pending events).
    pub fn charge(&self, neuron_index: u32) -> Option<f64> {
        self.neurons.get(neuron_index as usize).map(|n| n.charge)
    }

    /// Fire times of a neuron during the most recent run, capped at the horizon.
    pub fn fire_history(&self, neuron_index: u32) -> &[u32] {
        self.neurons
            .get(neuron_index as usize)
            .map(|n| &n.fire_times[..(n.fire_count as usize).min(n.fire_times.len())])
            .unwrap_or(&[])
    }

    /// Events pending in the slot `offset` timesteps ahead.
    pub fn pending_events(&self, offset: usize) -> usize {
        self.ring.len_at(self.ring.slot_at(offset))
    }

    /// `run`, calling `observe(time, self)` after each simulated timestep.
    pub fn run_observed<F: FnMut(u32, &Self)>(&mut self, duration: f64, mut observe: F) {
        for n in &mut self.neurons {
            n.last_fire = -1;
            n.fire_count = 0;
        }

        let Some(run_time) = run_time(duration, self.config.run_time_inclusive) else {
            return;
        };

        for time in 0..=run_time {
            if self.config.fire_like_ravens {
                for &idx in &self.to_fire {
                    self.neurons[idx as usize].record_fire(time);
                }
                self.to_fire.clear();
            }

            let min_potential = self.config.min_potential;
            for ev in self.ring.current() {
                self.neurons[ev.neuron_index as usize].settle(min_potential);
            }

            for ev in self.ring.current() {
                let n = &mut self.neurons[ev.neuron_index as usize];
                n.check = true;
                n.charge += ev.charge_change;
            }

            self.fire_checked(time);

            self.ring.advance();
            observe(time, &*self);
        }

        let min_potential = self.config.min_potential;
        for n in &mut self.neurons {
            n.settle(min_potential);
        }
    }

    /// Fire-test every neuron touched this timestep exactly once.
    fn fire_checked(&mut self, time: u32) {
        let Self {
            config,
            neurons,
            ring,
            to_fire,
            ..
        } = self;

        // Slots reached by propagation are never the current one (delays are >= 1 and
        // below the horizon), so the current event list is stable during this loop.
        for i in 0..ring.current().len() {
            let idx = ring.current()[i].neuron_index as usize;
            if !neurons[idx].check {
                continue;
            }

            if config.fires(neurons[idx].charge, neurons[idx].threshold) {
                for syn in &neurons[idx].outgoing {
                    ring.schedule(
                        syn.delay as usize,
                        ChargeEvent {
                            neuron_index: syn.target_index,
                            charge_change: syn.weight,
                        },
                    );
                }
                if config.fire_like_ravens {
                    to_fire.push(idx as u32);
                } else {
                    neurons[idx].record_fire(time);
                }
            }
            neurons[idx].check = false;
        }
    }
}

impl Kernel for AosKernel {
    fn apply_spike(&mut self, input_index: u32, time: u32, value: f64) {
        let Some(&neuron_index) = self.input_map.get(input_index as usize) else {
            return;
        };
        if time as usize >= self.layout.max_num_timesteps {
            return;
        }
        self.ring.schedule(
            time as usize,
            ChargeEvent {
                neuron_index,
                charge_change: value * self.config.spike_value_factor,
            },
        );
    }

    fn run(&mut self, duration: f64) {
        self.run_observed(duration, |_, _| {});
    }

    fn clear_activity(&mut self) {
        for n in &mut self.neurons {
            n.last_fire = -1;
            n.fire_count = 0;
            n.charge = 0.0;
        }
        self.ring.clear();
        self.to_fire.clear();
    }

    fn output_last_fire(&self, output_index: u32) -> f64 {
        match self.output_map.get(output_index as usize) {
            Some(&idx) => self.neurons[idx as usize].last_fire as f64,
            None => -1.0,
        }
    }

    fn output_count(&self, output_index: u32) -> u32 {
        match self.output_map.get(output_index as usize) {
            Some(&idx) => self.neurons[idx as usize].fire_count,
            None => 0,
        }
    }

    fn backend(&self) -> Backend {
        Backend::Aos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snn_core::NeuronSpec;

    fn inclusive() -> NetworkConfig {
        NetworkConfig {
            run_time_inclusive: true,
            ..NetworkConfig::default()
        }
    }

    fn self_loop(config: NetworkConfig) -> AosKernel {
        let net = Network::new(
            vec![
                NeuronSpec::new(0, 1.0, false).with_synapse(0, 2.0, 1),
                NeuronSpec::new(1, 1.0, false),
            ],
            vec![0],
            vec![0],
            config,
        )
        .unwrap();
        AosKernel::new(&net, None)
    }

    #[test]
    fn self_loop_fires_twice() {
        let mut k = self_loop(inclusive());
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
        assert_eq!(k.output_count(0), 2);
        assert_eq!(k.output_last_fire(0), 1.0);
        assert_eq!(k.fire_history(0), &[0, 1]);

        // exclusive run(2) covers the same two timesteps
        let mut k = self_loop(NetworkConfig::default());
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        assert_eq!(k.output_count(0), 2);
        assert_eq!(k.output_last_fire(0), 1.0);
    }

    #[test]
    fn inclusive_run_processes_the_last_timestep() {
        let mut k = self_loop(inclusive());
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        assert_eq!(k.output_count(0), 3);
        assert_eq!(k.output_last_fire(0), 2.0);
        // history is capped at MAX_NUM_TIMESTEPS entries
        assert_eq!(k.fire_history(0), &[0, 1]);
    }

    #[test]
    fn strict_threshold_never_fires() {
        let mut k = self_loop(NetworkConfig {
            threshold_inclusive: false,
            ..inclusive()
        });
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        assert_eq!(k.output_count(0), 0);
        assert_eq!(k.output_last_fire(0), -1.0);
    }

    #[test]
    fn out_of_range_inputs_are_ignored() {
        let mut k = self_loop(inclusive());
        let horizon = k.layout().max_num_timesteps as u32;
        k.apply_spike(1, 0, 5.0); // NUM_INPUT_NEURONS
        k.apply_spike(0, horizon, 5.0); // MAX_NUM_TIMESTEPS
        assert_eq!((0..horizon as usize).map(|o| k.pending_events(o)).sum::<usize>(), 0);

        k.run(3.0);
        assert_eq!(k.output_count(0), 0);
        assert_eq!(k.output_count(1), 0);
        assert_eq!(k.output_last_fire(1), -1.0);
    }

    #[test]
    fn simultaneous_events_are_tested_once() {
        // Threshold 0 with >=: a second test right after the reset would fire again.
        // Neuron 1 only widens the per-slot event capacity to two.
        let net = Network::new(
            vec![
                NeuronSpec::new(0, 0.0, false),
                NeuronSpec::new(1, 1.0, false)
                    .with_synapse(0, 0.0, 1)
                    .with_synapse(0, 0.0, 1),
            ],
            vec![0, 0],
            vec![0],
            inclusive(),
        )
        .unwrap();

        let mut k = AosKernel::new(&net, None);
        k.apply_spike(0, 0, 0.5);
        k.apply_spike(1, 0, 0.5);
        assert_eq!(k.pending_events(0), 2);
        k.run(0.0);
        assert_eq!(k.output_count(0), 1);
        assert_eq!(k.output_last_fire(0), 0.0);
    }

    #[test]
    fn untouched_leaking_neuron_keeps_charge_until_final_pass() {
        let net = Network::new(
            vec![
                NeuronSpec::new(0, 1.0, true),
                NeuronSpec::new(1, 5.0, false).with_synapse(0, 1.0, 1),
            ],
            vec![0],
            vec![0],
            inclusive(),
        )
        .unwrap();
        let mut k = AosKernel::new(&net, Some(8));
        k.apply_spike(0, 0, 0.5);

        let mut seen = Vec::new();
        k.run_observed(3.0, |time, k| seen.push((time, k.charge(0).unwrap())));
        assert_eq!(seen, vec![(0, 0.5), (1, 0.5), (2, 0.5), (3, 0.5)]);
        assert_eq!(k.charge(0), Some(0.0));
        assert_eq!(k.output_count(0), 0);
    }

    #[test]
    fn leak_applies_when_touched_again() {
        let net = Network::new(
            vec![NeuronSpec::new(0, 1.0, true).with_synapse(0, 0.0, 1)],
            vec![0],
            vec![0],
            inclusive(),
        )
        .unwrap();
        let mut k = AosKernel::new(&net, Some(4));
        k.apply_spike(0, 0, 0.6);
        k.apply_spike(0, 2, 0.6);
        // Without leak 0.6 + 0.6 would cross the threshold at time 2.
        k.run(3.0);
        assert_eq!(k.output_count(0), 0);
    }

    #[test]
    fn full_slots_drop_events() {
        // One synapse: one event per slot.
        let mut k = self_loop(inclusive());
        k.apply_spike(0, 0, 0.5);
        k.apply_spike(0, 0, 0.5);
        assert_eq!(k.pending_events(0), 1);
        k.run(0.0);
        assert_eq!(k.output_count(0), 0);
    }

    #[test]
    fn zero_synapse_network_drops_every_spike() {
        let net = Network::new(vec![NeuronSpec::new(0, 0.5, false)], vec![0], vec![0], inclusive()).unwrap();
        let mut k = AosKernel::new(&net, None);
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
        assert_eq!(k.output_count(0), 0);
    }

    #[test]
    fn ravens_fires_one_step_late() {
        let mut k = self_loop(NetworkConfig {
            fire_like_ravens: true,
            ..inclusive()
        });
        k.apply_spike(0, 0, 1.0);
        k.run(2.0);
        // crosses at 0 and fires at 1, re-excited at 1 and fires at 2
        assert_eq!(k.fire_history(0), &[1, 2]);
        assert_eq!(k.output_count(0), 2);
        assert_eq!(k.output_last_fire(0), 2.0);
    }

    #[test]
    fn clear_then_empty_run_is_silent() {
        let mut k = self_loop(inclusive());
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
        assert_eq!(k.output_count(0), 2);

        k.apply_spike(0, 1, 1.0);
        k.clear_activity();
        k.run(0.0);
        assert_eq!(k.output_count(0), 0);
        assert_eq!(k.output_last_fire(0), -1.0);
        assert_eq!(k.charge(0), Some(0.0));

        // topology survives
        k.apply_spike(0, 0, 1.0);
        k.run(1.0);
        assert_eq!(k.output_count(0), 2);
    }

    #[test]
    fn pending_events_survive_between_runs() {
        let net = Network::new(
            vec![
                NeuronSpec::new(0, 1.0, false).with_synapse(1, 1.0, 3),
                NeuronSpec::new(1, 1.0, false),
            ],
            vec![0],
            vec![1],
            inclusive(),
        )
        .unwrap();
        let mut k = AosKernel::new(&net, None);
        k.apply_spike(0, 0, 1.0);
        k.run(1.0); // times 0..=1, charge for neuron 1 lands at time 3
        assert_eq!(k.output_count(0), 0);
        k.run(1.0); // absolute times 2..=3 -> relative time 1
        assert_eq!(k.output_count(0), 1);
        assert_eq!(k.output_last_fire(0), 1.0);
    }
}
