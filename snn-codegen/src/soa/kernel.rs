//! Host-side model of the dense kernel.

use snn_core::{run_time, KernelLayout, Network, NetworkConfig};

use crate::backend::Backend;
use crate::error::Result;
use crate::kernel::Kernel;

/// State of one compiled dense kernel: the generated arrays, flattened row-major.
#[derive(Clone, Debug)]
pub struct SoaKernel {
    layout: KernelLayout,
    config: NetworkConfig,
    input_map: Vec<u32>,
    output_map: Vec<u32>,

    neuron_leak: Vec<bool>,
    neuron_outgoing: Vec<usize>,
    neuron_threshold: Vec<f64>,
    neuron_fire_count: Vec<u32>,
    neuron_last_fire: Vec<i32>,
    neuron_fire_times: Vec<u32>, // NUM_NEURONS x MAX_NUM_TIMESTEPS

    charge_buffer: Vec<f64>, // MAX_NUM_TIMESTEPS x NUM_NEURONS
    active: Vec<bool>,       // MAX_NUM_TIMESTEPS x NUM_NEURONS
    current_timestep: u64,

    synapse_to: Vec<u32>, // NUM_NEURONS x OUTGOING_CAPACITY
    synapse_delay: Vec<u32>,
    synapse_weight: Vec<f64>,
}

impl SoaKernel {
    pub fn new(network: &Network, horizon: Option<u32>) -> Result<Self> {
        Backend::Soa.check_supported(network.config())?;

        let layout = KernelLayout::resolve(network, horizon);
        let n = layout.num_neurons;
        let h = layout.max_num_timesteps;
        let width = layout.outgoing_capacity();

        let mut synapse_to = vec![0; n * width];
        let mut synapse_delay = vec![0; n * width];
        let mut synapse_weight = vec![0.0; n * width];
        for neuron in network.neurons() {
            let row = neuron.index as usize * width;
            for (j, syn) in neuron.outgoing.iter().enumerate() {
                synapse_to[row + j] = syn.target_index;
                synapse_delay[row + j] = syn.effective_delay();
                synapse_weight[row + j] = syn.weight;
            }
        }

        Ok(Self {
            layout,
            config: *network.config(),
            input_map: network.inputs().to_vec(),
            output_map: network.outputs().to_vec(),
            neuron_leak: network.neurons().iter().map(|n| n.leak).collect(),
            neuron_outgoing: network.neurons().iter().map(|n| n.fan_out()).collect(),
            neuron_threshold: network.neurons().iter().map(|n| n.threshold).collect(),
            neuron_fire_count: vec![0; n],
            neuron_last_fire: vec![-1; n],
            neuron_fire_times: vec![0; n * h],
            charge_buffer: vec![0.0; h * n],
            active: vec![false; h * n],
            current_timestep: 0,
            synapse_to,
            synapse_delay,
            synapse_weight,
        })
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    /// Absolute timestep the next run starts at.
    pub fn current_timestep(&self) -> u64 {
        self.current_timestep
    }

    /// Fire times of a neuron during the most recent run, capped at the horizon.
    pub fn fire_history(&self, neuron_index: u32) -> &[u32] {
        let i = neuron_index as usize;
        let Some(&count) = self.neuron_fire_count.get(i) else {
            return &[];
        };
        let h = self.layout.max_num_timesteps;
        &self.neuron_fire_times[i * h..i * h + (count as usize).min(h)]
    }

    /// Charge waiting for a neuron `offset` timesteps after the current one.
    pub fn pending_charge(&self, neuron_index: u32, offset: u64) -> Option<f64> {
        let i = neuron_index as usize;
        if i >= self.layout.num_neurons {
            return None;
        }
        let slot = self.layout.slot(self.current_timestep, offset);
        Some(self.charge_buffer[self.cell(slot, i)])
    }

    #[inline]
    fn cell(&self, slot: usize, neuron: usize) -> usize {
        slot * self.layout.num_neurons + neuron
    }

    fn step(&mut self, time: u32) {
        let n = self.layout.num_neurons;
        let h = self.layout.max_num_timesteps;
        let width = self.layout.outgoing_capacity();
        let slot = self.layout.slot(self.current_timestep, time as u64);
        let carries = !self.layout.all_leak;

        for i in 0..n {
            let here = self.cell(slot, i);
            if self.charge_buffer[here] < self.config.min_potential {
                self.charge_buffer[here] = self.config.min_potential;
            }

            if self.active[here] && self.config.fires(self.charge_buffer[here], self.neuron_threshold[i]) {
                for j in 0..self.neuron_outgoing[i] {
                    let to_slot = (slot + self.synapse_delay[i * width + j] as usize) % h;
                    let target = self.cell(to_slot, self.synapse_to[i * width + j] as usize);
                    let weight = self.synapse_weight[i * width + j];
                    self.charge_buffer[target] += weight;
                    self.active[target] = true;
                }

                let count = self.neuron_fire_count[i] as usize;
                if count < h {
                    self.neuron_fire_times[i * h + count] = time;
                }
                self.neuron_last_fire[i] = time as i32;
                self.neuron_fire_count[i] += 1;
            } else if carries && !self.neuron_leak[i] {
                let next = self.cell((slot + 1) % h, i);
                let carried = self.charge_buffer[here];
                self.charge_buffer[next] += carried;
            }
        }

        let row = self.cell(slot, 0);
        self.charge_buffer[row..row + n].fill(0.0);
        self.active[row..row + n].fill(false);
    }
}

impl Kernel for SoaKernel {
    fn apply_spike(&mut self, input_index: u32, time: u32, value: f64) {
        let Some(&neuron) = self.input_map.get(input_index as usize) else {
            return;
        };
        if time as usize >= self.layout.max_num_timesteps {
            return;
        }
        let slot = self.layout.slot(self.current_timestep, time as u64);
        let cell = self.cell(slot, neuron as usize);
        self.charge_buffer[cell] += value * self.config.spike_value_factor;
        self.active[cell] = true;
    }

    fn run(&mut self, duration: f64) {
        self.neuron_last_fire.fill(-1);
        self.neuron_fire_count.fill(0);

        let Some(run_time) = run_time(duration, self.config.run_time_inclusive) else {
            return;
        };
        for time in 0..=run_time {
            self.step(time);
        }

        let advance = if self.config.run_time_inclusive {
            duration + 1.0
        } else {
            duration
        };
        self.current_timestep = (self.current_timestep as f64 + advance) as u64;
    }

    fn clear_activity(&mut self) {
        self.neuron_last_fire.fill(-1);
        self.neuron_fire_count.fill(0);
        self.charge_buffer.fill(0.0);
        self.active.fill(false);
    }

    fn output_last_fire(&self, output_index: u32) -> f64 {
        match self.output_map.get(output_index as usize) {
            Some(&idx) => self.neuron_last_fire[idx as usize] as f64,
            None => -1.0,
        }
    }

    fn output_count(&self, output_index: u32) -> u32 {
        match self.output_map.get(output_index as usize) {
            Some(&idx) => self.neuron_fire_count[idx as usize],
            None => 0,
        }
    }

    fn backend(&self) -> Backend {
        Backend::Soa
    }
}
