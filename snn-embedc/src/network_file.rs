//! JSON network description and processor parameter resolution.

use serde::Deserialize;
use snn_core::{Network, NetworkBuilder, NetworkConfig, NetworkResult};

#[derive(Clone, Debug, Deserialize)]
pub struct NeuronEntry {
    pub id: u32,
    pub threshold: f64,
    /// Only consulted when `leak_mode` is `configurable`.
    #[serde(default)]
    pub leak: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SynapseEntry {
    pub from: u32,
    pub to: u32,
    pub weight: f64,
    pub delay: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakMode {
    /// No neuron leaks.
    #[default]
    None,
    /// Every neuron leaks.
    All,
    /// Per-neuron `leak` flag.
    Configurable,
}

impl LeakMode {
    pub fn resolve(self, declared: bool) -> bool {
        match self {
            LeakMode::None => false,
            LeakMode::All => true,
            LeakMode::Configurable => declared,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProcParams {
    pub spike_value_factor: f64,
    pub min_potential: f64,
    pub leak_mode: LeakMode,
    pub run_time_inclusive: bool,
    pub threshold_inclusive: bool,
    pub fire_like_ravens: bool,
}

impl Default for ProcParams {
    fn default() -> Self {
        let config = NetworkConfig::default();
        Self {
            spike_value_factor: config.spike_value_factor,
            min_potential: config.min_potential,
            leak_mode: LeakMode::default(),
            run_time_inclusive: config.run_time_inclusive,
            threshold_inclusive: config.threshold_inclusive,
            fire_like_ravens: config.fire_like_ravens,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Other {
    /// Simulation horizon; zero or negative means "not declared".
    #[serde(default)]
    pub sim_time: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetworkFile {
    pub neurons: Vec<NeuronEntry>,
    #[serde(default)]
    pub synapses: Vec<SynapseEntry>,
    /// `inputs[k]` is the neuron id behind input port `k`.
    #[serde(default)]
    pub inputs: Vec<u32>,
    #[serde(default)]
    pub outputs: Vec<u32>,
    #[serde(default)]
    pub proc_params: ProcParams,
    #[serde(default)]
    pub other: Other,
}

impl NetworkFile {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn config(&self) -> NetworkConfig {
        let p = &self.proc_params;
        NetworkConfig {
            spike_value_factor: p.spike_value_factor,
            min_potential: p.min_potential,
            run_time_inclusive: p.run_time_inclusive,
            threshold_inclusive: p.threshold_inclusive,
            fire_like_ravens: p.fire_like_ravens,
        }
    }

    /// Declared simulation horizon, if any.
    pub fn horizon(&self) -> Option<u32> {
        self.other
            .sim_time
            .filter(|&t| t > 0)
            .map(|t| u32::try_from(t).unwrap_or(u32::MAX))
    }

    pub fn to_network(&self) -> NetworkResult<Network> {
        let leak_mode = self.proc_params.leak_mode;
        let mut builder = NetworkBuilder::new();
        for n in &self.neurons {
            builder.add_neuron(n.id, n.threshold, leak_mode.resolve(n.leak));
        }
        for s in &self.synapses {
            builder.add_synapse(s.from, s.to, s.weight, s.delay);
        }
        for (port, &id) in self.inputs.iter().enumerate() {
            builder.add_input(port, id);
        }
        for (port, &id) in self.outputs.iter().enumerate() {
            builder.add_output(port, id);
        }
        builder.build(self.config())
    }
}
