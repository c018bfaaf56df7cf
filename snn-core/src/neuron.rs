//! Compile-time view of one neuron

use crate::synapse::SynapseSpec;

#[derive(Clone, Debug, PartialEq)]
pub struct NeuronSpec {
    /// Position in the sorted neuron sequence; also the index used by every generated array.
    pub index: u32,
    pub threshold: f64,
    /// Full charge reset whenever the neuron is processed (no partial leak).
    pub leak: bool,
    pub outgoing: Vec<SynapseSpec>,
}

impl NeuronSpec {
    pub fn new(index: u32, threshold: f64, leak: bool) -> Self {
        Self {
            index,
            threshold,
            leak,
            outgoing: Vec::new(),
        }
    }

    /// Append an outgoing synapse (builder style, mostly for hand-assembled networks).
    pub fn with_synapse(mut self, target_index: u32, weight: f64, delay: u32) -> Self {
        self.outgoing.push(SynapseSpec::new(target_index, delay, weight));
        self
    }

    #[inline]
    pub fn fan_out(&self) -> usize {
        self.outgoing.len()
    }
}
