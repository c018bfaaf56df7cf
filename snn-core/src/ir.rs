//! Sorted, index-resolved network IR consumed by the kernel compilers.
//!
//! A `Network` is immutable once built: neurons sit at their index, every synapse target
//! and every port resolves to an existing neuron.

use crate::config::NetworkConfig;
use crate::error::{NetworkError, NetworkResult, PortKind};
use crate::neuron::NeuronSpec;
use crate::synapse::SynapseSpec;

#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    neurons: Vec<NeuronSpec>,
    inputs: Vec<u32>,  // input index -> neuron index
    outputs: Vec<u32>, // output index -> neuron index
    config: NetworkConfig,
}

impl Network {
    /// Assemble a network from already-sorted neurons and resolved port maps.
    pub fn new(
        neurons: Vec<NeuronSpec>,
        inputs: Vec<u32>,
        outputs: Vec<u32>,
        config: NetworkConfig,
    ) -> NetworkResult<Self> {
        if neurons.is_empty() {
            return Err(NetworkError::Empty);
        }

        let num_neurons = neurons.len();
        for (position, neuron) in neurons.iter().enumerate() {
            if neuron.index as usize != position {
                return Err(NetworkError::IndexMismatch {
                    position,
                    index: neuron.index,
                });
            }
            for syn in &neuron.outgoing {
                if syn.target_index as usize >= num_neurons {
                    return Err(NetworkError::TargetOutOfRange {
                        source: neuron.index,
                        target: syn.target_index,
                        num_neurons,
                    });
                }
            }
        }

        check_ports(PortKind::Input, &inputs, num_neurons)?;
        check_ports(PortKind::Output, &outputs, num_neurons)?;

        Ok(Self {
            neurons,
            inputs,
            outputs,
            config,
        })
    }

    pub fn neurons(&self) -> &[NeuronSpec] {
        &self.neurons
    }

    pub fn neuron(&self, index: u32) -> Option<&NeuronSpec> {
        self.neurons.get(index as usize)
    }

    pub fn inputs(&self) -> &[u32] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[u32] {
        &self.outputs
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn num_synapses(&self) -> usize {
        self.neurons.iter().map(NeuronSpec::fan_out).sum()
    }

    /// All synapses as `(source index, synapse)` in index order.
    pub fn synapses(&self) -> impl Iterator<Item = (u32, &SynapseSpec)> + '_ {
        self.neurons
            .iter()
            .flat_map(|n| n.outgoing.iter().map(move |s| (n.index, s)))
    }

    pub fn max_delay(&self) -> Option<u32> {
        self.synapses().map(|(_, s)| s.delay).max()
    }

    pub fn max_outgoing(&self) -> usize {
        self.neurons.iter().map(NeuronSpec::fan_out).max().unwrap_or(0)
    }

    /// At least one neuron leaks.
    pub fn has_leak(&self) -> bool {
        self.neurons.iter().any(|n| n.leak)
    }

    /// Every neuron leaks.
    pub fn all_leak(&self) -> bool {
        self.neurons.iter().all(|n| n.leak)
    }
}

fn check_ports(kind: PortKind, ports: &[u32], num_neurons: usize) -> NetworkResult<()> {
    for (port, &neuron) in ports.iter().enumerate() {
        if neuron as usize >= num_neurons {
            return Err(NetworkError::PortOutOfRange { kind, port, neuron });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<NeuronSpec> {
        vec![
            NeuronSpec::new(0, 1.0, false).with_synapse(1, 0.5, 3).with_synapse(2, 0.5, 1),
            NeuronSpec::new(1, 1.0, true).with_synapse(2, 1.0, 2),
            NeuronSpec::new(2, 1.0, false),
        ]
    }

    #[test]
    fn derived_counts() {
        let net = Network::new(chain(), vec![0], vec![2], NetworkConfig::default()).unwrap();
        assert_eq!(net.num_neurons(), 3);
        assert_eq!(net.num_synapses(), 3);
        assert_eq!(net.max_outgoing(), 2);
        assert_eq!(net.max_delay(), Some(3));
        assert!(net.has_leak());
        assert!(!net.all_leak());

        let sources: Vec<u32> = net.synapses().map(|(src, _)| src).collect();
        assert_eq!(sources, vec![0, 0, 1]);
    }

    #[test]
    fn rejects_gaps_in_index_space() {
        let mut neurons = chain();
        neurons[1].index = 5;
        let err = Network::new(neurons, vec![], vec![], NetworkConfig::default()).unwrap_err();
        assert_eq!(err, NetworkError::IndexMismatch { position: 1, index: 5 });
    }

    #[test]
    fn rejects_out_of_range_targets_and_ports() {
        let neurons = vec![NeuronSpec::new(0, 1.0, false).with_synapse(4, 1.0, 1)];
        let err = Network::new(neurons, vec![0], vec![], NetworkConfig::default()).unwrap_err();
        assert!(matches!(err, NetworkError::TargetOutOfRange { target: 4, .. }));

        let err = Network::new(chain(), vec![0, 3], vec![], NetworkConfig::default()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::PortOutOfRange { kind: PortKind::Input, port: 1, neuron: 3 }
        );
    }

    #[test]
    fn rejects_empty_network() {
        let err = Network::new(vec![], vec![], vec![], NetworkConfig::default()).unwrap_err();
        assert_eq!(err, NetworkError::Empty);
    }

    #[test]
    fn no_synapses() {
        let net = Network::new(
            vec![NeuronSpec::new(0, 1.0, true)],
            vec![0],
            vec![0],
            NetworkConfig::default(),
        )
        .unwrap();
        assert_eq!(net.max_delay(), None);
        assert_eq!(net.max_outgoing(), 0);
        assert!(net.all_leak());
    }
}
