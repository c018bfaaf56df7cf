//! Graph construction: sparse neuron ids in, sorted index space out.
//!
//! Neurons are stably sorted by id and numbered densely in that order. Synapses keep the
//! order in which they were added, per source neuron.

use crate::config::NetworkConfig;
use crate::error::{NetworkError, NetworkResult, PortKind};
use crate::ir::Network;
use crate::neuron::NeuronSpec;
use crate::synapse::SynapseSpec;

#[derive(Clone, Copy, Debug)]
struct PendingNeuron {
    id: u32,
    threshold: f64,
    leak: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingSynapse {
    from: u32,
    to: u32,
    weight: f64,
    delay: u32,
}

#[derive(Clone, Debug, Default)]
pub struct NetworkBuilder {
    neurons: Vec<PendingNeuron>,
    synapses: Vec<PendingSynapse>,
    inputs: Vec<(usize, u32)>,  // (port, neuron id)
    outputs: Vec<(usize, u32)>, // (port, neuron id)
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_neuron(&mut self, id: u32, threshold: f64, leak: bool) -> &mut Self {
        self.neurons.push(PendingNeuron { id, threshold, leak });
        self
    }

    pub fn add_synapse(&mut self, from: u32, to: u32, weight: f64, delay: u32) -> &mut Self {
        self.synapses.push(PendingSynapse {
            from,
            to,
            weight,
            delay,
        });
        self
    }

    pub fn add_input(&mut self, port: usize, neuron_id: u32) -> &mut Self {
        self.inputs.push((port, neuron_id));
        self
    }

    pub fn add_output(&mut self, port: usize, neuron_id: u32) -> &mut Self {
        self.outputs.push((port, neuron_id));
        self
    }

    pub fn build(&self, config: NetworkConfig) -> NetworkResult<Network> {
        let mut sorted = self.neurons.clone();
        sorted.sort_by_key(|n| n.id); // stable
        for pair in sorted.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(NetworkError::DuplicateNeuron(pair[0].id));
            }
        }

        let index_of = |id: u32| -> NetworkResult<u32> {
            sorted
                .binary_search_by_key(&id, |n| n.id)
                .map(|i| i as u32)
                .map_err(|_| NetworkError::UnknownNeuron(id))
        };

        let mut neurons: Vec<NeuronSpec> = sorted
            .iter()
            .enumerate()
            .map(|(i, n)| NeuronSpec::new(i as u32, n.threshold, n.leak))
            .collect();

        for syn in &self.synapses {
            let from = index_of(syn.from)?;
            let to = index_of(syn.to)?;
            neurons[from as usize]
                .outgoing
                .push(SynapseSpec::new(to, syn.delay, syn.weight));
        }

        let inputs = resolve_ports(PortKind::Input, &self.inputs, &index_of)?;
        let outputs = resolve_ports(PortKind::Output, &self.outputs, &index_of)?;

        Network::new(neurons, inputs, outputs, config)
    }
}

/// Ports must cover `0..assignments.len()` exactly once each.
fn resolve_ports<F>(kind: PortKind, assignments: &[(usize, u32)], index_of: &F) -> NetworkResult<Vec<u32>>
where
    F: Fn(u32) -> NetworkResult<u32>,
{
    let mut slots: Vec<Option<u32>> = vec![None; assignments.len()];
    for &(port, id) in assignments {
        let index = index_of(id)?;
        match slots.get_mut(port) {
            Some(Some(_)) => return Err(NetworkError::DuplicatePort { kind, port }),
            Some(slot) => *slot = Some(index),
            None => {} // reported below as the gap it leaves
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(port, slot)| slot.ok_or(NetworkError::MissingPort { kind, port }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_id_and_resolves_indices() {
        let mut b = NetworkBuilder::new();
        b.add_neuron(30, 3.0, false)
            .add_neuron(10, 1.0, true)
            .add_neuron(20, 2.0, false)
            .add_synapse(10, 30, 0.5, 2)
            .add_synapse(30, 10, -0.5, 1)
            .add_synapse(10, 20, 0.25, 1)
            .add_input(0, 10)
            .add_output(1, 20)
            .add_output(0, 30);

        let net = b.build(NetworkConfig::default()).unwrap();
        let thresholds: Vec<f64> = net.neurons().iter().map(|n| n.threshold).collect();
        assert_eq!(thresholds, vec![1.0, 2.0, 3.0]);

        // id 10 -> index 0, synapse order preserved
        let first = &net.neurons()[0];
        assert!(first.leak);
        assert_eq!(first.outgoing[0], SynapseSpec::new(2, 2, 0.5));
        assert_eq!(first.outgoing[1], SynapseSpec::new(1, 1, 0.25));
        assert_eq!(net.neurons()[2].outgoing[0].target_index, 0);

        assert_eq!(net.inputs(), &[0]);
        assert_eq!(net.outputs(), &[2, 1]);
    }

    #[test]
    fn index_space_is_a_bijection() {
        let mut b = NetworkBuilder::new();
        for id in [7u32, 3, 99, 1, 42, 0] {
            b.add_neuron(id, 1.0, false);
        }
        let net = b.build(NetworkConfig::default()).unwrap();
        let mut seen = vec![false; net.num_neurons()];
        for n in net.neurons() {
            assert!(!seen[n.index as usize]);
            seen[n.index as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn rejects_duplicates_and_unknown_ids() {
        let mut b = NetworkBuilder::new();
        b.add_neuron(1, 1.0, false).add_neuron(1, 2.0, false);
        assert_eq!(b.build(NetworkConfig::default()).unwrap_err(), NetworkError::DuplicateNeuron(1));

        let mut b = NetworkBuilder::new();
        b.add_neuron(1, 1.0, false).add_synapse(1, 2, 1.0, 1);
        assert_eq!(b.build(NetworkConfig::default()).unwrap_err(), NetworkError::UnknownNeuron(2));
    }

    #[test]
    fn rejects_port_gaps_and_duplicates() {
        let mut b = NetworkBuilder::new();
        b.add_neuron(0, 1.0, false).add_neuron(1, 1.0, false);
        b.add_input(0, 0).add_input(2, 1);
        assert_eq!(
            b.build(NetworkConfig::default()).unwrap_err(),
            NetworkError::MissingPort { kind: PortKind::Input, port: 1 }
        );

        let mut b = NetworkBuilder::new();
        b.add_neuron(0, 1.0, false).add_neuron(1, 1.0, false);
        b.add_output(0, 0).add_output(0, 1);
        assert_eq!(
            b.build(NetworkConfig::default()).unwrap_err(),
            NetworkError::DuplicatePort { kind: PortKind::Output, port: 0 }
        );
    }
}
