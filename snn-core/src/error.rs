use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Input => write!(f, "input"),
            PortKind::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    Empty,
    /// The neuron at `position` carries a different index.
    IndexMismatch { position: usize, index: u32 },
    TargetOutOfRange { source: u32, target: u32, num_neurons: usize },
    PortOutOfRange { kind: PortKind, port: usize, neuron: u32 },
    DuplicateNeuron(u32),
    UnknownNeuron(u32),
    DuplicatePort { kind: PortKind, port: usize },
    MissingPort { kind: PortKind, port: usize },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Empty => write!(f, "network has no neurons"),
            NetworkError::IndexMismatch { position, index } => {
                write!(f, "neuron at position {} has index {}", position, index)
            }
            NetworkError::TargetOutOfRange { source, target, num_neurons } => write!(
                f,
                "synapse {} -> {} targets a neuron outside 0..{}",
                source, target, num_neurons
            ),
            NetworkError::PortOutOfRange { kind, port, neuron } => {
                write!(f, "{} port {} maps to missing neuron {}", kind, port, neuron)
            }
            NetworkError::DuplicateNeuron(id) => write!(f, "duplicate neuron id {}", id),
            NetworkError::UnknownNeuron(id) => write!(f, "unknown neuron id {}", id),
            NetworkError::DuplicatePort { kind, port } => {
                write!(f, "{} port {} assigned more than once", kind, port)
            }
            NetworkError::MissingPort { kind, port } => {
                write!(f, "{} port {} is not mapped to a neuron", kind, port)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

pub type NetworkResult<T, E = NetworkError> = core::result::Result<T, E>;
