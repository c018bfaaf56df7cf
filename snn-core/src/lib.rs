//! snn-core: Zero-dependency network IR and kernel layout for embedded SNN code generation
//!
//! Contents:
//! - Sorted, index-resolved network IR (`Network`, `NeuronSpec`, `SynapseSpec`)
//! - `NetworkBuilder` for graph construction from sparse neuron ids
//! - `KernelLayout`, the compile-time constants every generated kernel is sized from
//! - `EventRing`, the bounded per-timestep event ring of the event-driven kernel
//! - C literal formatting and an indentation-aware `CodeWriter`

pub mod builder;
pub mod config;
pub mod error;
pub mod event_queue;
pub mod ir;
pub mod layout;
pub mod literal;
pub mod neuron;
pub mod synapse;
pub mod writer;

// Re-exports
pub use builder::NetworkBuilder;
pub use config::NetworkConfig;
pub use error::{NetworkError, NetworkResult, PortKind};
pub use event_queue::{ChargeEvent, EventRing};
pub use ir::Network;
pub use layout::{run_time, KernelLayout, MIN_TIMESTEPS};
pub use literal::{c_double, c_flag, c_initializer};
pub use neuron::NeuronSpec;
pub use synapse::SynapseSpec;
pub use writer::CodeWriter;
