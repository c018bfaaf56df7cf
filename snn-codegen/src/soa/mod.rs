//! Dense kernel: parallel per-neuron arrays plus `MAX_NUM_TIMESTEPS x NUM_NEURONS` charge
//! and activity matrices indexed by ring slot.
//!
//! Every neuron is visited every timestep. Un-fired charge of non-leaking neurons is
//! carried into the next slot; a leaking or fired neuron simply does not carry.
//! `fire_like_ravens` is rejected.

mod emit;
mod kernel;

pub use emit::emit;
pub use kernel::SoaKernel;
