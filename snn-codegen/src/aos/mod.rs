//! Event-driven kernel: an array of neuron records plus a sparse ring of charge-change
//! events, one bounded event list per timestep of the horizon.
//!
//! Only neurons with a pending event in the current slot are leaked, floored and
//! fire-tested; a final pass over all neurons after each run settles the rest.
//! Supports `fire_like_ravens` (fires take effect one timestep late).

mod emit;
mod kernel;

pub use emit::emit;
pub use kernel::AosKernel;
