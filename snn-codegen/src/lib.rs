//! snn-codegen: compiles snn-core networks into standalone C simulation kernels
//!
//! Two backends implement the same external contract over very different layouts:
//! - `aos`: event-driven, a neuron record array plus a sparse ring of charge-change events
//! - `soa`: dense, parallel per-neuron arrays plus timestep x neuron charge/activity matrices
//!
//! Each backend also provides a host-side kernel model (`AosKernel`, `SoaKernel`) that owns
//! exactly the state the generated C keeps in globals, so both can be driven side by side.

pub mod aos;
pub mod backend;
mod common;
pub mod error;
pub mod kernel;
pub mod soa;

// Re-exports
pub use aos::AosKernel;
pub use backend::Backend;
pub use error::{CodegenError, Result};
pub use kernel::Kernel;
pub use soa::SoaKernel;
