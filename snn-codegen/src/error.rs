//! Compilation errors

use snn_core::NetworkError;
use thiserror::Error;

use crate::backend::Backend;

pub type Result<T, E = CodegenError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// The network asks for semantics the selected backend cannot express.
    #[error("{backend} backend does not support {feature}")]
    UnsupportedConfiguration {
        backend: Backend,
        feature: &'static str,
    },

    #[error("{what} has no C literal ({value})")]
    NonFiniteLiteral { what: String, value: f64 },

    #[error(transparent)]
    Network(#[from] NetworkError),
}
