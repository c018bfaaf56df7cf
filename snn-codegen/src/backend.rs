//! Backend selection: an explicit choice between the two kernel layouts.

use core::fmt;
use core::str::FromStr;

use snn_core::{KernelLayout, Network, NetworkConfig};
use thiserror::Error;
use tracing::debug;

use crate::aos::{self, AosKernel};
use crate::error::{CodegenError, Result};
use crate::kernel::Kernel;
use crate::soa::{self, SoaKernel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Event-driven ring buffer over an array of neuron records.
    Aos,
    /// Dense timestep x neuron matrices over parallel per-neuron arrays.
    Soa,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown backend `{0}` (expected aos, soa, risp or rispSoA)")]
pub struct UnknownBackend(pub String);

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Aos, Backend::Soa];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Aos => "aos",
            Backend::Soa => "soa",
        }
    }

    /// Fails for semantic combinations this backend cannot generate correct code for.
    pub fn check_supported(&self, config: &NetworkConfig) -> Result<()> {
        if *self == Backend::Soa && config.fire_like_ravens {
            return Err(CodegenError::UnsupportedConfiguration {
                backend: *self,
                feature: "fire_like_ravens",
            });
        }
        Ok(())
    }

    /// Generate the C source of a kernel for `network`.
    pub fn compile(&self, network: &Network, horizon: Option<u32>) -> Result<String> {
        self.check_supported(network.config())?;
        let layout = KernelLayout::resolve(network, horizon);
        debug!(
            backend = %self,
            neurons = layout.num_neurons,
            synapses = layout.num_synapses,
            max_outgoing = layout.max_outgoing,
            horizon = layout.max_num_timesteps,
            "compiling kernel"
        );

        let source = match self {
            Backend::Aos => aos::emit(network, &layout)?,
            Backend::Soa => soa::emit(network, &layout)?,
        };
        debug!(backend = %self, bytes = source.len(), "kernel emitted");
        Ok(source)
    }

    /// Host-side model of the kernel `compile` would generate.
    pub fn instantiate(&self, network: &Network, horizon: Option<u32>) -> Result<Box<dyn Kernel>> {
        let kernel: Box<dyn Kernel> = match self {
            Backend::Aos => Box::new(AosKernel::new(network, horizon)),
            Backend::Soa => Box::new(SoaKernel::new(network, horizon)?),
        };
        Ok(kernel)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = UnknownBackend;

    /// `risp` and `rispSoA` are accepted as processor-name aliases.
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "aos" | "risp" => Ok(Backend::Aos),
            "soa" | "rispSoA" => Ok(Backend::Soa),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}
