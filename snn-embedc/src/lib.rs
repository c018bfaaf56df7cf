//! snn-embedc: compile JSON network descriptions into standalone C SNN kernels.

pub mod network_file;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use snn_codegen::Backend;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub use network_file::{LeakMode, NetworkFile, ProcParams};

/// Initialize logging with a default filter, written to stderr.
///
/// `RUST_LOG` overrides the default of `info` plus `debug` for the code generator.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,snn_codegen=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Compile a JSON network description. `sim_time` overrides the file's declared horizon.
pub fn compile_json(text: &str, backend: Backend, sim_time: Option<u32>) -> Result<String> {
    let file = NetworkFile::from_json(text).context("invalid network description")?;
    let network = file.to_network().context("invalid network")?;
    let horizon = sim_time.or_else(|| file.horizon());

    info!(
        %backend,
        neurons = network.num_neurons(),
        synapses = network.num_synapses(),
        inputs = network.num_inputs(),
        outputs = network.num_outputs(),
        "compiling network"
    );
    let source = backend
        .compile(&network, horizon)
        .with_context(|| format!("{} backend failed", backend))?;
    Ok(source)
}

pub fn compile_file(path: &Path, backend: Backend, sim_time: Option<u32>) -> Result<String> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    compile_json(&text, backend, sim_time).with_context(|| format!("failed to compile {}", path.display()))
}
