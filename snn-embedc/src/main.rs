//! Compile a network description into a C simulation kernel.
//!
//! Usage: `snn-embedc [NETWORK] [-p aos|soa|risp|rispSoA] [--sim-time N] [-o FILE]`

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use snn_codegen::Backend;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "snn-embedc")]
#[command(about = "Compile a spiking neural network into a standalone C simulation kernel")]
struct Args {
    /// Network JSON file; read from stdin when absent
    network: Option<PathBuf>,

    /// Kernel layout: event-driven (aos, risp) or dense (soa, rispSoA)
    #[arg(short = 'p', long = "processor", default_value = "aos",
          value_parser = ["aos", "soa", "risp", "rispSoA"])]
    processor: String,

    /// Simulation horizon, overriding `other.sim_time` of the network file
    #[arg(long = "sim-time")]
    sim_time: Option<u32>,

    /// Output file; stdout when absent
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() {
    snn_embedc::init_logging();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let backend: Backend = args.processor.parse()?;

    let source = match &args.network {
        Some(path) => snn_embedc::compile_file(path, backend, args.sim_time)?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read network from stdin")?;
            snn_embedc::compile_json(&text, backend, args.sim_time)?
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &source).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote kernel to {}", path.display());
        }
        None => io::stdout()
            .write_all(source.as_bytes())
            .context("failed to write kernel to stdout")?,
    }
    Ok(())
}
