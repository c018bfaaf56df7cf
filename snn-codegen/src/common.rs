//! Emission pieces both backends share: constants, port tables, run prologue, outputs.

use snn_core::{c_double, c_initializer, CodeWriter, KernelLayout, Network, NetworkConfig};

use crate::error::{CodegenError, Result};

/// C literal for `value`, or an error naming `what` when it is not finite.
pub(crate) fn double<F: FnOnce() -> String>(value: f64, what: F) -> Result<String> {
    c_double(value).ok_or_else(|| CodegenError::NonFiniteLiteral { what: what(), value })
}

pub(crate) fn emit_banner(w: &mut CodeWriter, title: &str) {
    w.line(&format!("/* {} */", title));
    w.line("/* Generated file: every array is sized for the network it was compiled from. */");
    w.blank();
}

pub(crate) fn emit_defines(w: &mut CodeWriter, layout: &KernelLayout, config: &NetworkConfig) -> Result<()> {
    let min_potential = double(config.min_potential, || "min_potential".into())?;
    let spike_value_factor = double(config.spike_value_factor, || "spike_value_factor".into())?;

    w.line(&format!("#define NUM_NEURONS ({})", layout.num_neurons));
    w.line(&format!("#define NUM_INPUT_NEURONS ({})", layout.num_inputs));
    w.line(&format!("#define NUM_OUTPUT_NEURONS ({})", layout.num_outputs));
    w.line(&format!("#define NUM_SYNAPSES ({})", layout.num_synapses));
    w.line(&format!("#define MAX_NUM_TIMESTEPS ({})", layout.max_num_timesteps));
    w.line(&format!("#define MAX_OUTGOING ({})", layout.max_outgoing));
    w.line(&format!("#define MIN_POTENTIAL ({})", min_potential));
    w.line(&format!("#define SPIKE_VALUE_FACTOR ({})", spike_value_factor));
    w.blank();
    w.line("/* Array extents; C has no zero-length arrays */");
    w.line("#define OUTGOING_CAPACITY (MAX_OUTGOING > 0 ? MAX_OUTGOING : 1)");
    w.line("#define INPUT_TABLE_SIZE (NUM_INPUT_NEURONS > 0 ? NUM_INPUT_NEURONS : 1)");
    w.line("#define OUTPUT_TABLE_SIZE (NUM_OUTPUT_NEURONS > 0 ? NUM_OUTPUT_NEURONS : 1)");
    w.blank();
    Ok(())
}

pub(crate) fn emit_port_tables(w: &mut CodeWriter, network: &Network) {
    let inputs = c_initializer(network.inputs().iter().map(u32::to_string));
    let outputs = c_initializer(network.outputs().iter().map(u32::to_string));
    w.line(&format!(
        "static const unsigned int INPUT_IND_TO_NEURON_IND[INPUT_TABLE_SIZE] = {};",
        inputs
    ));
    w.line(&format!(
        "static const unsigned int OUTPUT_IND_TO_NEURON_IND[OUTPUT_TABLE_SIZE] = {};",
        outputs
    ));
    w.blank();
}

/// Reject negative runs, then derive `run_time`, the last timestep to process.
pub(crate) fn emit_run_time_guard(w: &mut CodeWriter, config: &NetworkConfig) {
    let last = if config.run_time_inclusive {
        "duration"
    } else {
        "duration - 1"
    };
    w.line("/* Nothing to do for an empty run */");
    w.block(&format!("if ({} < 0)", last), |w| {
        w.line("return;");
    });
    w.blank();
    w.line(&format!("run_time = (unsigned int)({});", last));
    w.blank();
}

/// `output_last_fire` and `output_count`; `field(neuron_expr, name)` renders a per-neuron
/// tracking field in the backend's layout.
pub(crate) fn emit_output_queries<F>(w: &mut CodeWriter, field: F)
where
    F: Fn(&str, &str) -> String,
{
    let neuron = "OUTPUT_IND_TO_NEURON_IND[output_ind]";

    w.line("/* Last firing time of an output neuron during the most recent run(), -1 if it did not fire. */");
    w.block("double output_last_fire(unsigned int output_ind)", |w| {
        w.block("if (output_ind >= NUM_OUTPUT_NEURONS)", |w| {
            w.line("return -1;");
        });
        w.blank();
        w.line(&format!("return (double){};", field(neuron, "last_fire")));
    });
    w.blank();

    w.line("/* Number of fires of an output neuron during the most recent run(). */");
    w.block("unsigned int output_count(unsigned int output_ind)", |w| {
        w.block("if (output_ind >= NUM_OUTPUT_NEURONS)", |w| {
            w.line("return 0;");
        });
        w.blank();
        w.line(&format!("return {};", field(neuron, "fire_count")));
    });
}
