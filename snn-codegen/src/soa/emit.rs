//! C emission for the dense kernel.

use snn_core::{c_flag, c_initializer, CodeWriter, KernelLayout, Network, NetworkConfig};
use tracing::trace;

use crate::backend::Backend;
use crate::common::{double, emit_banner, emit_defines, emit_output_queries, emit_port_tables, emit_run_time_guard};
use crate::error::Result;

/// Generate the complete dense kernel for `network`.
pub fn emit(network: &Network, layout: &KernelLayout) -> Result<String> {
    Backend::Soa.check_supported(network.config())?;

    let mut ctx = SoaEmitter {
        network,
        layout,
        config: network.config(),
        w: CodeWriter::new(),
    };
    ctx.emit_all()?;
    Ok(ctx.w.finish())
}

/// How un-fired charge reaches the next slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CarryOver {
    /// Every neuron leaks: nothing is carried.
    None,
    /// No neuron leaks: every un-fired neuron carries.
    All,
    /// Carry only for neurons with `neuron_leak[i] == 0`.
    NonLeaking,
}

impl CarryOver {
    fn for_layout(layout: &KernelLayout) -> Self {
        if layout.all_leak {
            CarryOver::None
        } else if layout.has_leak {
            CarryOver::NonLeaking
        } else {
            CarryOver::All
        }
    }
}

struct SoaEmitter<'a> {
    network: &'a Network,
    layout: &'a KernelLayout,
    config: &'a NetworkConfig,
    w: CodeWriter,
}

impl<'a> SoaEmitter<'a> {
    fn emit_all(&mut self) -> Result<()> {
        emit_banner(&mut self.w, "SNN kernel: dense timestep matrices (SoA)");
        emit_defines(&mut self.w, self.layout, self.config)?;
        emit_port_tables(&mut self.w, self.network);
        self.emit_neuron_arrays()?;
        self.emit_synapse_arrays()?;

        trace!("emitting apply_spike");
        self.emit_apply_spike();
        self.w.blank();
        trace!("emitting run");
        self.emit_run();
        self.w.blank();
        trace!("emitting clear_activity");
        self.emit_clear_activity();
        self.w.blank();
        emit_output_queries(&mut self.w, |neuron, field| format!("neuron_{}[{}]", field, neuron));
        Ok(())
    }

    fn emit_neuron_arrays(&mut self) -> Result<()> {
        let neurons = self.network.neurons();
        let thresholds = neurons
            .iter()
            .map(|n| double(n.threshold, || format!("threshold of neuron {}", n.index)))
            .collect::<Result<Vec<_>>>()?;

        let w = &mut self.w;
        w.line("/* Topology */");
        if CarryOver::for_layout(self.layout) == CarryOver::NonLeaking {
            w.line(&format!(
                "static const unsigned char neuron_leak[NUM_NEURONS] = {};",
                c_initializer(neurons.iter().map(|n| c_flag(n.leak).to_string()))
            ));
        }
        w.line(&format!(
            "static const unsigned int neuron_outgoing[NUM_NEURONS] = {};",
            c_initializer(neurons.iter().map(|n| n.fan_out().to_string()))
        ));
        w.line(&format!(
            "static const double neuron_threshold[NUM_NEURONS] = {};",
            c_initializer(thresholds)
        ));
        w.blank();

        w.line("/* Fire tracking for the most recent run() */");
        w.line("static unsigned int neuron_fire_count[NUM_NEURONS] = {0};");
        w.line(&format!(
            "static int neuron_last_fire[NUM_NEURONS] = {};",
            c_initializer(neurons.iter().map(|_| "-1".to_string()))
        ));
        w.line("static unsigned int neuron_fire_times[NUM_NEURONS][MAX_NUM_TIMESTEPS] = {{0}};");
        w.blank();

        w.line("/* Charge and activity per ring slot; slot current_timestep % MAX_NUM_TIMESTEPS is next */");
        w.line("static double neuron_charge_buffer[MAX_NUM_TIMESTEPS][NUM_NEURONS] = {{0}};");
        w.line("static unsigned char neuron_active[MAX_NUM_TIMESTEPS][NUM_NEURONS] = {{0}};");
        w.line("static unsigned long current_timestep = 0;");
        w.blank();
        Ok(())
    }

    fn emit_synapse_arrays(&mut self) -> Result<()> {
        let mut to = Vec::new();
        let mut delay = Vec::new();
        let mut weight = Vec::new();
        for n in self.network.neurons() {
            to.push(c_initializer(n.outgoing.iter().map(|s| s.target_index.to_string())));
            delay.push(c_initializer(n.outgoing.iter().map(|s| s.effective_delay().to_string())));
            let weights = n
                .outgoing
                .iter()
                .enumerate()
                .map(|(j, s)| double(s.weight, || format!("weight of synapse {} of neuron {}", j, n.index)))
                .collect::<Result<Vec<_>>>()?;
            weight.push(c_initializer(weights));
        }

        let w = &mut self.w;
        w.line("/* Outgoing synapses, row per source neuron */");
        for (ty, name, rows) in [
            ("unsigned int", "synapse_to", to),
            ("unsigned int", "synapse_delay", delay),
            ("double", "synapse_weight", weight),
        ] {
            w.line(&format!(
                "static const {} {}[NUM_NEURONS][OUTGOING_CAPACITY] = {};",
                ty,
                name,
                c_initializer(rows)
            ));
        }
        w.blank();
        Ok(())
    }

    fn emit_apply_spike(&mut self) {
        self.w.line("/* Add value * SPIKE_VALUE_FACTOR to input neuron input_ind, time timesteps from now. */");
        self.w.block("void apply_spike(unsigned int input_ind, unsigned int time, double value)", |w| {
            w.line("unsigned int slot;");
            w.line("unsigned int neuron;");
            w.blank();
            w.line("/* Out-of-range ports and times are ignored */");
            w.block("if (input_ind >= NUM_INPUT_NEURONS)", |w| {
                w.line("return;");
            });
            w.block("if (time >= MAX_NUM_TIMESTEPS)", |w| {
                w.line("return;");
            });
            w.blank();
            w.line("slot = (unsigned int)((current_timestep + time) % MAX_NUM_TIMESTEPS);");
            w.line("neuron = INPUT_IND_TO_NEURON_IND[input_ind];");
            w.line("neuron_charge_buffer[slot][neuron] += value * SPIKE_VALUE_FACTOR;");
            w.line("neuron_active[slot][neuron] = 1;");
        });
    }

    fn emit_run(&mut self) {
        let config = *self.config;
        let carry = CarryOver::for_layout(self.layout);

        self.w.line("/* Simulate duration timesteps. Every neuron is visited every timestep. */");
        self.w.block("void run(double duration)", |w| {
            w.line("unsigned int time;");
            w.line("unsigned int i;");
            w.line("unsigned int j;");
            w.line("unsigned int run_time;");
            w.line("unsigned int slot;");
            w.line("unsigned int to_slot;");
            w.blank();
            w.line("/* Fire tracking covers the most recent run only */");
            w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                w.line("neuron_last_fire[i] = -1;");
                w.line("neuron_fire_count[i] = 0;");
            });
            w.blank();
            emit_run_time_guard(w, &config);

            w.block("for (time = 0; time <= run_time; time++)", |w| {
                w.line("slot = (unsigned int)((current_timestep + time) % MAX_NUM_TIMESTEPS);");
                w.blank();
                w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                    w.block("if (neuron_charge_buffer[slot][i] < MIN_POTENTIAL)", |w| {
                        w.line("neuron_charge_buffer[slot][i] = MIN_POTENTIAL;");
                    });
                    w.blank();
                    w.write(&format!(
                        "if (neuron_active[slot][i] && neuron_charge_buffer[slot][i] {} neuron_threshold[i]) {{\n",
                        config.threshold_operator()
                    ));
                    w.with_indent(CodeWriter::INDENT as isize, emit_fire);
                    let otherwise = match carry {
                        CarryOver::None => None,
                        CarryOver::All => Some("} else {"),
                        CarryOver::NonLeaking => Some("} else if (!neuron_leak[i]) {"),
                    };
                    if let Some(header) = otherwise {
                        w.line(header);
                        w.with_indent(CodeWriter::INDENT as isize, |w| {
                            w.line("/* Did not fire: carry charge over */");
                            w.line("neuron_charge_buffer[(slot + 1) % MAX_NUM_TIMESTEPS][i] += neuron_charge_buffer[slot][i];");
                        });
                    }
                    w.line("}");
                });
                w.blank();
                w.line("/* Retire this timestep's slot */");
                w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                    w.line("neuron_charge_buffer[slot][i] = 0;");
                    w.line("neuron_active[slot][i] = 0;");
                });
            });
            w.blank();

            let advance = if config.run_time_inclusive {
                "duration + 1"
            } else {
                "duration"
            };
            w.line(&format!(
                "current_timestep = (unsigned long)(current_timestep + {});",
                advance
            ));
        });
    }

    fn emit_clear_activity(&mut self) {
        self.w.line("/* Drop all activity: fire tracking, charge and pending activity. */");
        self.w.block("void clear_activity(void)", |w| {
            w.line("unsigned int i;");
            w.line("unsigned int j;");
            w.blank();
            w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                w.line("neuron_last_fire[i] = -1;");
                w.line("neuron_fire_count[i] = 0;");
            });
            w.blank();
            w.block("for (i = 0; i < MAX_NUM_TIMESTEPS; i++)", |w| {
                w.block("for (j = 0; j < NUM_NEURONS; j++)", |w| {
                    w.line("neuron_charge_buffer[i][j] = 0;");
                    w.line("neuron_active[i][j] = 0;");
                });
            });
        });
    }
}

fn emit_fire(w: &mut CodeWriter) {
    w.block("for (j = 0; j < neuron_outgoing[i]; j++)", |w| {
        w.line("to_slot = (slot + synapse_delay[i][j]) % MAX_NUM_TIMESTEPS;");
        w.line("neuron_charge_buffer[to_slot][synapse_to[i][j]] += synapse_weight[i][j];");
        w.line("neuron_active[to_slot][synapse_to[i][j]] = 1;");
    });
    w.blank();
    w.block("if (neuron_fire_count[i] < MAX_NUM_TIMESTEPS)", |w| {
        w.line("neuron_fire_times[i][neuron_fire_count[i]] = time;");
    });
    w.line("neuron_last_fire[i] = (int)time;");
    w.line("neuron_fire_count[i]++;");
}
