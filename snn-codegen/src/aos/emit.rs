//! C emission for the event-driven kernel.

use snn_core::{c_flag, c_initializer, CodeWriter, KernelLayout, Network, NetworkConfig, NeuronSpec};
use tracing::{trace, warn};

use crate::common::{double, emit_banner, emit_defines, emit_output_queries, emit_port_tables, emit_run_time_guard};
use crate::error::Result;

/// Generate the complete event-driven kernel for `network`.
pub fn emit(network: &Network, layout: &KernelLayout) -> Result<String> {
    if layout.num_synapses == 0 {
        warn!("network has no synapses: event slots have zero capacity and every injected spike will be dropped");
    }

    let mut ctx = AosEmitter {
        network,
        layout,
        config: network.config(),
        w: CodeWriter::new(),
    };
    ctx.emit_all()?;
    Ok(ctx.w.finish())
}

struct AosEmitter<'a> {
    network: &'a Network,
    layout: &'a KernelLayout,
    config: &'a NetworkConfig,
    w: CodeWriter,
}

impl<'a> AosEmitter<'a> {
    fn emit_all(&mut self) -> Result<()> {
        emit_banner(&mut self.w, "SNN kernel: event-driven ring buffer (AoS)");
        emit_defines(&mut self.w, self.layout, self.config)?;
        self.emit_types();
        emit_port_tables(&mut self.w, self.network);
        self.emit_state()?;

        trace!("emitting apply_spike");
        self.emit_apply_spike();
        self.w.blank();
        trace!("emitting run");
        self.emit_run();
        self.w.blank();
        trace!("emitting clear_activity");
        self.emit_clear_activity();
        self.w.blank();
        emit_output_queries(&mut self.w, |neuron, field| format!("neurons[{}].{}", neuron, field));
        Ok(())
    }

    fn emit_types(&mut self) {
        self.w.write(
            "/* Outgoing synapse */
typedef struct {
    unsigned int to;    /* target neuron index */
    unsigned int delay; /* timesteps until the charge lands */
    double weight;
} Synapse;

/* Neuron record; check marks a neuron touched by an event in the current timestep */
typedef struct {
    unsigned char leak;
    unsigned char check;
    unsigned int num_outgoing;
    unsigned int fire_count;
    int last_fire;
    double charge;
    double threshold;
    Synapse outgoing[OUTGOING_CAPACITY];
    unsigned int fire_times[MAX_NUM_TIMESTEPS];
} Neuron;

/* Pending charge change for one neuron */
typedef struct {
    unsigned int neuron_ind;
    double charge_change;
} Charge_Change_Event;

",
        );
    }

    fn emit_state(&mut self) -> Result<()> {
        let w = &mut self.w;
        w.line("/* One bounded event list per timestep; at most NUM_SYNAPSES events per slot */");
        w.line("#define EVENT_CAPACITY (NUM_SYNAPSES > 0 ? NUM_SYNAPSES : 1)");
        w.blank();
        w.line("static unsigned int event_count[MAX_NUM_TIMESTEPS] = {0};");
        w.line("/* Slot holding the events of the upcoming timestep */");
        w.line("static unsigned int cur_charge_changes_ind = 0;");
        w.line("static Charge_Change_Event charge_changes[MAX_NUM_TIMESTEPS][EVENT_CAPACITY];");
        if self.config.fire_like_ravens {
            w.line("/* Neurons that fire at the start of the upcoming timestep */");
            w.line("static unsigned int to_fire[NUM_NEURONS];");
            w.line("static unsigned int to_fire_count = 0;");
        }
        w.blank();

        let records = self
            .network
            .neurons()
            .iter()
            .map(neuron_record)
            .collect::<Result<Vec<_>>>()?;

        let w = &mut self.w;
        w.line("static Neuron neurons[NUM_NEURONS] = {");
        w.with_indent(4, |w| {
            w.write(&records.join(",\n"));
            w.blank();
        });
        w.line("};");
        w.blank();
        Ok(())
    }

    fn emit_apply_spike(&mut self) {
        self.w.line("/* Schedule value * SPIKE_VALUE_FACTOR on input neuron input_ind, time timesteps from now. */");
        self.w.block("void apply_spike(unsigned int input_ind, unsigned int time, double value)", |w| {
            w.line("unsigned int slot;");
            w.blank();
            w.line("/* Out-of-range ports and times are ignored */");
            w.block("if (input_ind >= NUM_INPUT_NEURONS)", |w| {
                w.line("return;");
            });
            w.block("if (time >= MAX_NUM_TIMESTEPS)", |w| {
                w.line("return;");
            });
            w.blank();
            w.line("slot = (cur_charge_changes_ind + time) % MAX_NUM_TIMESTEPS;");
            w.blank();
            w.line("/* A full slot drops the event */");
            w.block("if (event_count[slot] < NUM_SYNAPSES)", |w| {
                w.line("charge_changes[slot][event_count[slot]].neuron_ind = INPUT_IND_TO_NEURON_IND[input_ind];");
                w.line("charge_changes[slot][event_count[slot]].charge_change = value * SPIKE_VALUE_FACTOR;");
                w.line("event_count[slot]++;");
            });
        });
    }

    fn emit_run(&mut self) {
        let config = *self.config;
        let has_leak = self.layout.has_leak;

        self.w.line("/* Simulate duration timesteps. Only neurons with pending events are processed. */");
        self.w.block("void run(double duration)", |w| {
            w.line("unsigned int time;");
            w.line("unsigned int i;");
            w.line("unsigned int j;");
            w.line("unsigned int run_time;");
            w.line("unsigned int cur_neuron_ind;");
            w.line("unsigned int to_time;");
            w.line("Neuron *n;");
            w.blank();
            w.line("/* Fire tracking covers the most recent run only */");
            w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                w.line("neurons[i].last_fire = -1;");
                w.line("neurons[i].fire_count = 0;");
            });
            w.blank();
            emit_run_time_guard(w, &config);

            w.block("for (time = 0; time <= run_time; time++)", |w| {
                if config.fire_like_ravens {
                    w.line("/* Fires decided during the previous timestep take effect now */");
                    w.block("for (i = 0; i < to_fire_count; i++)", |w| {
                        w.line("n = &neurons[to_fire[i]];");
                        emit_record_fire(w);
                    });
                    w.line("to_fire_count = 0;");
                    w.blank();
                }

                w.line(if has_leak {
                    "/* Leak and floor the neurons with pending events */"
                } else {
                    "/* Floor the neurons with pending events */"
                });
                w.block("for (i = 0; i < event_count[cur_charge_changes_ind]; i++)", |w| {
                    emit_current_neuron(w);
                    emit_settle(w, "n->", has_leak);
                });
                w.blank();

                w.line("/* Collect charge changes */");
                w.block("for (i = 0; i < event_count[cur_charge_changes_ind]; i++)", |w| {
                    emit_current_neuron(w);
                    w.line("n->check = 1;");
                    w.line("n->charge += charge_changes[cur_charge_changes_ind][i].charge_change;");
                });
                w.blank();

                w.line("/* Fire test, once per touched neuron */");
                w.block("for (i = 0; i < event_count[cur_charge_changes_ind]; i++)", |w| {
                    emit_current_neuron(w);
                    w.block("if (n->check)", |w| {
                        w.block(
                            &format!("if (n->charge {} n->threshold)", config.threshold_operator()),
                            |w| {
                                emit_propagate(w);
                                w.blank();
                                if config.fire_like_ravens {
                                    w.line("to_fire[to_fire_count] = cur_neuron_ind;");
                                    w.line("to_fire_count++;");
                                } else {
                                    emit_record_fire(w);
                                }
                            },
                        );
                        w.line("n->check = 0;");
                    });
                });
                w.blank();

                w.line("/* Retire this timestep's slot */");
                w.line("event_count[cur_charge_changes_ind] = 0;");
                w.line("cur_charge_changes_ind = (cur_charge_changes_ind + 1) % MAX_NUM_TIMESTEPS;");
            });
            w.blank();

            w.line(if has_leak {
                "/* Leak and floor every neuron before the next run */"
            } else {
                "/* Floor every neuron before the next run */"
            });
            w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                emit_settle(w, "neurons[i].", has_leak);
            });
        });
    }

    fn emit_clear_activity(&mut self) {
        let ravens = self.config.fire_like_ravens;

        self.w.line("/* Drop all activity: fire tracking, charge and pending events. */");
        self.w.block("void clear_activity(void)", |w| {
            w.line("unsigned int i;");
            w.blank();
            w.block("for (i = 0; i < NUM_NEURONS; i++)", |w| {
                w.line("neurons[i].last_fire = -1;");
                w.line("neurons[i].fire_count = 0;");
                w.line("neurons[i].charge = 0;");
            });
            w.blank();
            w.block("for (i = 0; i < MAX_NUM_TIMESTEPS; i++)", |w| {
                w.line("event_count[i] = 0;");
            });
            if ravens {
                w.line("to_fire_count = 0;");
            }
        });
    }
}

/// `{leak, check, num_outgoing, fire_count, last_fire, charge, threshold, outgoing, fire_times}`
fn neuron_record(neuron: &NeuronSpec) -> Result<String> {
    let threshold = double(neuron.threshold, || format!("threshold of neuron {}", neuron.index))?;
    let outgoing = neuron
        .outgoing
        .iter()
        .enumerate()
        .map(|(j, syn)| {
            let weight = double(syn.weight, || format!("weight of synapse {} of neuron {}", j, neuron.index))?;
            Ok(format!("{{{}, {}, {}}}", syn.target_index, syn.effective_delay(), weight))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "{{{}, 0, {}, 0, -1, 0.0, {}, {}, {{0}}}}",
        c_flag(neuron.leak),
        neuron.fan_out(),
        threshold,
        c_initializer(outgoing)
    ))
}

fn emit_current_neuron(w: &mut CodeWriter) {
    w.line("cur_neuron_ind = charge_changes[cur_charge_changes_ind][i].neuron_ind;");
    w.line("n = &neurons[cur_neuron_ind];");
}

/// Leak (when any neuron leaks) then floor; `target` prefixes the field names.
fn emit_settle(w: &mut CodeWriter, target: &str, has_leak: bool) {
    if has_leak {
        w.block(&format!("if ({}leak)", target), |w| {
            w.line(&format!("{}charge = 0;", target));
        });
    }
    w.block(&format!("if ({}charge < MIN_POTENTIAL)", target), |w| {
        w.line(&format!("{}charge = MIN_POTENTIAL;", target));
    });
}

fn emit_propagate(w: &mut CodeWriter) {
    w.block("for (j = 0; j < n->num_outgoing; j++)", |w| {
        w.line("to_time = (cur_charge_changes_ind + n->outgoing[j].delay) % MAX_NUM_TIMESTEPS;");
        w.block("if (event_count[to_time] < NUM_SYNAPSES)", |w| {
            w.line("charge_changes[to_time][event_count[to_time]].neuron_ind = n->outgoing[j].to;");
            w.line("charge_changes[to_time][event_count[to_time]].charge_change = n->outgoing[j].weight;");
            w.line("event_count[to_time]++;");
        });
    });
}

fn emit_record_fire(w: &mut CodeWriter) {
    w.block("if (n->fire_count < MAX_NUM_TIMESTEPS)", |w| {
        w.line("n->fire_times[n->fire_count] = time;");
    });
    w.line("n->last_fire = (int)time;");
    w.line("n->fire_count++;");
    w.line("n->charge = 0;");
}
