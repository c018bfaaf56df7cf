//! Runtime contract shared by every compiled kernel.

use crate::backend::Backend;

/// The entry points of a generated kernel, as an owned host-side value.
///
/// Out-of-range ports and times are never errors: `apply_spike` ignores them and the
/// output queries return `-1` / `0`. Output queries report the most recent `run` only.
pub trait Kernel {
    /// Inject `value` (scaled by `spike_value_factor`) into input port `input_index`,
    /// `time` ticks after the current timestep.
    fn apply_spike(&mut self, input_index: u32, time: u32, value: f64);

    /// Simulate `duration` timesteps (one more when `run_time_inclusive`).
    fn run(&mut self, duration: f64);

    /// Reset fire tracking, charge and every pending event. Topology and thresholds stay.
    fn clear_activity(&mut self);

    fn output_last_fire(&self, output_index: u32) -> f64;

    fn output_count(&self, output_index: u32) -> u32;

    fn backend(&self) -> Backend;
}
