//! Compile-time constants every generated kernel is sized from.

use crate::ir::Network;

/// Smallest ring horizon; a one-slot ring would make every delayed effect land on the
/// slot being consumed.
pub const MIN_TIMESTEPS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelLayout {
    pub num_neurons: usize,
    pub num_inputs: usize,
    pub num_outputs: usize,
    /// Total synapse count; also the per-slot event capacity of the event-driven kernel.
    pub num_synapses: usize,
    pub max_outgoing: usize,
    /// Ring horizon: `max(horizon, max_delay + 1, MIN_TIMESTEPS)`.
    pub max_num_timesteps: usize,
    pub has_leak: bool,
    pub all_leak: bool,
}

impl KernelLayout {
    /// Resolve the layout of `network` for a caller-declared simulation horizon.
    ///
    /// `None` and `Some(0)` both mean "no horizon declared".
    pub fn resolve(network: &Network, horizon: Option<u32>) -> Self {
        let declared = horizon.unwrap_or(0) as usize;
        let by_delay = network.max_delay().map_or(0, |d| d as usize + 1);

        Self {
            num_neurons: network.num_neurons(),
            num_inputs: network.num_inputs(),
            num_outputs: network.num_outputs(),
            num_synapses: network.num_synapses(),
            max_outgoing: network.max_outgoing(),
            max_num_timesteps: declared.max(by_delay).max(MIN_TIMESTEPS),
            has_leak: network.has_leak(),
            all_leak: network.all_leak(),
        }
    }

    /// Ring slot `offset` ticks after `base`.
    #[inline]
    pub fn slot(&self, base: u64, offset: u64) -> usize {
        (base.wrapping_add(offset) % self.max_num_timesteps as u64) as usize
    }

    /// Row width of fixed-width outgoing tables; C has no zero-length arrays.
    #[inline]
    pub fn outgoing_capacity(&self) -> usize {
        self.max_outgoing.max(1)
    }
}

/// Last timestep processed by `run(duration)`, or `None` when the run is empty.
///
/// Mirrors the generated C: the negativity test happens on the double, then the value is
/// truncated toward zero.
pub fn run_time(duration: f64, inclusive: bool) -> Option<u32> {
    let last = if inclusive { duration } else { duration - 1.0 };
    if last < 0.0 {
        None
    } else {
        Some(last as u32)
    }
}
