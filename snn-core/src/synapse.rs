//! Outgoing synapse with a resolved target index.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynapseSpec {
    pub target_index: u32,
    pub delay: u32, // ticks
    pub weight: f64,
}

impl SynapseSpec {
    pub fn new(target_index: u32, delay: u32, weight: f64) -> Self {
        Self {
            target_index,
            delay,
            weight,
        }
    }

    /// Delay the generated kernels schedule with.
    ///
    /// A zero-delay effect would land in the slot currently being consumed and be cleared
    /// with it, so it is delivered on the next tick instead.
    #[inline]
    pub fn effective_delay(&self) -> u32 {
        self.delay.max(1)
    }
}
