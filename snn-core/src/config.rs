//! Global simulation-semantics flags, resolved once per network.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Multiplier applied to every externally injected spike amplitude.
    pub spike_value_factor: f64,
    /// Floor clamp applied to charge.
    pub min_potential: f64,
    /// Whether `run(duration)` also processes timestep `duration`.
    pub run_time_inclusive: bool,
    /// `>=` instead of `>` for the firing test.
    pub threshold_inclusive: bool,
    /// Fire one timestep after crossing threshold. Event-driven kernel only.
    pub fire_like_ravens: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            spike_value_factor: 1.0,
            min_potential: 0.0,
            run_time_inclusive: false,
            threshold_inclusive: true,
            fire_like_ravens: false,
        }
    }
}

impl NetworkConfig {
    /// Firing test shared by every kernel.
    #[inline]
    pub fn fires(&self, charge: f64, threshold: f64) -> bool {
        if self.threshold_inclusive {
            charge >= threshold
        } else {
            charge > threshold
        }
    }

    /// C comparison operator matching [`NetworkConfig::fires`].
    pub fn threshold_operator(&self) -> &'static str {
        if self.threshold_inclusive {
            ">="
        } else {
            ">"
        }
    }
}
