//! Exponential moving average (low-pass) filter.
//!
//! Both mappers keep their own filter state across events so that rapid
//! target changes turn into gradual visual transitions. The state lives for
//! the whole session and is mutated exactly once per event; it is owned by
//! the mappers instead of hiding in module-level globals so the pipeline can
//! be tested in isolation.

/// A single-value low-pass filter: `state = state * (1 - alpha) + target * alpha`.
///
/// Invariant: `alpha` is in (0, 1]. Lower values track the target more
/// slowly; the state converges toward a constant target but never reaches
/// it in finitely many steps.
#[derive(Debug, Clone)]
pub struct LowPass {
    current: f64,
    alpha: f64,
}

impl LowPass {
    /// Create a filter with the given initial state and smoothing factor.
    pub fn new(initial: f64, alpha: f64) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha must be in (0, 1]");
        Self {
            current: initial,
            alpha,
        }
    }

    /// Advance the filter toward `target` and return the new state.
    pub fn update(&mut self, target: f64) -> f64 {
        self.current = self.current * (1.0 - self.alpha) + target * self.alpha;
        self.current
    }

    /// The current state without advancing the filter.
    pub fn value(&self) -> f64 {
        self.current
    }
}
