//! Log-spaced parameter sweeps for the RBF bandwidth

use crate::core::{GramError, Result, SweepConfig};

/// Upper bound on the number of values a single sweep may produce
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

/// Generate `base^v` for `v = start, start + step, ..` while `v < stop + step`
///
/// The last exponent may exceed `stop` by less than one step. Exponents are
/// computed as `start + k * step` so rounding does not accumulate.
///
/// A non-positive `step` is rejected unless the range is already empty
/// (`start >= stop`), in which case the sweep is empty.
pub fn logrange(start: f64, stop: f64, step: f64, base: f64) -> Result<Vec<f64>> {
    if !step.is_finite() {
        return Err(GramError::InvalidParameter(format!(
            "sweep step must be finite, got: {step}"
        )));
    }

    if step <= 0.0 {
        if start < stop {
            return Err(GramError::InvalidParameter(format!(
                "sweep step must be positive, got: {step}"
            )));
        }
        return Ok(Vec::new());
    }

    let end = stop + step;
    let span = (end - start) / step;
    if span > MAX_SWEEP_POINTS as f64 {
        return Err(GramError::InvalidParameter(format!(
            "sweep from {start} to {stop} with step {step} exceeds {MAX_SWEEP_POINTS} values"
        )));
    }

    let mut values = Vec::new();
    let mut k = 0usize;
    loop {
        let v = start + k as f64 * step;
        if !(v < end) {
            break;
        }
        values.push(base.powf(v));
        k += 1;
    }

    Ok(values)
}

impl SweepConfig {
    /// Create a sweep over `[start, stop]` with the default base
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self {
            start,
            stop,
            step,
            ..Self::default()
        }
    }

    /// Gamma values of this sweep, in ascending exponent order
    pub fn gammas(&self) -> Result<Vec<f64>> {
        logrange(self.start, self.stop, self.step, self.base)
    }
}
