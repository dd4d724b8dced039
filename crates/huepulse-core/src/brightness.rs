//! Amplitude to brightness mapping.
//!
//! Amplitude is normalized against a 0.5 knee (anything louder saturates),
//! shaped with a power curve so low amplitudes ramp up slowly, and low-pass
//! filtered with a deliberately slower filter than the color path.

use crate::smoothing::LowPass;

/// Floor brightness; the lights never go fully dark while streaming.
pub const MIN_BRIGHTNESS: u16 = 10_000;
/// Full-scale 16-bit brightness.
pub const MAX_BRIGHTNESS: u16 = 65_535;

/// Amplitudes at or above this value map to full scale.
const AMPLITUDE_KNEE: f64 = 0.5;
/// Power-curve exponent biasing perceived brightness toward a natural ramp.
const CURVE_EXPONENT: f64 = 3.5;
/// Smoothing factor for the brightness filter (slower than chromaticity).
const BRIGHTNESS_ALPHA: f64 = 0.1;

/// Maps amplitude to a smoothed 16-bit brightness value.
///
/// Owns the persistent brightness filter state, independent from the
/// chromaticity filter; created once at session start and never reset.
#[derive(Debug)]
pub struct BrightnessMapper {
    level: LowPass,
}

impl BrightnessMapper {
    /// Create a mapper with the filter resting at the minimum brightness.
    pub fn new() -> Self {
        Self {
            level: LowPass::new(f64::from(MIN_BRIGHTNESS), BRIGHTNESS_ALPHA),
        }
    }

    /// Map an amplitude to a smoothed brightness in [MIN_BRIGHTNESS, 65535].
    pub fn map(&mut self, amplitude: f64) -> u16 {
        let normalized = (amplitude / AMPLITUDE_KNEE).clamp(0.0, 1.0);
        let target = normalized.powf(CURVE_EXPONENT)
            * f64::from(MAX_BRIGHTNESS - MIN_BRIGHTNESS)
            + f64::from(MIN_BRIGHTNESS);
        self.level.update(target).floor() as u16
    }
}

impl Default for BrightnessMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amplitude_holds_minimum_brightness() {
        // Target and filter state both sit at MIN_BRIGHTNESS, so the output
        // is exactly the floor.
        let mut mapper = BrightnessMapper::new();
        assert_eq!(mapper.map(0.0), MIN_BRIGHTNESS);
        assert_eq!(mapper.map(0.0), MIN_BRIGHTNESS);
    }

    #[test]
    fn test_amplitude_at_knee_saturates_normalization() {
        // 0.5 and anything louder produce the same full-scale target.
        let mut at_knee = BrightnessMapper::new();
        let mut above_knee = BrightnessMapper::new();
        assert_eq!(at_knee.map(0.5), above_knee.map(3.0));
    }

    #[test]
    fn test_full_amplitude_first_step() {
        // Full-scale target, one smoothing step from MIN_BRIGHTNESS.
        let mut mapper = BrightnessMapper::new();
        let expected = f64::from(MIN_BRIGHTNESS) * 0.9 + f64::from(MAX_BRIGHTNESS) * 0.1;
        assert_eq!(mapper.map(1.0), expected.floor() as u16);
    }

    #[test]
    fn test_quarter_amplitude_target() {
        // amplitude 0.25 -> normalized 0.5 -> 0.5^3.5 of the brightness span.
        let mut mapper = BrightnessMapper::new();
        let target = 0.5f64.powf(3.5) * f64::from(MAX_BRIGHTNESS - MIN_BRIGHTNESS)
            + f64::from(MIN_BRIGHTNESS);
        let expected = f64::from(MIN_BRIGHTNESS) * 0.9 + target * 0.1;
        assert_eq!(mapper.map(0.25), expected.floor() as u16);
    }

    #[test]
    fn test_negative_amplitude_clamps_to_floor() {
        let mut mapper = BrightnessMapper::new();
        assert_eq!(mapper.map(-1.0), MIN_BRIGHTNESS);
    }

    #[test]
    fn test_output_stays_in_range_under_sustained_input() {
        let mut mapper = BrightnessMapper::new();
        for _ in 0..1000 {
            let out = mapper.map(1.0);
            assert!(out >= MIN_BRIGHTNESS);
        }
        // Converged close to full scale but never past it.
        let settled = mapper.map(1.0);
        assert!(settled <= MAX_BRIGHTNESS);
        assert!(settled > MAX_BRIGHTNESS - 10);
    }
}
