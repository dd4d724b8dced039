//! Frequency to chromaticity mapping.
//!
//! The fundamental frequency of the incoming audio picks a point on a
//! piecewise-linear path through three anchor chromaticities (low, mid,
//! high band). The raw interpolation target is then low-pass filtered so
//! the lights glide between colors instead of jumping.

use crate::color::{ChromaticityPoint, ColorAnchor};
use crate::smoothing::LowPass;

/// Smoothing factor for the chromaticity filter.
const CHROMA_ALPHA: f64 = 0.16;

/// Initial filter state: a warm point near the middle of the gamut, so the
/// first transition starts from something visually unobtrusive.
const INITIAL_XY: (f64, f64) = (0.5, 0.3);

/// The frequency band the mapper interpolates over, in Hz.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyRange {
    /// Lower clamp bound; frequencies below map to the low anchor.
    pub min: f64,
    /// Crossover between the low->mid and mid->high segments.
    pub mid: f64,
    /// Upper clamp bound; frequencies above map to the high anchor.
    pub max: f64,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self {
            min: 80.0,
            mid: 200.0,
            max: 500.0,
        }
    }
}

/// Maps a frequency and three color anchors to a smoothed xy target.
///
/// Owns the persistent chromaticity filter state: created once at session
/// start, mutated on every mapped event, never reset mid-session.
#[derive(Debug)]
pub struct ChromaticityMapper {
    range: FrequencyRange,
    x: LowPass,
    y: LowPass,
}

impl ChromaticityMapper {
    /// Create a mapper over the given frequency range.
    pub fn new(range: FrequencyRange) -> Self {
        Self {
            range,
            x: LowPass::new(INITIAL_XY.0, CHROMA_ALPHA),
            y: LowPass::new(INITIAL_XY.1, CHROMA_ALPHA),
        }
    }

    /// Map a frequency to a smoothed chromaticity point.
    ///
    /// The frequency is clamped into the configured range, the anchors are
    /// converted to xy, and the target is interpolated on the low->mid
    /// segment for `freq <= mid` (so the exact mid frequency resolves there
    /// with ratio 1.0) or the mid->high segment otherwise.
    pub fn map(
        &mut self,
        frequency: f64,
        low: &ColorAnchor,
        mid: &ColorAnchor,
        high: &ColorAnchor,
    ) -> ChromaticityPoint {
        let freq = frequency.clamp(self.range.min, self.range.max);

        let low_xy = low.to_chromaticity();
        let mid_xy = mid.to_chromaticity();
        let high_xy = high.to_chromaticity();

        let target = if freq <= self.range.mid {
            let ratio = (freq - self.range.min) / (self.range.mid - self.range.min);
            lerp_xy(low_xy, mid_xy, ratio)
        } else {
            let ratio = (freq - self.range.mid) / (self.range.max - self.range.mid);
            lerp_xy(mid_xy, high_xy, ratio)
        };

        ChromaticityPoint {
            x: self.x.update(target.x),
            y: self.y.update(target.y),
        }
    }

    /// The configured frequency range.
    pub fn range(&self) -> FrequencyRange {
        self.range
    }
}

impl Default for ChromaticityMapper {
    fn default() -> Self {
        Self::new(FrequencyRange::default())
    }
}

fn lerp(start: f64, end: f64, ratio: f64) -> f64 {
    start + ratio * (end - start)
}

fn lerp_xy(start: ChromaticityPoint, end: ChromaticityPoint, ratio: f64) -> ChromaticityPoint {
    ChromaticityPoint {
        x: lerp(start.x, end.x, ratio),
        y: lerp(start.y, end.y, ratio),
    }
}
