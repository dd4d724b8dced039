//! sRGB color to CIE xy chromaticity conversion.
//!
//! Hue Entertainment streams colors as CIE 1931 xy coordinates plus
//! brightness, so RGB anchor colors have to be gamma-decoded to linear
//! light, transformed into XYZ, and projected down to the chromaticity
//! plane before they can go on the wire.

use serde::{Deserialize, Serialize};

/// Threshold below which the sRGB transfer function is linear.
const SRGB_LINEAR_THRESHOLD: f64 = 0.04045;
/// Scale factor of the non-linear sRGB segment.
const SRGB_NONLINEAR_SCALE: f64 = 1.055;
/// Divisor of the linear sRGB segment.
const SRGB_LINEAR_DIVISOR: f64 = 12.92;
/// Exponent of the non-linear sRGB segment.
const SRGB_GAMMA: f64 = 2.4;

// Linear RGB -> XYZ coefficients for the Hue color pipeline
// (rows: contribution of R/G/B to X, Y, Z).
const RGB_TO_X: [f64; 3] = [0.664511, 0.154324, 0.162028];
const RGB_TO_Y: [f64; 3] = [0.283881, 0.668433, 0.047685];
const RGB_TO_Z: [f64; 3] = [0.000088, 0.072310, 0.986039];

/// A reference RGB color for one frequency band, channels nominally in [0, 1].
///
/// Values outside the range are clamped during conversion, so anchors coming
/// from untrusted UI sliders do not need pre-validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAnchor(pub [f64; 3]);

/// A CIE 1931 xy chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChromaticityPoint {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
}

impl ColorAnchor {
    /// Neutral gray, substituted when an event carries no usable anchor.
    pub const NEUTRAL: ColorAnchor = ColorAnchor([0.5, 0.5, 0.5]);

    /// Create an anchor from RGB channel values.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Convert this anchor to CIE xy chromaticity.
    ///
    /// Channels are clamped to [0, 1], gamma-decoded to linear light,
    /// combined into XYZ and projected to xy. Pure black has no defined
    /// chromaticity; it maps to (0, 0) instead of NaN.
    pub fn to_chromaticity(&self) -> ChromaticityPoint {
        let [r, g, b] = self.0;
        let r = gamma_decode(r.clamp(0.0, 1.0));
        let g = gamma_decode(g.clamp(0.0, 1.0));
        let b = gamma_decode(b.clamp(0.0, 1.0));

        let x_big = r * RGB_TO_X[0] + g * RGB_TO_X[1] + b * RGB_TO_X[2];
        let y_big = r * RGB_TO_Y[0] + g * RGB_TO_Y[1] + b * RGB_TO_Y[2];
        let z_big = r * RGB_TO_Z[0] + g * RGB_TO_Z[1] + b * RGB_TO_Z[2];

        let sum = x_big + y_big + z_big;
        if sum == 0.0 {
            return ChromaticityPoint { x: 0.0, y: 0.0 };
        }

        ChromaticityPoint {
            x: x_big / sum,
            y: y_big / sum,
        }
    }
}

/// Decode one sRGB channel to linear light.
///
/// sRGB stores dark values on a linear segment and the rest on a power
/// curve; both branches must be reproduced for the XYZ transform to hold.
fn gamma_decode(channel: f64) -> f64 {
    if channel > SRGB_LINEAR_THRESHOLD {
        ((channel + (SRGB_NONLINEAR_SCALE - 1.0)) / SRGB_NONLINEAR_SCALE).powf(SRGB_GAMMA)
    } else {
        channel / SRGB_LINEAR_DIVISOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_black_maps_to_origin() {
        let xy = ColorAnchor::new(0.0, 0.0, 0.0).to_chromaticity();
        assert_eq!(xy.x, 0.0);
        assert_eq!(xy.y, 0.0);
    }

    #[test]
    fn test_pure_green_chromaticity() {
        // Full green decodes to linear 1.0, so xy comes straight from the
        // green column of the matrix.
        let xy = ColorAnchor::new(0.0, 1.0, 0.0).to_chromaticity();
        let sum = 0.154324 + 0.668433 + 0.072310;
        assert!((xy.x - 0.154324 / sum).abs() < 1e-12);
        assert!((xy.y - 0.668433 / sum).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_uses_nonlinear_branch_above_threshold() {
        let expected = ((0.5 + 0.055) / 1.055f64).powf(2.4);
        assert!((gamma_decode(0.5) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_uses_linear_branch_below_threshold() {
        assert!((gamma_decode(0.01) - 0.01 / 12.92).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_continuity_at_threshold() {
        let below = gamma_decode(SRGB_LINEAR_THRESHOLD);
        let above = gamma_decode(SRGB_LINEAR_THRESHOLD + 1e-9);
        assert!((below - above).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_channels_are_clamped() {
        let clamped = ColorAnchor::new(2.0, -1.0, 0.5).to_chromaticity();
        let reference = ColorAnchor::new(1.0, 0.0, 0.5).to_chromaticity();
        assert_eq!(clamped, reference);
    }

    #[test]
    fn test_neutral_gray_is_near_white_point() {
        let xy = ColorAnchor::NEUTRAL.to_chromaticity();
        // Equal channels land on the white point of the matrix, around
        // (0.32, 0.33) for these coefficients.
        assert!((xy.x - 0.32).abs() < 0.02);
        assert!((xy.y - 0.33).abs() < 0.02);
    }

    proptest! {
        #[test]
        fn prop_chromaticity_in_unit_range(
            r in 0.0f64..=1.0,
            g in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let xy = ColorAnchor::new(r, g, b).to_chromaticity();
            prop_assert!(xy.x.is_finite() && xy.y.is_finite());
            prop_assert!((0.0..=1.0).contains(&xy.x));
            prop_assert!((0.0..=1.0).contains(&xy.y));
        }
    }
}
