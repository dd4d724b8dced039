//! Event-to-light-target pipeline.
//!
//! Composes the two mappers: each inbound event is mapped to a smoothed
//! chromaticity point and a smoothed brightness, in that order or any other;
//! the mappers are independent. Events must be processed serially because
//! both filters assume each update observes the immediately-preceding state.

use crate::brightness::BrightnessMapper;
use crate::chromaticity::{ChromaticityMapper, FrequencyRange};
use crate::color::ChromaticityPoint;
use crate::event::SoundEvent;
use tracing::trace;

/// The mapped output for one event: where the lights should head next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTarget {
    /// Smoothed CIE xy chromaticity.
    pub xy: ChromaticityPoint,
    /// Smoothed brightness in [MIN_BRIGHTNESS, 65535].
    pub brightness: u16,
}

/// Owns both mappers and their long-lived smoothing state.
#[derive(Debug, Default)]
pub struct Pipeline {
    chromaticity: ChromaticityMapper,
    brightness: BrightnessMapper,
}

impl Pipeline {
    /// Create a pipeline over the given frequency range.
    pub fn new(range: FrequencyRange) -> Self {
        Self {
            chromaticity: ChromaticityMapper::new(range),
            brightness: BrightnessMapper::new(),
        }
    }

    /// Map one event, advancing both filters exactly once.
    pub fn process(&mut self, event: &SoundEvent) -> LightTarget {
        let xy = self.chromaticity.map(
            event.frequency,
            &event.low_anchor(),
            &event.mid_anchor(),
            &event.high_anchor(),
        );
        let brightness = self.brightness.map(event.amplitude);

        trace!(
            frequency = event.frequency,
            amplitude = event.amplitude,
            x = xy.x,
            y = xy.y,
            brightness,
            "Mapped sound event"
        );

        LightTarget { xy, brightness }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brightness::{MAX_BRIGHTNESS, MIN_BRIGHTNESS};
    use crate::color::ColorAnchor;

    fn event(frequency: f64, amplitude: f64) -> SoundEvent {
        serde_json::from_str(&format!(
            r#"{{
                "frequency": {frequency},
                "amplitude": {amplitude},
                "lowFreqColor": [1.0, 0.0, 0.0],
                "midFreqColor": [0.0, 1.0, 0.0],
                "highFreqColor": [0.0, 0.0, 1.0]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_reference_event_mapping() {
        // 200 Hz sits exactly on the mid frequency, so the chromaticity
        // target is the green anchor; amplitude 0.25 normalizes to 0.5.
        let mut pipeline = Pipeline::default();
        let target = pipeline.process(&event(200.0, 0.25));

        let green = ColorAnchor([0.0, 1.0, 0.0]).to_chromaticity();
        let expected_x = 0.5 * 0.84 + green.x * 0.16;
        let expected_y = 0.3 * 0.84 + green.y * 0.16;
        assert!((target.xy.x - expected_x).abs() < 1e-12);
        assert!((target.xy.y - expected_y).abs() < 1e-12);

        let brightness_target = 0.5f64.powf(3.5)
            * f64::from(MAX_BRIGHTNESS - MIN_BRIGHTNESS)
            + f64::from(MIN_BRIGHTNESS);
        let expected_brightness =
            (f64::from(MIN_BRIGHTNESS) * 0.9 + brightness_target * 0.1).floor() as u16;
        assert_eq!(target.brightness, expected_brightness);
    }

    #[test]
    fn test_missing_anchors_use_neutral_gray() {
        let mut pipeline = Pipeline::default();
        let bare: SoundEvent =
            serde_json::from_str(r#"{"frequency": 200, "amplitude": 0.0}"#).unwrap();
        let target = pipeline.process(&bare);

        let neutral = ColorAnchor::NEUTRAL.to_chromaticity();
        let expected_x = 0.5 * 0.84 + neutral.x * 0.16;
        assert!((target.xy.x - expected_x).abs() < 1e-12);
        assert_eq!(target.brightness, MIN_BRIGHTNESS);
    }

    #[test]
    fn test_filters_advance_once_per_event() {
        let mut stepped = Pipeline::default();
        let mut reference = Pipeline::default();

        // Two identical events through one pipeline must land further along
        // the filter trajectory than one event through a fresh pipeline.
        stepped.process(&event(450.0, 1.0));
        let twice = stepped.process(&event(450.0, 1.0));
        let once = reference.process(&event(450.0, 1.0));

        assert!(twice.brightness > once.brightness);
        assert_ne!(twice.xy, once.xy);
    }
}
