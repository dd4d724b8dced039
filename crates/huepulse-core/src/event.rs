//! Inbound sound event model.
//!
//! The host audio analyzer emits events with a fundamental frequency, an
//! amplitude, and one RGB anchor per frequency band. Host UIs sometimes send
//! the placeholder string `"*"` instead of a color; that sentinel, a missing
//! field, or a malformed value all resolve to neutral gray rather than
//! failing the event.

use crate::color::ColorAnchor;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// One audio feature event from the host analyzer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundEvent {
    /// Fundamental frequency in Hz.
    pub frequency: f64,
    /// Amplitude, nominally in [0, 1].
    pub amplitude: f64,
    /// Anchor color for the low frequency band, if the host supplied one.
    #[serde(default, deserialize_with = "anchor_or_none")]
    pub low_freq_color: Option<ColorAnchor>,
    /// Anchor color for the mid frequency band, if the host supplied one.
    #[serde(default, deserialize_with = "anchor_or_none")]
    pub mid_freq_color: Option<ColorAnchor>,
    /// Anchor color for the high frequency band, if the host supplied one.
    #[serde(default, deserialize_with = "anchor_or_none")]
    pub high_freq_color: Option<ColorAnchor>,
}

impl SoundEvent {
    /// The low-band anchor, falling back to neutral gray.
    pub fn low_anchor(&self) -> ColorAnchor {
        self.low_freq_color.unwrap_or(ColorAnchor::NEUTRAL)
    }

    /// The mid-band anchor, falling back to neutral gray.
    pub fn mid_anchor(&self) -> ColorAnchor {
        self.mid_freq_color.unwrap_or(ColorAnchor::NEUTRAL)
    }

    /// The high-band anchor, falling back to neutral gray.
    pub fn high_anchor(&self) -> ColorAnchor {
        self.high_freq_color.unwrap_or(ColorAnchor::NEUTRAL)
    }
}

/// Accepts a 3-element (or longer) numeric array as an anchor; the `"*"`
/// placeholder, null, and malformed shapes become `None`.
fn anchor_or_none<'de, D>(deserializer: D) -> Result<Option<ColorAnchor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_anchor(&value))
}

fn parse_anchor(value: &Value) -> Option<ColorAnchor> {
    match value {
        // "*" is the documented placeholder for "no color selected".
        Value::Null => None,
        Value::String(s) if s == "*" => None,
        Value::Array(items) if items.len() >= 3 => {
            let mut channels = [0.0f64; 3];
            for (slot, item) in channels.iter_mut().zip(items) {
                match item.as_f64() {
                    Some(v) => *slot = v,
                    None => {
                        warn!("Non-numeric color channel {item}, substituting neutral gray");
                        return None;
                    }
                }
            }
            Some(ColorAnchor(channels))
        }
        other => {
            warn!("Malformed color anchor {other}, substituting neutral gray");
            None
        }
    }
}
