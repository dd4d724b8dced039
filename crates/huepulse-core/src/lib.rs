//! HuePulse Core - Audio-to-Light Signal Mapping
//!
//! This crate contains the pure mapping pipeline that turns audio feature
//! events into light targets:
//! - sRGB to CIE xy chromaticity conversion
//! - Frequency to chromaticity interpolation between three color anchors
//! - Amplitude to 16-bit brightness with a perceptual power curve
//! - Low-pass smoothing of both outputs across events
//!
//! No I/O happens here; the wire protocol and the bridge session live in
//! `huepulse-control`.

#![warn(missing_docs)]

/// Amplitude to brightness mapping
pub mod brightness;
/// Frequency to chromaticity mapping
pub mod chromaticity;
/// sRGB color to CIE xy conversion
pub mod color;
/// Inbound sound event model
pub mod event;
/// Event-to-light-target pipeline
pub mod pipeline;
/// Exponential moving average filter
pub mod smoothing;

pub use brightness::{BrightnessMapper, MAX_BRIGHTNESS, MIN_BRIGHTNESS};
pub use chromaticity::{ChromaticityMapper, FrequencyRange};
pub use color::{ChromaticityPoint, ColorAnchor};
pub use event::SoundEvent;
pub use pipeline::{LightTarget, Pipeline};
pub use smoothing::LowPass;
