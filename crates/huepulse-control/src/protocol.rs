//! HueStream frame encoding.
//!
//! The bridge's entertainment streaming protocol is a fixed binary layout
//! that must be reproduced bit-exactly:
//! - 9 bytes: "HueStream" (protocol name)
//! - 2 bytes: Version (0x02, 0x00 for v2.0)
//! - 1 byte:  Sequence number (ignored by the bridge, sent as 0x00)
//! - 2 bytes: Reserved (0x00, 0x00)
//! - 1 byte:  Color space (0x00 = RGB, 0x01 = XY+Brightness)
//! - 1 byte:  Reserved (0x00)
//! - N bytes: Entertainment area ID (UUID as ASCII string)
//! - 7 bytes per channel: channel ID, then x, y, brightness as 16-bit
//!   big-endian values (x and y scaled from [0, 1])
//!
//! This encoder targets a single pre-configured channel, so every frame
//! carries exactly one channel block for channel 0.

use huepulse_core::ChromaticityPoint;

/// Protocol name prefix of every frame.
const PROTOCOL_NAME: &[u8; 9] = b"HueStream";

/// Version 2.0, sequence 0, reserved, XY+Brightness color space, reserved.
const HEADER: [u8; 7] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];

/// Channel ID of the single streamed channel.
const CHANNEL_ID: u8 = 0x00;

/// Encode one streaming frame for the given area and light target.
///
/// x and y are clamped to [0, 1] before scaling so an out-of-range value
/// can never wrap the 16-bit fields; brightness is already full-range.
pub fn encode_frame(area_id: &str, xy: ChromaticityPoint, brightness: u16) -> Vec<u8> {
    let area_bytes = area_id.as_bytes();
    let mut frame = Vec::with_capacity(PROTOCOL_NAME.len() + HEADER.len() + area_bytes.len() + 7);

    frame.extend_from_slice(PROTOCOL_NAME);
    frame.extend_from_slice(&HEADER);
    frame.extend_from_slice(area_bytes);

    frame.push(CHANNEL_ID);
    frame.extend_from_slice(&scale_to_u16(xy.x).to_be_bytes());
    frame.extend_from_slice(&scale_to_u16(xy.y).to_be_bytes());
    frame.extend_from_slice(&brightness.to_be_bytes());

    frame
}

/// Scale a [0, 1] value to the full 16-bit range, truncating toward zero.
fn scale_to_u16(value: f64) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).floor() as u16
}
