//! Wire codec for inbound telemetry frames.
//!
//! Two equivalent formats decode into one canonical [`SensorFrame`]:
//!
//! - **Binary**: 16 bytes of device UUID followed by seven little-endian
//!   IEEE-754 `f32` values (`accel_x, accel_y, accel_z, gyro_x, gyro_y,
//!   gyro_z, battery_level`), minimum 44 bytes. The format carries no length
//!   prefix or version field; bytes past offset 44 are ignored.
//! - **JSON**: a flat object with a required `device_id` string and optional
//!   numeric fields defaulting to 0.0.
//!
//! Both decoders are pure functions with no side effects.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Minimum length of a binary telemetry frame.
pub const MIN_BINARY_FRAME_LEN: usize = 44;

/// Length of the leading device identifier, in bytes.
pub const DEVICE_ID_LEN: usize = 16;

/// Errors that can occur while decoding a telemetry frame.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Binary frame shorter than the fixed 44-byte prefix.
    #[error("undersized binary frame: {len} bytes (minimum {MIN_BINARY_FRAME_LEN})")]
    Undersized { len: usize },

    /// The device identifier bytes could not be parsed.
    #[error("invalid device identifier: {0}")]
    Identifier(#[from] uuid::Error),

    /// Malformed JSON frame.
    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON frame without a device identifier.
    #[error("missing device_id in JSON frame")]
    MissingDeviceId,
}

/// A decoded telemetry frame, independent of wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    /// Device identifier (hyphenated lowercase UUID for binary frames).
    pub device_id: String,
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
    pub gyro_x: f32,
    pub gyro_y: f32,
    pub gyro_z: f32,
    pub battery_level: f32,
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Decode a binary telemetry frame.
pub fn decode_binary(bytes: &[u8]) -> Result<SensorFrame, CodecError> {
    if bytes.len() < MIN_BINARY_FRAME_LEN {
        return Err(CodecError::Undersized { len: bytes.len() });
    }

    let device_id = Uuid::from_slice(&bytes[..DEVICE_ID_LEN])?.to_string();

    Ok(SensorFrame {
        device_id,
        accel_x: read_f32(bytes, 16),
        accel_y: read_f32(bytes, 20),
        accel_z: read_f32(bytes, 24),
        gyro_x: read_f32(bytes, 28),
        gyro_y: read_f32(bytes, 32),
        gyro_z: read_f32(bytes, 36),
        battery_level: read_f32(bytes, 40),
    })
}

/// The JSON frame layout: every numeric field is optional with default 0.0.
#[derive(Debug, Deserialize)]
struct JsonFrame {
    #[serde(default)]
    device_id: String,
    #[serde(default)]
    accel_x: f32,
    #[serde(default)]
    accel_y: f32,
    #[serde(default)]
    accel_z: f32,
    #[serde(default)]
    gyro_x: f32,
    #[serde(default)]
    gyro_y: f32,
    #[serde(default)]
    gyro_z: f32,
    #[serde(default)]
    battery_level: f32,
}

/// Decode a JSON telemetry frame.
pub fn decode_json(text: &str) -> Result<SensorFrame, CodecError> {
    let frame: JsonFrame = serde_json::from_str(text)?;
    if frame.device_id.is_empty() {
        return Err(CodecError::MissingDeviceId);
    }

    Ok(SensorFrame {
        device_id: frame.device_id,
        accel_x: frame.accel_x,
        accel_y: frame.accel_y,
        accel_z: frame.accel_z,
        gyro_x: frame.gyro_x,
        gyro_y: frame.gyro_y,
        gyro_z: frame.gyro_z,
        battery_level: frame.battery_level,
    })
}

/// Encode a frame into the binary wire format.
///
/// The exact inverse of [`decode_binary`] for well-formed frames; used by
/// tests and device simulators.
pub fn encode_binary(frame: &SensorFrame) -> Result<Vec<u8>, CodecError> {
    let uuid = Uuid::parse_str(&frame.device_id)?;

    let mut buf = Vec::with_capacity(MIN_BINARY_FRAME_LEN);
    buf.extend_from_slice(uuid.as_bytes());
    for value in [
        frame.accel_x,
        frame.accel_y,
        frame.accel_z,
        frame.gyro_x,
        frame.gyro_y,
        frame.gyro_z,
        frame.battery_level,
    ] {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    Ok(buf)
}
