//! Wire message types for transport payloads.
//!
//! All payloads are MessagePack-encoded. Malformed payloads are logged and
//! discarded by the receiving side; they are never retried.

use crate::error::{Error, Result};
use crate::mesh::Point3D;
use serde::{Deserialize, Serialize};

/// Camera calibration info delivered once per stream (and possibly repeated)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CameraInfoMessage {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Row-major 3x3 camera matrix: [fx 0 cx; 0 fy cy; 0 0 1]
    pub k: [f64; 9],
}

/// Raw image frame as delivered on an image channel
///
/// Color payloads carry 3 bytes per pixel (R,G,B); depth payloads carry
/// 2 bytes per pixel (little-endian u16 in raw sensor units).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageMessage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Flattened surface points published on the export channel
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PointCloudMessage {
    /// Reference frame identifier for downstream consumers
    pub frame_id: String,
    /// Timestamp in microseconds since epoch
    pub timestamp_us: u64,
    /// False: may contain degenerate or duplicate points
    pub is_dense: bool,
    /// Points in triangle-then-vertex order
    pub points: Vec<Point3D>,
}

/// Serialize a message to MessagePack bytes
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Deserialize a message from MessagePack bytes
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
}

/// Current time in microseconds since the Unix epoch
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
