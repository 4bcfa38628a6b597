//! Image frame types and pixel decoding.
//!
//! Incoming frames arrive as raw byte payloads ([`RawImage`]) and are decoded
//! into consumer-owned buffers during the hand-off:
//! - Depth: 2 bytes per pixel, little-endian unsigned 16-bit samples
//!   (raw sensor units, typically millimeters). Float depth encodings are
//!   not supported.
//! - Color: 3 bytes per pixel (R, G, B), expanded to 4 channels with a
//!   constant alpha of 255.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Stream modality of a frame or calibration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Color,
    Depth,
}

impl Modality {
    /// Bytes per pixel on the wire
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Modality::Color => 3,
            Modality::Depth => 2,
        }
    }

    /// Short label for log messages
    pub fn label(self) -> &'static str {
        match self {
            Modality::Color => "color",
            Modality::Depth => "depth",
        }
    }
}

/// Encoded image payload as delivered by the transport layer
#[derive(Debug, Clone)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Byte count implied by the dimensions for the given modality
    pub fn expected_len(&self, modality: Modality) -> usize {
        self.width as usize * self.height as usize * modality.bytes_per_pixel()
    }

    /// Check that the payload length matches the declared dimensions
    pub fn validate(&self, modality: Modality) -> Result<()> {
        let expected = self.expected_len(modality);
        if self.data.len() != expected {
            return Err(Error::MalformedFrame {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Single decoded color pixel, 4 channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Decoded 4-channel color frame
#[derive(Debug, Clone)]
pub struct ColorFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<ColorPixel>,
}

/// Decoded depth frame, one 16-bit sample per pixel
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u16>,
}

/// Decode a raw depth payload into 16-bit samples.
///
/// Each sample is reconstructed from two consecutive little-endian bytes
/// (`byte0 | byte1 << 8`).
pub fn decode_depth(image: &RawImage) -> Result<DepthFrame> {
    image.validate(Modality::Depth)?;

    let samples = image
        .data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(DepthFrame {
        width: image.width,
        height: image.height,
        samples,
    })
}

/// Decode a raw RGB payload into a 4-channel color frame.
///
/// Alpha is fixed at 255; the source stream carries no alpha channel.
pub fn decode_color(image: &RawImage) -> Result<ColorFrame> {
    image.validate(Modality::Color)?;

    let pixels = image
        .data
        .chunks_exact(3)
        .map(|rgb| ColorPixel {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 255,
        })
        .collect();

    Ok(ColorFrame {
        width: image.width,
        height: image.height,
        pixels,
    })
}
