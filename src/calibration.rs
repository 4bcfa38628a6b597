//! Camera calibration state.
//!
//! Calibration arrives as two independent asynchronous info messages (one
//! per modality). [`CalibrationLatch`] accumulates both and reports
//! completeness; initialization blocks on it before the first frame pair is
//! consumed.

use crate::error::{Error, Result};
use crate::frame::Modality;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsic parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    /// Focal length, x (pixels)
    pub fx: f64,
    /// Focal length, y (pixels)
    pub fy: f64,
    /// Principal point, x (pixels)
    pub cx: f64,
    /// Principal point, y (pixels)
    pub cy: f64,
}

impl Intrinsics {
    /// Extract intrinsics from a 3x3 row-major camera matrix.
    ///
    /// K = [fx 0 cx; 0 fy cy; 0 0 1], so fx = K[0], fy = K[4],
    /// cx = K[2], cy = K[5].
    pub fn from_camera_matrix(k: &[f64; 9]) -> Self {
        Self {
            fx: k[0],
            fy: k[4],
            cx: k[2],
            cy: k[5],
        }
    }
}

/// Image resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Affine transform from raw depth samples to meters: `m = scale * raw + offset`.
///
/// Depth streams deliver raw 16-bit samples in millimeters, so the default
/// is `scale = 1/1000, offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthScale {
    pub scale: f32,
    pub offset: f32,
}

impl Default for DepthScale {
    fn default() -> Self {
        Self {
            scale: 1.0 / 1000.0,
            offset: 0.0,
        }
    }
}

/// Rigid transform from the color camera to the depth camera.
///
/// Streams that do not supply one use the identity, treating both cameras
/// as co-located.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrinsics {
    /// Row-major 3x3 rotation
    pub rotation: [[f32; 3]; 3],
    /// Translation in meters
    pub translation: [f32; 3],
}

impl Default for Extrinsics {
    fn default() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 0.0],
        }
    }
}

/// Per-modality calibration record
#[derive(Debug, Clone, Copy)]
struct ModalityCalibration {
    intrinsics: Intrinsics,
    resolution: Resolution,
    /// Latches true on first record and never reverts
    received: bool,
}

impl ModalityCalibration {
    fn empty() -> Self {
        Self {
            intrinsics: Intrinsics {
                fx: 0.0,
                fy: 0.0,
                cx: 0.0,
                cy: 0.0,
            },
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            received: false,
        }
    }
}

/// Accumulates the two asynchronous calibration signals.
///
/// `record` may be called from any thread, any number of times; the stored
/// value is last-write-wins, but `received` only ever transitions false to
/// true. The full calibration is usable once both modalities have reported.
pub struct CalibrationLatch {
    color: Mutex<ModalityCalibration>,
    depth: Mutex<ModalityCalibration>,
    depth_scale: DepthScale,
    extrinsics: Extrinsics,
}

impl CalibrationLatch {
    pub fn new() -> Self {
        Self {
            color: Mutex::new(ModalityCalibration::empty()),
            depth: Mutex::new(ModalityCalibration::empty()),
            depth_scale: DepthScale::default(),
            extrinsics: Extrinsics::default(),
        }
    }

    fn slot(&self, modality: Modality) -> &Mutex<ModalityCalibration> {
        match modality {
            Modality::Color => &self.color,
            Modality::Depth => &self.depth,
        }
    }

    /// Record intrinsics for one modality.
    pub fn record(&self, modality: Modality, intrinsics: Intrinsics, resolution: Resolution) {
        let mut slot = self.slot(modality).lock();
        let first = !slot.received;
        slot.intrinsics = intrinsics;
        slot.resolution = resolution;
        slot.received = true;
        drop(slot);

        if first {
            log::info!(
                "Got {} camera info: fx={:.1} fy={:.1} cx={:.1} cy={:.1} {}x{}",
                modality.label(),
                intrinsics.fx,
                intrinsics.fy,
                intrinsics.cx,
                intrinsics.cy,
                resolution.width,
                resolution.height
            );
        }
    }

    /// Record intrinsics from a 3x3 row-major camera matrix.
    pub fn record_from_matrix(&self, modality: Modality, k: &[f64; 9], width: u32, height: u32) {
        self.record(
            modality,
            Intrinsics::from_camera_matrix(k),
            Resolution { width, height },
        );
    }

    /// True once both modalities have recorded at least once; never reverts.
    pub fn is_complete(&self) -> bool {
        self.color.lock().received && self.depth.lock().received
    }

    /// Intrinsics for one modality, `NotReady` before its first record.
    pub fn intrinsics(&self, modality: Modality) -> Result<Intrinsics> {
        let slot = self.slot(modality).lock();
        if !slot.received {
            return Err(Error::NotReady);
        }
        Ok(slot.intrinsics)
    }

    /// Resolution for one modality, `NotReady` before its first record.
    pub fn resolution(&self, modality: Modality) -> Result<Resolution> {
        let slot = self.slot(modality).lock();
        if !slot.received {
            return Err(Error::NotReady);
        }
        Ok(slot.resolution)
    }

    /// Raw-depth-to-meters conversion parameters
    pub fn depth_scale(&self) -> DepthScale {
        self.depth_scale
    }

    /// Color-to-depth camera transform
    pub fn extrinsics(&self) -> Extrinsics {
        self.extrinsics
    }
}

impl Default for CalibrationLatch {
    fn default() -> Self {
        Self::new()
    }
}
