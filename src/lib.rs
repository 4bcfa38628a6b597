//! SetuIO - RGB-D camera bridge for dense reconstruction hosts
//!
//! This library bridges an asynchronous, callback-delivered color/depth
//! camera stream to a synchronous reconstruction loop, and exports the
//! engine's surface mesh as a flat point cloud.
//!
//! ## Components
//!
//! - [`bridge::CameraBridge`]: wires a [`transport::Transport`] to the
//!   calibration latch and frame synchronizer, exposes the pull-based API
//! - [`sync::FrameSynchronizer`]: single-slot, freshest-wins frame pairing
//! - [`calibration::CalibrationLatch`]: blocks startup until both camera
//!   info messages have arrived
//! - [`mesh`]: triangle mesh types, device-memory handling, and the
//!   mesh-to-point-cloud flattening used by export

pub mod bridge;
pub mod calibration;
pub mod config;
pub mod error;
pub mod export;
pub mod frame;
pub mod mesh;
pub mod messages;
pub mod sync;
pub mod transport;

// Re-export commonly used types
pub use bridge::CameraBridge;
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use frame::{ColorFrame, DepthFrame, Modality};
pub use mesh::{PointCloud3D, TriangleMesh};
