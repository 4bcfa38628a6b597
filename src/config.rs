//! Configuration for the camera bridge.
//!
//! Loads configuration from a TOML file. Every option has a default and may
//! be overridden independently by the hosting environment.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level bridge configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub frames: FrameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Channel names for the subscribed and published streams
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Color camera calibration info channel
    #[serde(default = "default_color_info")]
    pub color_info: String,
    /// Depth camera calibration info channel
    #[serde(default = "default_depth_info")]
    pub depth_info: String,
    /// Color image stream channel
    #[serde(default = "default_color_image")]
    pub color_image: String,
    /// Depth image stream channel
    #[serde(default = "default_depth_image")]
    pub depth_image: String,
    /// Channel the flattened point cloud is published on
    #[serde(default = "default_export")]
    pub export: String,
    /// Name of the "export now" request endpoint
    #[serde(default = "default_export_request")]
    pub export_request: String,
}

/// Reference frame identifiers attached to published data
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameConfig {
    /// Reference frame id stamped onto exported point clouds
    #[serde(default = "default_reference_frame")]
    pub reference: String,
}

/// Logging configuration
///
/// The crate itself only emits through the `log` facade; the hosting
/// process applies these settings to whatever backend it installs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_color_info() -> String {
    "/camera/rgb/camera_info".to_string()
}

fn default_depth_info() -> String {
    "/camera/depth/camera_info".to_string()
}

fn default_color_image() -> String {
    "/camera/rgb/image_raw".to_string()
}

fn default_depth_image() -> String {
    "/camera/depth/image_raw".to_string()
}

fn default_export() -> String {
    "/complete_cloud".to_string()
}

fn default_export_request() -> String {
    "publish_scene".to_string()
}

fn default_reference_frame() -> String {
    "/world".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            color_info: default_color_info(),
            depth_info: default_depth_info(),
            color_image: default_color_image(),
            depth_image: default_depth_image(),
            export: default_export(),
            export_request: default_export_request(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            reference: default_reference_frame(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: default_log_output(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
