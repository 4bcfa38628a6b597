//! Bridge orchestration.
//!
//! Wires the transport subscriptions to the calibration latch and the frame
//! synchronizer, registers the export endpoint, and exposes the pull-based
//! consumer API.

use crate::calibration::{CalibrationLatch, DepthScale, Extrinsics, Intrinsics, Resolution};
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::export::SceneExporter;
use crate::frame::{ColorFrame, DepthFrame, Modality, RawImage};
use crate::mesh::{MeshSource, PointCloud3D};
use crate::messages::{self, CameraInfoMessage, ImageMessage};
use crate::sync::{FrameSynchronizer, SyncStatsSnapshot};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often the calibration wait loop re-checks the latch
const CALIBRATION_POLL: Duration = Duration::from_millis(100);

/// RGB-D camera bridge.
///
/// Construction subscribes all four camera channels and registers the
/// export request endpoint. Producers run in the transport's callback
/// contexts; the hosting reconstruction loop is the single consumer and
/// polls [`try_take_pair`](Self::try_take_pair).
pub struct CameraBridge {
    config: BridgeConfig,
    transport: Arc<dyn Transport>,
    latch: Arc<CalibrationLatch>,
    sync: Arc<FrameSynchronizer>,
    exporter: Arc<SceneExporter>,
}

impl CameraBridge {
    /// Wire the bridge onto a transport and a reconstruction engine handle.
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        source: Arc<Mutex<dyn MeshSource>>,
    ) -> Result<Self> {
        log::info!("Initializing camera bridge");

        let latch = Arc::new(CalibrationLatch::new());
        let sync = Arc::new(FrameSynchronizer::new());

        Self::subscribe_info(&*transport, &config.channels.color_info, Modality::Color, &latch)?;
        Self::subscribe_info(&*transport, &config.channels.depth_info, Modality::Depth, &latch)?;
        Self::subscribe_image(&*transport, &config.channels.color_image, Modality::Color, &sync)?;
        Self::subscribe_image(&*transport, &config.channels.depth_image, Modality::Depth, &sync)?;

        let exporter = Arc::new(SceneExporter::new(
            source,
            Arc::clone(&transport),
            config.channels.export.clone(),
            config.frames.reference.clone(),
        ));

        let handler_exporter = Arc::clone(&exporter);
        transport.register_request_handler(
            &config.channels.export_request,
            Box::new(move |_| {
                handler_exporter.export()?;
                Ok(Vec::new())
            }),
        )?;

        log::info!(
            "Camera bridge ready: images on {} + {}, export '{}' -> {}",
            config.channels.color_image,
            config.channels.depth_image,
            config.channels.export_request,
            config.channels.export
        );

        Ok(Self {
            config,
            transport,
            latch,
            sync,
            exporter,
        })
    }

    fn subscribe_info(
        transport: &dyn Transport,
        channel: &str,
        modality: Modality,
        latch: &Arc<CalibrationLatch>,
    ) -> Result<()> {
        let latch = Arc::clone(latch);
        transport.subscribe(
            channel,
            Box::new(move |payload| {
                match messages::decode::<CameraInfoMessage>(payload) {
                    Ok(info) => {
                        latch.record_from_matrix(modality, &info.k, info.width, info.height)
                    }
                    Err(e) => {
                        log::warn!("Discarding malformed {} camera info: {}", modality.label(), e)
                    }
                }
            }),
        )
    }

    fn subscribe_image(
        transport: &dyn Transport,
        channel: &str,
        modality: Modality,
        sync: &Arc<FrameSynchronizer>,
    ) -> Result<()> {
        let sync = Arc::clone(sync);
        transport.subscribe(
            channel,
            Box::new(move |payload| match messages::decode::<ImageMessage>(payload) {
                Ok(image) => sync.offer(
                    modality,
                    RawImage {
                        width: image.width,
                        height: image.height,
                        data: image.data,
                    },
                ),
                Err(e) => log::warn!("Discarding malformed {} frame: {}", modality.label(), e),
            }),
        )
    }

    /// Block until both camera info messages have arrived.
    ///
    /// Coarse poll loop, run once at startup: each iteration services the
    /// transport so pending callbacks can fire, then sleeps. Fails with
    /// `InitializationTimeout` after `timeout`, or `Cancelled` when the
    /// shared cancel flag is raised.
    pub fn wait_for_calibration(&self, timeout: Duration, cancel: &AtomicBool) -> Result<()> {
        let start = Instant::now();
        let mut last_log = Instant::now();

        log::info!("Waiting for color and depth camera info...");
        while !self.latch.is_complete() {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            if start.elapsed() >= timeout {
                return Err(Error::InitializationTimeout(timeout));
            }

            self.transport.service_once()?;
            if self.latch.is_complete() {
                break;
            }

            if last_log.elapsed() >= Duration::from_secs(1) {
                log::info!("Still waiting for camera info...");
                last_log = Instant::now();
            }
            std::thread::sleep(CALIBRATION_POLL);
        }

        log::info!("Calibration complete");
        Ok(())
    }

    /// True once both modalities have reported calibration; never reverts
    pub fn has_calibration(&self) -> bool {
        self.latch.is_complete()
    }

    /// Intrinsics for one modality, `NotReady` before its info message
    pub fn intrinsics(&self, modality: Modality) -> Result<Intrinsics> {
        self.latch.intrinsics(modality)
    }

    /// Resolution for one modality, `NotReady` before its info message
    pub fn resolution(&self, modality: Modality) -> Result<Resolution> {
        self.latch.resolution(modality)
    }

    /// Raw-depth-to-meters conversion parameters
    pub fn depth_scale(&self) -> DepthScale {
        self.latch.depth_scale()
    }

    /// Color-to-depth camera transform
    pub fn extrinsics(&self) -> Extrinsics {
        self.latch.extrinsics()
    }

    /// Poll for the next synchronized frame pair.
    ///
    /// While no pair is pending this performs one non-blocking service tick
    /// of the transport (so pending deliveries can fire) and returns
    /// `NotReady`; the caller retries on its next loop iteration.
    pub fn try_take_pair(&self) -> Result<(ColorFrame, DepthFrame)> {
        if !self.sync.both_ready() {
            self.transport.service_once()?;
            return Err(Error::NotReady);
        }
        self.sync.try_take_pair()
    }

    /// Extract, flatten, and publish the engine's current surface.
    pub fn request_export(&self) -> Result<PointCloud3D> {
        self.exporter.export()
    }

    /// Snapshot of the synchronizer's drop and delivery counters
    pub fn stats(&self) -> SyncStatsSnapshot {
        self.sync.stats()
    }

    /// The configuration the bridge was built with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}
