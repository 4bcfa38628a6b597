//! Surface mesh export.
//!
//! On request, re-extracts the engine's surface mesh, flattens it into a
//! point collection, and publishes the result on the export channel. Export
//! runs synchronously, off the frame-critical path; a failed export leaves
//! the engine, the synchronizer, and the gate untouched.

use crate::error::Result;
use crate::mesh::{flatten, MeshSource, PointCloud3D};
use crate::messages::{self, PointCloudMessage};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::Arc;

/// Publishes the reconstruction engine's surface as a flat point cloud.
///
/// The engine handle is injected at construction; the exporter holds no
/// other state.
pub struct SceneExporter {
    source: Arc<Mutex<dyn MeshSource>>,
    transport: Arc<dyn Transport>,
    export_channel: String,
    frame_id: String,
}

impl SceneExporter {
    pub fn new(
        source: Arc<Mutex<dyn MeshSource>>,
        transport: Arc<dyn Transport>,
        export_channel: String,
        frame_id: String,
    ) -> Self {
        Self {
            source,
            transport,
            export_channel,
            frame_id,
        }
    }

    /// Extract, flatten, and publish the current surface.
    ///
    /// Returns the flattened point collection; ownership passes to the
    /// caller. Errors are fatal to this call only.
    pub fn export(&self) -> Result<PointCloud3D> {
        let mut source = self.source.lock();
        let mesh = source.extract_mesh()?;
        log::info!("Surface mesh has {} triangles", mesh.triangle_count());

        let cloud = flatten(mesh)?;
        drop(source);

        let message = PointCloudMessage {
            frame_id: self.frame_id.clone(),
            timestamp_us: messages::now_micros(),
            is_dense: cloud.is_dense,
            points: cloud.points.clone(),
        };
        let payload = messages::encode(&message)?;
        self.transport.publish(&self.export_channel, &payload)?;

        log::debug!(
            "Published {} points on {}",
            cloud.len(),
            self.export_channel
        );
        Ok(cloud)
    }
}
