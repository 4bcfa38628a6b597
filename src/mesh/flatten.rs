//! Mesh-to-point-cloud flattening.

use super::types::{PointCloud3D, TriangleMesh};
use crate::error::{Error, Result};

/// Boundary to the reconstruction engine's meshing stage.
///
/// `extract_mesh` re-extracts the surface from the current scene and returns
/// the resulting mesh. The mesh stays owned by the engine; callers borrow it
/// read-only.
pub trait MeshSource: Send {
    fn extract_mesh(&mut self) -> Result<&TriangleMesh>;
}

/// [`MeshSource`] backed by a fixed, pre-extracted mesh.
///
/// For hosts whose engine re-extracts out of band, and for tests.
pub struct StaticMeshSource {
    mesh: Option<TriangleMesh>,
}

impl StaticMeshSource {
    pub fn new(mesh: TriangleMesh) -> Self {
        Self { mesh: Some(mesh) }
    }

    /// A source with no scene; `extract_mesh` reports a precondition error.
    pub fn empty() -> Self {
        Self { mesh: None }
    }

    pub fn set_mesh(&mut self, mesh: TriangleMesh) {
        self.mesh = Some(mesh);
    }
}

impl MeshSource for StaticMeshSource {
    fn extract_mesh(&mut self) -> Result<&TriangleMesh> {
        self.mesh
            .as_ref()
            .ok_or(Error::Precondition("reconstruction engine has no scene mesh"))
    }
}

/// Flatten a triangle mesh into an ordered point collection.
///
/// Every triangle contributes its three vertices as three consecutive
/// points, preserving input order. No deduplication, no reordering, no
/// normal computation. The mesh is never mutated; when its buffer is
/// device-resident, one transient host copy is made and released before
/// returning.
pub fn flatten(mesh: &TriangleMesh) -> Result<PointCloud3D> {
    let count = mesh.triangle_count();
    if count > mesh.max_triangles() {
        return Err(Error::Precondition(
            "mesh triangle count exceeds its buffer capacity",
        ));
    }

    let triangles = mesh.store().materialize()?;

    let mut points = Vec::with_capacity(3 * count);
    for triangle in &triangles[..count] {
        points.push(triangle.p0);
        points.push(triangle.p1);
        points.push(triangle.p2);
    }

    Ok(PointCloud3D {
        points,
        is_dense: false,
    })
}
