//! Memory-domain tagging for triangle storage.
//!
//! A mesh buffer lives either in host memory or on an accelerator device.
//! [`TriangleStore::materialize`] gives CPU code a uniform view: a direct
//! borrow when the buffer is already host-resident, or a scoped temporary
//! copy when it must be fetched from the device. The `Cow` return ties the
//! temporary's lifetime to the caller's scope, so it is released on every
//! exit path.

use super::types::Triangle;
use crate::error::Result;
use std::borrow::Cow;

/// Read-only boundary to a device-resident triangle buffer.
///
/// Implemented by the reconstruction engine's memory layer. Reading must
/// not mutate the device-side contents.
pub trait DeviceBuffer: Send {
    /// Buffer capacity in triangles
    fn capacity(&self) -> usize;

    /// Copy the device contents into `dst`, replacing its contents.
    ///
    /// Implementations fill up to `capacity()` triangles; the valid count is
    /// tracked by the owning mesh.
    fn read_into(&self, dst: &mut Vec<Triangle>) -> Result<()>;
}

/// Triangle storage tagged with its memory domain
pub enum TriangleStore {
    /// Buffer already resident in host memory
    Host(Vec<Triangle>),
    /// Buffer resident on an accelerator; must be copied before CPU iteration
    Device(Box<dyn DeviceBuffer>),
}

impl TriangleStore {
    /// Buffer capacity in triangles
    pub fn capacity(&self) -> usize {
        match self {
            TriangleStore::Host(triangles) => triangles.len(),
            TriangleStore::Device(buffer) => buffer.capacity(),
        }
    }

    /// Produce a host-resident view of the triangle buffer.
    ///
    /// Host storage is borrowed directly (no copy); device storage is copied
    /// into an owned temporary sized to the buffer capacity.
    pub fn materialize(&self) -> Result<Cow<'_, [Triangle]>> {
        match self {
            TriangleStore::Host(triangles) => Ok(Cow::Borrowed(triangles.as_slice())),
            TriangleStore::Device(buffer) => {
                let mut host_copy = Vec::with_capacity(buffer.capacity());
                buffer.read_into(&mut host_copy)?;
                Ok(Cow::Owned(host_copy))
            }
        }
    }
}

/// Device buffer test double backed by host memory.
///
/// Counts reads so tests can assert when a copy actually happened.
pub struct MockDeviceBuffer {
    triangles: Vec<Triangle>,
    reads: std::sync::atomic::AtomicU64,
}

impl MockDeviceBuffer {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            reads: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Number of times the buffer has been copied to the host
    pub fn read_count(&self) -> u64 {
        self.reads.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// The device-side contents, for post-test verification
    pub fn contents(&self) -> &[Triangle] {
        &self.triangles
    }
}

impl DeviceBuffer for MockDeviceBuffer {
    fn capacity(&self) -> usize {
        self.triangles.len()
    }

    fn read_into(&self, dst: &mut Vec<Triangle>) -> Result<()> {
        self.reads
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        dst.clear();
        dst.extend_from_slice(&self.triangles);
        Ok(())
    }
}

// Lets a test hold a handle to the buffer while a mesh owns it.
impl DeviceBuffer for std::sync::Arc<MockDeviceBuffer> {
    fn capacity(&self) -> usize {
        self.as_ref().capacity()
    }

    fn read_into(&self, dst: &mut Vec<Triangle>) -> Result<()> {
        self.as_ref().read_into(dst)
    }
}
