//! Frame-pair synchronization.
//!
//! Bridges the asynchronous producer callbacks (one per subscribed image
//! stream) to the synchronous consumer loop. Each stream gets a single-slot
//! buffer with overwrite suppression; a shared gate makes the consumer's
//! drain window invisible to producers. Frames that cannot be accepted are
//! dropped, never queued: freshness over completeness.

mod slot;
mod synchronizer;

pub use synchronizer::{FrameSynchronizer, SyncStatsSnapshot};
