//! Frame-pair synchronizer and hand-off protocol.

use super::slot::{FrameSlot, StoreOutcome};
use crate::error::{Error, Result};
use crate::frame::{decode_color, decode_depth, ColorFrame, DepthFrame, Modality, RawImage};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lock-free drop and delivery counters
#[derive(Default)]
struct SyncStats {
    color_drops: AtomicU64,
    depth_drops: AtomicU64,
    resolution_rejects: AtomicU64,
    malformed_rejects: AtomicU64,
    pairs_delivered: AtomicU64,
}

/// Point-in-time snapshot of the synchronizer counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatsSnapshot {
    /// Color frames dropped (slot occupied or gate closed)
    pub color_drops: u64,
    /// Depth frames dropped (slot occupied or gate closed)
    pub depth_drops: u64,
    /// Frames rejected for disagreeing with the established resolution
    pub resolution_rejects: u64,
    /// Frames rejected for inconsistent payload length
    pub malformed_rejects: u64,
    /// Frame pairs handed to the consumer
    pub pairs_delivered: u64,
}

/// Coordinates the two frame slots and the producer/consumer gate.
///
/// Producers call [`offer`](Self::offer) from their callback contexts; the
/// single synchronous consumer polls [`try_take_pair`](Self::try_take_pair).
/// A frame that cannot be accepted is dropped, never queued, so each slot
/// always holds the freshest unconsumed frame of its modality.
pub struct FrameSynchronizer {
    /// The gate: true while producers may write. Cleared for the duration
    /// of the consumer's drain so no write can land mid-read.
    accepting: AtomicBool,
    color: FrameSlot,
    depth: FrameSlot,
    stats: SyncStats,
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self {
            accepting: AtomicBool::new(true),
            color: FrameSlot::new(Modality::Color),
            depth: FrameSlot::new(Modality::Depth),
            stats: SyncStats::default(),
        }
    }

    fn slot(&self, modality: Modality) -> &FrameSlot {
        match modality {
            Modality::Color => &self.color,
            Modality::Depth => &self.depth,
        }
    }

    fn drop_counter(&self, modality: Modality) -> &AtomicU64 {
        match modality {
            Modality::Color => &self.stats.color_drops,
            Modality::Depth => &self.stats.depth_drops,
        }
    }

    /// Producer path: offer an incoming frame to its slot.
    ///
    /// Safe to call from any thread. Best-effort: frames arriving while the
    /// slot is occupied or the consumer is draining are dropped.
    pub fn offer(&self, modality: Modality, image: RawImage) {
        // Cheap pre-check; the slot re-checks under its lock.
        if !self.accepting.load(Ordering::SeqCst) {
            self.drop_counter(modality).fetch_add(1, Ordering::Relaxed);
            log::trace!("{} frame dropped: consumer draining", modality.label());
            return;
        }

        match self.slot(modality).store(image, &self.accepting) {
            StoreOutcome::Stored => {}
            StoreOutcome::GateClosed => {
                self.drop_counter(modality).fetch_add(1, Ordering::Relaxed);
                log::trace!("{} frame dropped: consumer draining", modality.label());
            }
            StoreOutcome::Occupied => {
                self.drop_counter(modality).fetch_add(1, Ordering::Relaxed);
                log::trace!("{} frame dropped: slot occupied", modality.label());
            }
            StoreOutcome::SizeMismatch { expected, actual } => {
                self.stats
                    .resolution_rejects
                    .fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "{} frame rejected: {}",
                    modality.label(),
                    Error::ResolutionMismatch { expected, actual }
                );
            }
            StoreOutcome::Malformed { expected, actual } => {
                self.stats.malformed_rejects.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "{} frame rejected: {}",
                    modality.label(),
                    Error::MalformedFrame { expected, actual }
                );
            }
        }
    }

    /// True when both slots hold an unconsumed frame
    pub fn both_ready(&self) -> bool {
        self.color.is_ready() && self.depth.is_ready()
    }

    /// Consumer path: take and decode the pending frame pair.
    ///
    /// Returns `NotReady` unless both slots are ready. On success both slots
    /// are cleared, so the next call returns `NotReady` until both streams
    /// deliver again. Single-consumer: this must only be called from one
    /// thread.
    pub fn try_take_pair(&self) -> Result<(ColorFrame, DepthFrame)> {
        if !self.both_ready() {
            return Err(Error::NotReady);
        }

        // Close the gate for the drain; producers drop instead of writing.
        self.accepting.store(false, Ordering::SeqCst);

        // Fixed drain order: depth before color.
        let depth_raw = self.depth.take();
        let color_raw = self.color.take();

        self.accepting.store(true, Ordering::SeqCst);

        // Only the consumer clears slots, so both frames must be present.
        let (Some(depth_raw), Some(color_raw)) = (depth_raw, color_raw) else {
            return Err(Error::NotReady);
        };

        // Decode outside the drain window; the buffers are consumer-owned now.
        let depth = decode_depth(&depth_raw)?;
        let color = decode_color(&color_raw)?;

        self.stats.pairs_delivered.fetch_add(1, Ordering::Relaxed);
        Ok((color, depth))
    }

    /// Snapshot of the drop and delivery counters
    pub fn stats(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            color_drops: self.stats.color_drops.load(Ordering::Relaxed),
            depth_drops: self.stats.depth_drops.load(Ordering::Relaxed),
            resolution_rejects: self.stats.resolution_rejects.load(Ordering::Relaxed),
            malformed_rejects: self.stats.malformed_rejects.load(Ordering::Relaxed),
            pairs_delivered: self.stats.pairs_delivered.load(Ordering::Relaxed),
        }
    }
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
