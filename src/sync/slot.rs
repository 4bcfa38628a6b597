//! Single-slot frame buffer.

use crate::error::Error;
use crate::frame::{Modality, RawImage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a producer write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreOutcome {
    /// Frame accepted and slot marked ready
    Stored,
    /// Consumer is mid-drain; frame dropped
    GateClosed,
    /// Slot still holds an unconsumed frame; frame dropped
    Occupied,
    /// Frame dimensions disagree with the established slot size
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Payload length inconsistent with the declared dimensions
    Malformed { expected: usize, actual: usize },
}

struct SlotState {
    image: Option<RawImage>,
    /// Dimensions pinned by the first accepted frame
    expected_size: Option<(u32, u32)>,
}

/// Single-slot buffer for one stream modality.
///
/// Written by exactly one producer callback context, read and cleared by
/// exactly one consumer. `ready == true` implies the held frame is complete
/// and not being concurrently written; it is set under the slot lock and
/// cleared only by the consumer's paired read.
pub struct FrameSlot {
    modality: Modality,
    ready: AtomicBool,
    state: Mutex<SlotState>,
}

impl FrameSlot {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            ready: AtomicBool::new(false),
            state: Mutex::new(SlotState {
                image: None,
                expected_size: None,
            }),
        }
    }

    /// Lock-free readiness check for the consumer's poll path
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Attempt a producer write.
    ///
    /// `accepting` is the shared gate; it is re-checked under the slot lock
    /// so a write can never land inside the consumer's drain window.
    pub(crate) fn store(&self, image: RawImage, accepting: &AtomicBool) -> StoreOutcome {
        if self.is_ready() {
            return StoreOutcome::Occupied;
        }

        if let Err(Error::MalformedFrame { expected, actual }) = image.validate(self.modality) {
            return StoreOutcome::Malformed { expected, actual };
        }

        let mut state = self.state.lock();

        // The gate may have closed while we waited for the lock.
        if !accepting.load(Ordering::SeqCst) {
            return StoreOutcome::GateClosed;
        }

        let actual = (image.width, image.height);
        match state.expected_size {
            Some(expected) if expected != actual => {
                return StoreOutcome::SizeMismatch { expected, actual };
            }
            None => state.expected_size = Some(actual),
            _ => {}
        }

        state.image = Some(image);
        self.ready.store(true, Ordering::SeqCst);
        StoreOutcome::Stored
    }

    /// Consumer read: move the frame out and clear readiness.
    ///
    /// Must only be called while the gate is closed.
    pub(crate) fn take(&self) -> Option<RawImage> {
        let mut state = self.state.lock();
        let image = state.image.take();
        self.ready.store(false, Ordering::SeqCst);
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_image(value: u16) -> RawImage {
        let [lo, hi] = value.to_le_bytes();
        RawImage {
            width: 2,
            height: 1,
            data: vec![lo, hi, lo, hi],
        }
    }

    fn open_gate() -> AtomicBool {
        AtomicBool::new(true)
    }

    #[test]
    fn store_then_take_clears_readiness() {
        let slot = FrameSlot::new(Modality::Depth);
        let gate = open_gate();

        assert!(!slot.is_ready());
        assert_eq!(slot.store(depth_image(7), &gate), StoreOutcome::Stored);
        assert!(slot.is_ready());

        let taken = slot.take().unwrap();
        assert_eq!(taken.data, depth_image(7).data);
        assert!(!slot.is_ready());
        assert!(slot.take().is_none());
    }

    #[test]
    fn occupied_slot_drops_new_frames() {
        let slot = FrameSlot::new(Modality::Depth);
        let gate = open_gate();

        assert_eq!(slot.store(depth_image(1), &gate), StoreOutcome::Stored);
        assert_eq!(slot.store(depth_image(2), &gate), StoreOutcome::Occupied);

        // The first frame survives.
        let taken = slot.take().unwrap();
        assert_eq!(taken.data, depth_image(1).data);
    }

    #[test]
    fn closed_gate_drops_frames_without_storing() {
        let slot = FrameSlot::new(Modality::Depth);
        let gate = AtomicBool::new(false);

        assert_eq!(slot.store(depth_image(1), &gate), StoreOutcome::GateClosed);
        assert!(!slot.is_ready());
        assert!(slot.take().is_none());
    }

    #[test]
    fn first_frame_pins_dimensions() {
        let slot = FrameSlot::new(Modality::Depth);
        let gate = open_gate();

        assert_eq!(slot.store(depth_image(1), &gate), StoreOutcome::Stored);
        slot.take();

        let wider = RawImage {
            width: 3,
            height: 1,
            data: vec![0u8; 6],
        };
        assert_eq!(
            slot.store(wider, &gate),
            StoreOutcome::SizeMismatch {
                expected: (2, 1),
                actual: (3, 1),
            }
        );
    }

    #[test]
    fn inconsistent_payload_is_malformed() {
        let slot = FrameSlot::new(Modality::Color);
        let gate = open_gate();

        let bad = RawImage {
            width: 2,
            height: 1,
            data: vec![0u8; 5], // color needs 6
        };
        assert_eq!(
            slot.store(bad, &gate),
            StoreOutcome::Malformed {
                expected: 6,
                actual: 5,
            }
        );
        assert!(!slot.is_ready());
    }
}
