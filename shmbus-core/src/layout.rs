// SPDX-License-Identifier: Apache-2.0

//! Byte layout of a bus segment.
//!
//! A segment holds, in order: the metadata region, the [`Header`], and
//! the slot array. Offsets are computed with `std::alloc::Layout`
//! composition, so they are a pure function of the type parameters and
//! slot count and every attaching process agrees on them byte for byte.

use std::alloc::Layout;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicI64, AtomicU64};

use crate::plain::Plain;

/// Marker value for a slot that has never been written.
pub(crate) const SEQ_EMPTY: i64 = -1;

/// Shared producer state at the head of the ring area.
///
/// `tail` counts records ever admitted to the bus. Producers claim
/// sequence numbers from it with fetch-add; it never decreases.
#[repr(C)]
pub(crate) struct Header {
    pub(crate) tail: AtomicU64,
}

/// One record cell.
///
/// `seq` is the publication marker: the sequence number of the record
/// currently held in `value`, or [`SEQ_EMPTY`]. Producers store it with
/// Release ordering strictly after filling `value`; readers load it with
/// Acquire ordering before touching `value`.
#[repr(C)]
pub(crate) struct Slot<T> {
    pub(crate) seq: AtomicI64,
    pub(crate) value: UnsafeCell<T>,
}

/// Resolved offsets for one (record, metadata, capacity) instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RingLayout {
    /// Byte offset of the [`Header`]. The metadata region sits at 0,
    /// and the header follows at its natural alignment; an atomic at an
    /// unaligned offset would be undefined behavior.
    pub(crate) header_offset: usize,
    /// Byte offset of the first slot.
    pub(crate) slots_offset: usize,
    /// Total segment size in bytes.
    pub(crate) len: usize,
}

impl RingLayout {
    /// Compute offsets for `slot_count` slots.
    ///
    /// Returns `None` when the sizes overflow what a `Layout` can
    /// describe; callers treat that the same as the OS refusing the
    /// segment.
    pub(crate) fn compute<T: Plain, M: Plain>(slot_count: u64) -> Option<RingLayout> {
        let meta = Layout::new::<M>();
        let (layout, header_offset) = meta.extend(Layout::new::<Header>()).ok()?;
        let slots = Layout::array::<Slot<T>>(usize::try_from(slot_count).ok()?).ok()?;
        let (layout, slots_offset) = layout.extend(slots).ok()?;
        Some(RingLayout {
            header_offset,
            slots_offset,
            len: layout.pad_to_align().size(),
        })
    }
}

/// Effective capacity for a requested minimum: the smallest power of two
/// at or above it, with one slot as the floor. `None` when no u64 power
/// of two is large enough.
pub(crate) fn effective_slots(min_slots: u64) -> Option<u64> {
    min_slots.checked_next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_slots_rounds_up() {
        assert_eq!(effective_slots(0), Some(1));
        assert_eq!(effective_slots(1), Some(1));
        assert_eq!(effective_slots(2), Some(2));
        assert_eq!(effective_slots(3), Some(4));
        assert_eq!(effective_slots(5), Some(8));
        assert_eq!(effective_slots(1000), Some(1024));
        assert_eq!(effective_slots(1 << 62), Some(1 << 62));
    }

    #[test]
    fn test_effective_slots_overflow() {
        assert_eq!(effective_slots((1 << 63) + 1), None);
        assert_eq!(effective_slots(u64::MAX), None);
    }

    #[test]
    fn test_layout_without_metadata() {
        let layout = RingLayout::compute::<u64, ()>(4).unwrap();
        assert_eq!(layout.header_offset, 0);
        assert_eq!(layout.slots_offset, std::mem::size_of::<Header>());
        assert_eq!(
            layout.len,
            layout.slots_offset + 4 * std::mem::size_of::<Slot<u64>>()
        );
    }

    #[test]
    fn test_header_lands_on_aligned_offset() {
        // A 4-byte metadata type must not leave the 8-byte atomic tail
        // at offset 4.
        let layout = RingLayout::compute::<u64, u32>(4).unwrap();
        assert!(layout.header_offset >= std::mem::size_of::<u32>());
        assert_eq!(layout.header_offset % std::mem::align_of::<Header>(), 0);
        assert_eq!(layout.slots_offset % std::mem::align_of::<Slot<u64>>(), 0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = RingLayout::compute::<[u8; 48], u64>(256).unwrap();
        let b = RingLayout::compute::<[u8; 48], u64>(256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layout_overflow_is_none() {
        assert!(RingLayout::compute::<[u8; 1024], ()>(1 << 60).is_none());
    }
}
