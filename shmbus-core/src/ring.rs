// SPDX-License-Identifier: Apache-2.0

//! Lock-free broadcast ring over a shared segment.
//!
//! Producers claim sequence numbers from a shared atomic tail and
//! publish records through per-slot markers; consumers poll with a
//! private cursor. No locks, no syscalls, no blocking on the data path.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::Ordering;

use crate::error::{BusError, BusResult};
use crate::layout::{self, Header, RingLayout, Slot, SEQ_EMPTY};
use crate::plain::Plain;
use crate::segment::Segment;
use crate::types::SegmentKey;

/// One attachment to a broadcast ring living in a shared segment.
///
/// The handle itself is cheap: all shared state sits inside the
/// segment, an attachment adds only the resolved layout and a private
/// read cursor. Producing goes through `&self`, so one attachment can
/// be shared across threads; consuming takes `&mut self`, so every
/// consumer holds its own attachment and sees the full record stream
/// independently of all others.
///
/// Producers never block and never observe a full ring: a record
/// `slot_count` sequences ahead simply overwrites the old cell.
/// Capacity must exceed the records produced within the readers'
/// latency budget; the protocol does not enforce that, but a lapped
/// reader skips forward observably (see [`try_next`](Ring::try_next))
/// instead of wedging.
///
/// All attachments of one segment must use the same record type,
/// metadata type, and capacity request. The byte layout is a pure
/// function of those parameters, and mixed parameters would disagree
/// about offsets.
#[derive(Debug)]
pub struct Ring<T: Plain, M: Plain = ()> {
    segment: Segment,
    layout: RingLayout,
    slot_count: u64,
    mask: u64,
    cursor: u64,
    _types: PhantomData<(T, M)>,
}

impl<T: Plain, M: Plain> Ring<T, M> {
    /// Attach the ring named by `key`, creating and initializing its
    /// segment if absent.
    ///
    /// `min_slots` is rounded up to the next power of two. There is no
    /// error path: segment failures terminate the process (see
    /// [`Segment::attach`]), and capacity requests too large to size
    /// take the same exit.
    ///
    /// Creation and first use must be sequenced externally. A producer
    /// attaching while the creator is still filling in the empty
    /// markers can have its first records erased by that fill.
    pub fn attach(key: SegmentKey, min_slots: u64) -> Self {
        let ring = Self::map(key, min_slots);
        if ring.segment.created() {
            ring.initialize();
        }
        ring
    }

    /// Attach like [`attach`](Ring::attach), consulting `sanity`
    /// against the metadata region when the segment already existed.
    ///
    /// A first initializer has nothing to verify, so the check is
    /// skipped on the creating attachment. Rejection returns
    /// [`BusError::MetadataRejected`] and leaves the segment exactly as
    /// found.
    pub fn attach_checked(
        key: SegmentKey,
        min_slots: u64,
        sanity: impl FnOnce(&M) -> bool,
    ) -> BusResult<Self> {
        let ring = Self::map(key, min_slots);
        if ring.segment.created() {
            ring.initialize();
        } else if !sanity(&ring.metadata()) {
            return Err(BusError::MetadataRejected { key: key.value() });
        }
        Ok(ring)
    }

    /// Push a record, returning the sequence number it was admitted as.
    ///
    /// Never blocks and never fails; an older record a full capacity
    /// lap behind is overwritten.
    pub fn push(&self, record: &T) -> u64 {
        let seq = self.header().tail.fetch_add(1, Ordering::AcqRel);
        let slot = self.slot(seq);
        // SAFETY: the fetch-add handed this sequence number to this
        // caller alone; a competing writer of the same cell would have
        // to be a full capacity lap away, which the sizing precondition
        // excludes.
        unsafe { slot.value.get().write(*record) };
        slot.seq.store(seq as i64, Ordering::Release);
        seq
    }

    /// Claim the next sequence number for in-place filling.
    ///
    /// The returned [`Reservation`] derefs to the claimed cell. Nothing
    /// is published until [`Reservation::commit`]; dropping the
    /// reservation abandons the sequence number, and readers expecting
    /// it stall until a later lap overwrites the cell.
    pub fn reserve(&self) -> Reservation<'_, T, M> {
        let seq = self.header().tail.fetch_add(1, Ordering::AcqRel);
        Reservation { ring: self, seq }
    }

    /// Whether a record is available at the read cursor.
    pub fn ready(&self) -> bool {
        self.cursor < self.tail()
            && self.slot(self.cursor).seq.load(Ordering::Acquire) >= self.cursor as i64
    }

    /// Take the record at the read cursor, or `None` if nothing is
    /// ready.
    ///
    /// Returns the delivered sequence number together with a flat copy
    /// of the record. When producers have lapped this attachment, the
    /// delivered sequence is greater than the cursor it replaced and
    /// the cursor jumps past the overwritten span; callers that care
    /// compare the returned sequence with [`cursor`](Ring::cursor)
    /// taken beforehand.
    pub fn try_next(&mut self) -> Option<(u64, T)> {
        if self.cursor >= self.tail() {
            return None;
        }
        let slot = self.slot(self.cursor);
        let published = slot.seq.load(Ordering::Acquire);
        if published < self.cursor as i64 {
            return None;
        }
        // SAFETY: the Acquire load saw a marker at or past the cursor,
        // so the cell holds a fully published record. Plain keeps the
        // copy valid even if a lapping producer races it.
        let record = unsafe { *slot.value.get() };
        self.cursor = published as u64 + 1;
        Some((published as u64, record))
    }

    /// Move the read cursor to the live tail, skipping everything
    /// already admitted.
    pub fn attach_latest(&mut self) {
        self.cursor = self.tail();
    }

    /// Move the read cursor to an arbitrary sequence number, for replay
    /// of records still resident in their slots.
    pub fn set_read_position(&mut self, seq: u64) {
        self.cursor = seq;
    }

    /// The next sequence number this attachment expects to read.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Effective capacity in slots (a power of two).
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    /// Records ever admitted to the bus.
    pub fn tail(&self) -> u64 {
        self.header().tail.load(Ordering::Acquire)
    }

    /// The key naming the underlying segment.
    pub fn key(&self) -> SegmentKey {
        self.segment.key()
    }

    /// Whether this attachment created (and initialized) the segment.
    pub fn created(&self) -> bool {
        self.segment.created()
    }

    /// Read the metadata region.
    pub fn metadata(&self) -> M {
        // SAFETY: the metadata region starts at the mapping base, in
        // bounds by the layout computation; Plain makes any resident
        // bit pattern a valid M.
        unsafe { *self.metadata_ptr() }
    }

    /// Write the metadata region.
    ///
    /// The region carries no synchronization. Convention: the creating
    /// process publishes metadata before any peer attaches, and nobody
    /// rewrites it afterward.
    pub fn set_metadata(&self, meta: M) {
        // SAFETY: same bounds as `metadata`; concurrent use is excluded
        // by the convention above.
        unsafe { self.metadata_ptr().write(meta) };
    }

    fn map(key: SegmentKey, min_slots: u64) -> Self {
        let slot_count =
            layout::effective_slots(min_slots).unwrap_or_else(|| oversize(key, min_slots));
        let layout =
            RingLayout::compute::<T, M>(slot_count).unwrap_or_else(|| oversize(key, min_slots));
        let segment = Segment::attach(key, layout.len);
        Self {
            segment,
            layout,
            slot_count,
            mask: slot_count - 1,
            cursor: 0,
            _types: PhantomData,
        }
    }

    /// One-time fill by the creating process: tail to zero, every
    /// marker to empty.
    fn initialize(&self) {
        self.header().tail.store(0, Ordering::Release);
        for seq in 0..self.slot_count {
            self.slot(seq).seq.store(SEQ_EMPTY, Ordering::Release);
        }
        tracing::debug!(
            key = %self.segment.key(),
            slots = self.slot_count,
            "Initialized bus ring"
        );
    }

    fn header(&self) -> &Header {
        // SAFETY: header_offset is in bounds and naturally aligned by
        // the layout computation, and the mapping is never unmapped.
        unsafe { &*(self.segment.base().add(self.layout.header_offset) as *const Header) }
    }

    fn slot(&self, seq: u64) -> &Slot<T> {
        let index = (seq & self.mask) as usize;
        // SAFETY: masking keeps the index inside the slot array; offset
        // and alignment come from the layout computation.
        unsafe {
            let slots = self.segment.base().add(self.layout.slots_offset) as *const Slot<T>;
            &*slots.add(index)
        }
    }

    fn metadata_ptr(&self) -> *mut M {
        // The mapping base is page-aligned, which satisfies any M.
        self.segment.base() as *mut M
    }
}

/// A claimed but unpublished sequence number.
///
/// Derefs to the claimed record cell for in-place filling. The record
/// becomes visible to readers only on [`commit`](Reservation::commit).
pub struct Reservation<'a, T: Plain, M: Plain> {
    ring: &'a Ring<T, M>,
    seq: u64,
}

impl<T: Plain, M: Plain> Reservation<'_, T, M> {
    /// The sequence number claimed by this reservation.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Publish the filled record, returning its sequence number.
    pub fn commit(self) -> u64 {
        let slot = self.ring.slot(self.seq);
        slot.seq.store(self.seq as i64, Ordering::Release);
        self.seq
    }
}

impl<T: Plain, M: Plain> Deref for Reservation<'_, T, M> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the claimed cell is exclusive to this reservation
        // under the same lap precondition as push, and Plain makes any
        // resident bit pattern readable.
        unsafe { &*self.ring.slot(self.seq).value.get() }
    }
}

impl<T: Plain, M: Plain> DerefMut for Reservation<'_, T, M> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see Deref; borrowing the reservation mutably keeps
        // this the only live reference it hands out.
        unsafe { &mut *self.ring.slot(self.seq).value.get() }
    }
}

/// Capacity requests the layout cannot size get the same treatment as
/// the OS refusing the segment.
fn oversize(key: SegmentKey, min_slots: u64) -> ! {
    tracing::error!(
        key = %key,
        requested = min_slots,
        "Ring capacity request overflows segment sizing"
    );
    std::process::exit(1);
}
