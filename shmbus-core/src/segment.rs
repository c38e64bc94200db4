//! System V shared memory segments.
//!
//! A segment is addressed by a process-wide integer key and lives until
//! explicitly removed, surviving every process that attached it. The
//! mapping is permanent for the attaching process: nothing here ever
//! detaches or unmaps, which is what keeps the interior pointers the
//! ring hands out valid for the rest of the process lifetime.

use std::ptr::NonNull;

use crate::error::{BusError, BusResult};
use crate::types::SegmentKey;

/// A mapped System V shared memory segment.
///
/// The first process whose exclusive create succeeds sees
/// [`created()`](Segment::created) return true and owns one-time
/// initialization of the contents; the kernel hands the fresh segment
/// over zero-filled. Every other process attaches the same bytes.
#[derive(Debug)]
pub struct Segment {
    key: SegmentKey,
    base: NonNull<u8>,
    len: usize,
    created: bool,
}

// SAFETY: Segment only hands out raw bytes of a mapping that is never
// unmapped. All concurrent access goes through the atomics the ring
// places inside the segment.
unsafe impl Send for Segment {}

// SAFETY: see above; shared references only expose the base pointer.
unsafe impl Sync for Segment {}

impl Segment {
    /// Attach the segment named by `key`, creating it if absent.
    ///
    /// There is no error path: if the OS refuses to provide or map a
    /// segment of `len` bytes, the failure is logged and the process
    /// terminates. A bus participant that cannot reach its segment has
    /// nothing to fall back to.
    pub fn attach(key: SegmentKey, len: usize) -> Self {
        // Exclusive probe: succeeds for exactly one process per segment
        // lifetime. Failure reasons are not inspected here; anything
        // other than plain existence fails the unconditional shmget
        // below with the same errno.
        // SAFETY: plain syscall, no pointers involved.
        let probe =
            unsafe { libc::shmget(key.value(), len, libc::IPC_CREAT | libc::IPC_EXCL | 0o666) };
        let created = probe >= 0;

        // SAFETY: plain syscall, no pointers involved.
        let shmid = unsafe { libc::shmget(key.value(), len, libc::IPC_CREAT | 0o666) };
        if shmid < 0 {
            fatal(key, "shmget", &std::io::Error::last_os_error());
        }

        // SAFETY: shmid came from a successful shmget; a null attach
        // address lets the kernel pick the mapping location.
        let base = unsafe { libc::shmat(shmid, std::ptr::null(), 0) };
        if base as isize == -1 {
            fatal(key, "shmat", &std::io::Error::last_os_error());
        }

        let base = NonNull::new(base as *mut u8).expect("shmat returned null but not -1");

        tracing::debug!(key = %key, len = len, created = created, "Attached shared memory segment");

        Self {
            key,
            base,
            len,
            created,
        }
    }

    /// Remove the segment named by `key`.
    ///
    /// The bus never removes segments on its own; this is the explicit
    /// teardown hook for operators and tests. Existing attachments keep
    /// their mappings until their processes exit, per `IPC_RMID`
    /// semantics.
    pub fn remove(key: SegmentKey) -> BusResult<()> {
        // SAFETY: plain syscall; size 0 looks up an existing segment.
        let shmid = unsafe { libc::shmget(key.value(), 0, 0) };
        if shmid < 0 {
            return Err(BusError::RemoveFailed {
                key: key.value(),
                reason: format!("shmget failed: {}", std::io::Error::last_os_error()),
            });
        }

        // SAFETY: shmid names an existing segment; IPC_RMID takes no
        // buffer.
        let rc = unsafe { libc::shmctl(shmid, libc::IPC_RMID, std::ptr::null_mut()) };
        if rc < 0 {
            return Err(BusError::RemoveFailed {
                key: key.value(),
                reason: format!("shmctl failed: {}", std::io::Error::last_os_error()),
            });
        }

        tracing::debug!(key = %key, "Removed shared memory segment");
        Ok(())
    }

    /// Get the key naming this segment.
    pub fn key(&self) -> SegmentKey {
        self.key
    }

    /// Get the mapped size in bytes.
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether this attachment created the segment.
    pub fn created(&self) -> bool {
        self.created
    }

    /// Base of the mapping. Stays crate-private: callers only reach the
    /// segment through the ring's typed accessors.
    pub(crate) fn base(&self) -> *mut u8 {
        self.base.as_ptr()
    }
}

/// Unrecoverable segment failure: diagnose and terminate.
fn fatal(key: SegmentKey, syscall: &'static str, errno: &std::io::Error) -> ! {
    tracing::error!(
        key = %key,
        syscall = syscall,
        error = %errno,
        "Shared memory segment unavailable"
    );
    std::process::exit(1);
}
