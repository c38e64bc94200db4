// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for the shmbus benchmarks.
//!
//! Benchmarks run against real System V segments. Every group takes a
//! key of its own and removes the segment when it is done, so repeated
//! runs never inherit stale slot contents.

use std::sync::atomic::{AtomicI32, Ordering};

use shmbus_core::{Segment, SegmentKey};

/// Hand out a fresh benchmark key, unique within and across runs.
pub fn unique_key() -> SegmentKey {
    static NEXT: AtomicI32 = AtomicI32::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id() as i32;
    SegmentKey::new(0x4200_0000 | ((pid & 0xFF) << 16) | (n & 0xFFFF))
        .expect("benchmark key is never zero")
}

/// Key whose segment is removed on drop, so benchmarks never leak
/// kernel objects across runs.
pub struct ScopedKey(SegmentKey);

impl ScopedKey {
    pub fn fresh() -> Self {
        Self(unique_key())
    }

    pub fn key(&self) -> SegmentKey {
        self.0
    }
}

impl Drop for ScopedKey {
    fn drop(&mut self) {
        let _ = Segment::remove(self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_keys_differ() {
        assert_ne!(unique_key(), unique_key());
    }
}
