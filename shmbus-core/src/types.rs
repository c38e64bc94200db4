// SPDX-License-Identifier: Apache-2.0

//! Newtype wrappers for validated inputs.
//!
//! Invalid keys are rejected at construction so the syscall layer only
//! ever sees values that can actually name a segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BusError;

/// Validated System V IPC key.
///
/// Key 0 is `IPC_PRIVATE`: it never names a shared segment and would
/// silently hand every caller a fresh anonymous one, so it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct SegmentKey(i32);

impl SegmentKey {
    /// Create a new SegmentKey with validation.
    pub fn new(key: i32) -> Result<Self, BusError> {
        if key == 0 {
            return Err(BusError::InvalidKey {
                key,
                reason: "key 0 is IPC_PRIVATE and cannot name a shared segment".to_string(),
            });
        }
        Ok(Self(key))
    }

    /// Get the inner key value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for SegmentKey {
    type Error = BusError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SegmentKey> for i32 {
    fn from(key: SegmentKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_key_valid() {
        assert!(SegmentKey::new(1).is_ok());
        assert!(SegmentKey::new(-7).is_ok());
        assert!(SegmentKey::new(i32::MAX).is_ok());
    }

    #[test]
    fn test_segment_key_rejects_ipc_private() {
        assert!(SegmentKey::new(0).is_err());
    }

    #[test]
    fn test_segment_key_display() {
        let key = SegmentKey::new(5150).unwrap();
        assert_eq!(key.to_string(), "5150");
        assert_eq!(key.value(), 5150);
    }
}
