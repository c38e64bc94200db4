// SPDX-License-Identifier: Apache-2.0

//! Wire types the CLI puts on the bus.
//!
//! The record is a fixed 64-byte line cell; the metadata region carries
//! a magic tag, the record size, the effective capacity, and a CRC32
//! fingerprint of the schema tag, so mismatched attachments are refused
//! instead of misread.

use shmbus_core::Plain;

/// Payload bytes available in one record.
pub const LINE_BYTES: usize = 62;

/// Magic tag identifying a line bus ("SHB1").
pub const BUS_MAGIC: u32 = 0x5348_4231;

/// One bus record: a single line of text.
///
/// Lines longer than [`LINE_BYTES`] are truncated at a character
/// boundary; the unused tail is zeroed so equal lines compare byte for
/// byte.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRecord {
    len: u16,
    bytes: [u8; LINE_BYTES],
}

// SAFETY: repr(C), integer fields only, any bit pattern is valid; an
// out-of-range len is clamped on read.
unsafe impl Plain for LineRecord {}

impl LineRecord {
    /// Build a record from one line of text.
    pub fn from_line(line: &str) -> Self {
        let mut take = line.len().min(LINE_BYTES);
        while !line.is_char_boundary(take) {
            take -= 1;
        }
        let mut bytes = [0u8; LINE_BYTES];
        bytes[..take].copy_from_slice(&line.as_bytes()[..take]);
        Self {
            len: take as u16,
            bytes,
        }
    }

    /// The stored line. A length field beyond the payload (possible in
    /// records not written by this tool) is clamped.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        let len = usize::from(self.len).min(LINE_BYTES);
        String::from_utf8_lossy(&self.bytes[..len])
    }
}

/// Segment metadata published on create and verified on every other
/// attach.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusMeta {
    pub magic: u32,
    pub record_size: u32,
    pub slots: u64,
    pub schema_crc: u32,
}

// SAFETY: repr(C), integer fields only, any bit pattern is valid.
unsafe impl Plain for BusMeta {}

/// The metadata a bus with this schema and capacity request must carry.
pub fn bus_meta(schema: &str, min_slots: u64) -> BusMeta {
    BusMeta {
        magic: BUS_MAGIC,
        record_size: std::mem::size_of::<LineRecord>() as u32,
        slots: min_slots.next_power_of_two(),
        schema_crc: crc32fast::hash(schema.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_64_bytes() {
        assert_eq!(std::mem::size_of::<LineRecord>(), 64);
    }

    #[test]
    fn test_from_line_roundtrip() {
        let record = LineRecord::from_line("hello bus");
        assert_eq!(record.text(), "hello bus");
    }

    #[test]
    fn test_from_line_truncates_long_lines() {
        let long = "x".repeat(200);
        let record = LineRecord::from_line(&long);
        assert_eq!(record.text().len(), LINE_BYTES);
    }

    #[test]
    fn test_from_line_respects_char_boundaries() {
        // Three-byte characters; byte 62 falls inside the 21st one.
        let line = "€".repeat(30);
        let record = LineRecord::from_line(&line);
        let text = record.text();
        assert_eq!(text.len(), 60);
        assert!(text.chars().all(|c| c == '€'));
    }

    #[test]
    fn test_text_clamps_garbage_length() {
        let mut record = LineRecord::from_line("ok");
        record.len = u16::MAX;
        // Must not panic; the clamped payload is still renderable.
        let _ = record.text();
    }

    #[test]
    fn test_equal_lines_compare_equal() {
        assert_eq!(LineRecord::from_line("same"), LineRecord::from_line("same"));
        assert_ne!(LineRecord::from_line("same"), LineRecord::from_line("different"));
    }

    #[test]
    fn test_bus_meta_fingerprints_schema() {
        let a = bus_meta("line-v1", 1000);
        let b = bus_meta("line-v1", 1000);
        let c = bus_meta("line-v2", 1000);
        assert_eq!(a, b);
        assert_ne!(a.schema_crc, c.schema_crc);
        assert_eq!(a.magic, BUS_MAGIC);
        assert_eq!(a.record_size, 64);
        assert_eq!(a.slots, 1024);
    }
}
