// SPDX-License-Identifier: Apache-2.0

//! Command implementations for the shmbus CLI.

pub mod create;
pub mod feed;
pub mod remove;
pub mod stat;
pub mod tail;
pub mod validate;

use shmbus_core::Ring;

use crate::config::BusConfig;
use crate::record::{self, BusMeta, LineRecord};

/// Attach to the configured bus.
///
/// Existing segments must carry matching metadata (magic, record size,
/// capacity, schema fingerprint) or the command refuses to run; a first
/// attach creates the bus and publishes that metadata instead.
pub(crate) fn attach_verified(cfg: &BusConfig) -> Ring<LineRecord, BusMeta> {
    let expected = record::bus_meta(&cfg.schema, cfg.slots);
    let ring = match Ring::attach_checked(cfg.key, cfg.slots, |meta: &BusMeta| *meta == expected) {
        Ok(ring) => ring,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };
    if ring.created() {
        ring.set_metadata(expected);
    }
    ring
}
