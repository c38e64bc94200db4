// SPDX-License-Identifier: Apache-2.0

//! `shmbus create` command - create and initialize the bus segment.

use crate::config::BusConfig;

pub fn execute(cfg: &BusConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(key = %cfg.key, slots = cfg.slots, schema = %cfg.schema, "Creating bus segment");

    let ring = super::attach_verified(cfg);
    if ring.created() {
        println!("✓ Created bus {} with {} slots", cfg.key, ring.slot_count());
    } else {
        println!(
            "✓ Bus {} already exists ({} slots, {} records admitted)",
            cfg.key,
            ring.slot_count(),
            ring.tail()
        );
    }
    Ok(())
}
