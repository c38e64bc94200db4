// SPDX-License-Identifier: Apache-2.0

//! `shmbus tail` command - follow records from the bus.

use std::time::Duration;

use crate::config::BusConfig;

pub fn execute(
    cfg: &BusConfig,
    from: Option<u64>,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ring = super::attach_verified(cfg);
    match from {
        Some(seq) => ring.set_read_position(seq),
        None => ring.attach_latest(),
    }
    tracing::info!(key = %cfg.key, cursor = ring.cursor(), "Following bus");

    let mut seen = 0u64;
    while limit.map_or(true, |n| seen < n) {
        match ring.try_next() {
            Some((seq, record)) => {
                println!("{:>10}  {}", seq, record.text());
                seen += 1;
            }
            // Polling bus; a short sleep keeps the idle loop cheap.
            None => std::thread::sleep(Duration::from_millis(1)),
        }
    }
    Ok(())
}
