//! `shmbus feed` command - push stdin lines onto the bus.

use std::io::BufRead;

use crate::config::BusConfig;
use crate::record::LineRecord;

pub fn execute(cfg: &BusConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ring = super::attach_verified(cfg);
    tracing::info!(key = %cfg.key, "Feeding stdin to bus");

    let stdin = std::io::stdin();
    let mut pushed = 0u64;
    let mut last_seq = 0u64;
    for line in stdin.lock().lines() {
        let line = line?;
        last_seq = ring.push(&LineRecord::from_line(&line));
        pushed += 1;
    }

    if pushed > 0 {
        println!("✓ Pushed {} records, last sequence {}", pushed, last_seq);
    } else {
        println!("✓ Pushed 0 records");
    }
    Ok(())
}
