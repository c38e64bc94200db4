//! `shmbus remove` command - delete the shared memory segment.

use shmbus_core::Segment;

use crate::config::BusConfig;

pub fn execute(cfg: &BusConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(key = %cfg.key, "Removing bus");
    match Segment::remove(cfg.key) {
        Ok(()) => {
            println!("✓ Removed bus {}", cfg.key);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}
