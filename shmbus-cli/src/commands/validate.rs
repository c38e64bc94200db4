// SPDX-License-Identifier: Apache-2.0

//! `shmbus validate` command - validate a configuration file.

use crate::config::ConfigLoader;

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(cfg) => {
            println!("✓ Configuration is valid");
            println!();
            println!("  Key:    {}", cfg.key);
            println!(
                "  Slots:  {} (effective {})",
                cfg.slots,
                cfg.slots.next_power_of_two()
            );
            println!("  Schema: {}", cfg.schema);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
