//! `shmbus stat` command - show bus segment facts.

use crate::config::BusConfig;

pub fn execute(cfg: &BusConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ring = super::attach_verified(cfg);
    let meta = ring.metadata();

    if json {
        let stats = serde_json::json!({
            "key": ring.key().value(),
            "slots": ring.slot_count(),
            "tail": ring.tail(),
            "record_size": meta.record_size,
            "schema_crc": meta.schema_crc,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Bus {}:", ring.key());
        println!("  Slots:       {}", ring.slot_count());
        println!("  Tail:        {}", ring.tail());
        println!("  Record size: {} bytes", meta.record_size);
        println!("  Schema CRC:  {:#010x}", meta.schema_crc);
    }
    Ok(())
}
