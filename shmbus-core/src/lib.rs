//! shmbus Core Library
//!
//! Lock-free broadcast bus over System V shared memory. A fixed-capacity
//! ring of fixed-size records lives inside a segment named by an integer
//! key; any number of processes attach, producers publish with a single
//! atomic claim per record, and every consumer follows the stream with
//! its own private cursor.

pub mod error;
mod layout;
pub mod plain;
pub mod ring;
pub mod segment;
pub mod types;

// Re-export commonly used types
pub use error::{BusError, BusResult};
pub use plain::Plain;
pub use ring::{Reservation, Ring};
pub use segment::Segment;
pub use types::SegmentKey;
