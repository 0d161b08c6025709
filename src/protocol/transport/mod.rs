//! Watchdog transport layer: 29-bit identifier layout, CAN frame
//! representation, and bus/clock abstraction traits.
//!
//! ## Bus constants
//!
//! Every participant of the satellite bus shares these values. They are
//! deployment parameters, collected in [`BusSettings`](crate::config::BusSettings).

pub mod can_frame;
pub mod can_id;
pub mod traits;

/// Nominal bus bitrate (bit/s).
///
/// The satellite bus runs at 1 Mbit/s. At this rate a full extended frame
/// (29-bit ID, 8 data bytes, worst-case stuffing) occupies the bus for about
/// 160 µs, so a 10 ms receive poll sees at most a few dozen frames per tick.
pub const CAN_BITRATE: u32 = 1_000_000;

/// Maximum number of data bytes in a classic CAN frame.
pub const MAX_FRAME_DATA: usize = 8;
