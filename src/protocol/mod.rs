//! Watchdog protocol: CAN transport primitives and the supervision tasks.
pub mod supervision;
pub mod transport;
