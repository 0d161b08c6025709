//! Abstraction traits used by the transport layer (CAN driver halves and clock).
pub mod can_bus;
pub mod watchdog_clock;
