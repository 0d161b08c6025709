//! `sat-watchdog` library: liveness supervision of CAN bus satellites in a
//! `no_std` environment. A monitor node records the heartbeat of every
//! satellite and raises an emergency-stop alarm on the bus when one goes
//! silent for longer than the watchdog timeout.
#![no_std]
//==================================================================================
/// Runtime configuration: watchdog timings, monitor identity, bus settings.
pub mod config;
/// Registry, configuration, and bus bring-up errors.
pub mod error;
/// CAN transport (identifier layout, frames, driver traits) and the
/// supervision tasks built on top of it.
pub mod protocol;
//==================================================================================

/// Project name reported in the startup banner.
pub const PROJECT: &str = "Satellites Watchdog";
/// Crate version reported in the startup banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
