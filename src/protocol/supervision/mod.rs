//! Liveness supervision: the heartbeat registry and the two perpetual tasks
//! (receiver and monitor) sharing it, plus the runner that starts them.
pub mod monitor;
pub mod receiver;
pub mod registry;
pub mod watchdog;
