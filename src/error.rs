//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (configuration, registry
//! bounds, bus bring-up).
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised by the heartbeat registry.
pub enum RegistryError {
    /// The sender ID does not fit in the table. The heartbeat is dropped.
    #[error("Node id {id} out of range (capacity {capacity})")]
    NodeIdOutOfRange { id: u8, capacity: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Rejected watchdog configuration.
pub enum ConfigError {
    /// Receive polling interval must be strictly positive.
    #[error("Poll interval must be non-zero")]
    ZeroPollInterval,
    /// Scan interval must be strictly positive.
    #[error("Scan interval must be non-zero")]
    ZeroScanInterval,
    /// Detection latency is timeout + one scan interval: the scan must be finer than the timeout.
    #[error("Scan interval ({scan_ms} ms) must be below the watchdog timeout ({timeout_ms} ms)")]
    ScanIntervalTooCoarse { scan_ms: u64, timeout_ms: u64 },
    /// The monitor's own ID must index into the table.
    #[error("Monitor node id {id} outside table (capacity {capacity})")]
    SelfIdOutOfRange { id: u8, capacity: usize },
    /// The registry was built for another monitor ID than the configuration names.
    #[error("Registry self id {registry} differs from configured node id {config}")]
    SelfIdMismatch { registry: u8, config: u8 },
    /// Table size must cover at least one satellite and fit the 8-bit sender field.
    #[error("Invalid registry capacity {capacity}")]
    InvalidCapacity { capacity: usize },
    /// A duration does not fit the 32-bit millisecond clock.
    #[error("Duration too long: {ms} ms")]
    DurationTooLong { ms: u64 },
}

//==================================================================================WATCHDOG_ERROR
#[derive(Error, Debug)]
/// Startup failures. Everything else is handled inside the task loops.
pub enum WatchdogError<E: core::fmt::Debug> {
    /// CAN driver refused to start. Fatal, never retried.
    #[error("CAN bus initialization failed: {0:?}")]
    BusInit(E),
    /// Configuration rejected before touching the bus.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
