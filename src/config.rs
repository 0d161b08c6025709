//! Watchdog configuration: timings, monitor identity, and bus settings.
//!
//! Defaults reproduce the deployed monitor: 500 ms timeout, 100 ms scan,
//! 10 ms receive poll, monitor on node 0, 1 Mbit/s bus with the controller
//! filtering on heartbeat frames.
use embassy_time::Duration;

use crate::error::ConfigError;
use crate::protocol::transport::can_id::{AcceptanceFilter, NodeId, PRIORITY_ALARM};
use crate::protocol::transport::CAN_BITRATE;

//==================================================================================DEFAULTS
/// Maximum allowed silence before a satellite is declared unresponsive (ms).
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u64 = 500;
/// Period of the timeout scan (ms). Detection latency is at most timeout + scan.
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 100;
/// Period of the receive poll (ms). Must keep up with the driver RX buffer.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
/// Heartbeat table size: node IDs `0..253`, scanned from 1.
pub const DEFAULT_MAX_NODE_ID: usize = 253;
/// Node ID of the monitor itself.
pub const DEFAULT_THIS_NODE_ID: NodeId = 0;

//==================================================================================WATCHDOG_CONFIG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Runtime parameters shared by the receiver and monitor tasks.
pub struct WatchdogConfig {
    pub watchdog_timeout: Duration,
    pub scan_interval: Duration,
    pub poll_interval: Duration,
    /// Monitor node ID. Must match the registry's self ID (checked by `bring_up`).
    pub this_node_id: NodeId,
    /// Arbitration priority of alarm frames.
    pub alarm_priority: u8,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogConfig {
    /// Deployed defaults.
    pub const fn new() -> Self {
        Self {
            watchdog_timeout: Duration::from_millis(DEFAULT_WATCHDOG_TIMEOUT_MS),
            scan_interval: Duration::from_millis(DEFAULT_SCAN_INTERVAL_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            this_node_id: DEFAULT_THIS_NODE_ID,
            alarm_priority: PRIORITY_ALARM,
        }
    }

    pub fn with_watchdog_timeout(mut self, timeout: Duration) -> Self {
        self.watchdog_timeout = timeout;
        self
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_this_node_id(mut self, id: NodeId) -> Self {
        self.this_node_id = id;
        self
    }

    pub fn with_alarm_priority(mut self, priority: u8) -> Self {
        self.alarm_priority = priority;
        self
    }

    /// Check the configuration against a table of `capacity` entries.
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if !(2..=256).contains(&capacity) {
            return Err(ConfigError::InvalidCapacity { capacity });
        }
        if self.this_node_id as usize >= capacity {
            return Err(ConfigError::SelfIdOutOfRange {
                id: self.this_node_id,
                capacity,
            });
        }
        if self.poll_interval.as_millis() == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.scan_interval.as_millis() == 0 {
            return Err(ConfigError::ZeroScanInterval);
        }
        let timeout_ms = self.watchdog_timeout.as_millis();
        let scan_ms = self.scan_interval.as_millis();
        if scan_ms >= timeout_ms {
            return Err(ConfigError::ScanIntervalTooCoarse {
                scan_ms,
                timeout_ms,
            });
        }
        // Wrapping comparison only works below half the counter range.
        if timeout_ms > (u32::MAX / 2) as u64 {
            return Err(ConfigError::DurationTooLong { ms: timeout_ms });
        }
        Ok(())
    }

    /// Watchdog timeout in clock units.
    pub fn timeout_ms(&self) -> u32 {
        saturate_ms(self.watchdog_timeout)
    }

    pub fn scan_interval_ms(&self) -> u32 {
        saturate_ms(self.scan_interval)
    }

    pub fn poll_interval_ms(&self) -> u32 {
        saturate_ms(self.poll_interval)
    }
}

fn saturate_ms(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

//==================================================================================BUS_SETTINGS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Controller settings handed to [`CanBusInit::begin`](crate::protocol::transport::traits::can_bus::CanBusInit::begin).
pub struct BusSettings {
    /// Bitrate in bit/s.
    pub bitrate: u32,
    /// GPIO number of the transceiver RX line.
    pub rx_pin: u8,
    /// GPIO number of the transceiver TX line.
    pub tx_pin: u8,
    /// Hardware acceptance filter.
    pub filter: AcceptanceFilter,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            bitrate: CAN_BITRATE,
            rx_pin: 22,
            tx_pin: 23,
            filter: AcceptanceFilter::HEARTBEAT,
        }
    }
}
