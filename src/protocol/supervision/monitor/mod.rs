//! Monitor task: periodic timeout scan and alarm emission.
//!
//! Each tick scans the registry once. For every satellite silent for longer
//! than the watchdog timeout it:
//!
//! * logs a warning naming the satellite;
//! * pushes a [`TimeoutEvent`] to the optional application channel;
//! * tries to send one emergency-stop frame.
//!
//! A failed send is reported and left alone. The silent satellite's entry is
//! not touched, so the next scan detects it again and sends again.
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};

use crate::config::WatchdogConfig;
use crate::protocol::supervision::registry::HeartbeatRegistry;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::NodeId;
use crate::protocol::transport::traits::{
    can_bus::CanTransmitter,
    watchdog_clock::{Timestamp, WatchdogClock},
};

/// One detected timeout, as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeoutEvent {
    /// Unresponsive satellite.
    pub node: NodeId,
    /// Time of the scan that detected it.
    pub detected_at: Timestamp,
    /// Last heartbeat received from it.
    pub last_seen: Timestamp,
    /// Whether the alarm frame was accepted by the driver.
    pub alarm_sent: bool,
}

/// Summary of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanReport {
    pub timed_out: usize,
    pub alarms_sent: usize,
    pub send_failures: usize,
}

/// Owns the transmit half of the driver and a clock; shares the registry.
///
/// `events` is an optional pre-allocated channel; when it is full, new events
/// are dropped rather than stalling the scan. It is the only timeout
/// diagnostic when the `defmt` feature is off: without it, the alarm frame on
/// the bus and the returned [`ScanReport`] are all that is left.
///
/// Alarm frames carry `registry.self_id()` as sender, the same ID the scan
/// excludes.
pub struct TimeoutMonitor<'r, T, C, M, const N: usize, const EVT_CAP: usize>
where
    T: CanTransmitter,
    C: WatchdogClock,
    M: RawMutex,
{
    bus: T,
    clock: C,
    registry: &'r HeartbeatRegistry<N>,
    events: Option<&'r Channel<M, TimeoutEvent, EVT_CAP>>,
    timeout_ms: u32,
    scan_interval_ms: u32,
    alarm: CanFrame,
}

impl<'r, T, C, M, const N: usize, const EVT_CAP: usize> TimeoutMonitor<'r, T, C, M, N, EVT_CAP>
where
    T: CanTransmitter,
    C: WatchdogClock,
    M: RawMutex,
{
    pub fn new(
        bus: T,
        clock: C,
        registry: &'r HeartbeatRegistry<N>,
        events: Option<&'r Channel<M, TimeoutEvent, EVT_CAP>>,
        config: &WatchdogConfig,
    ) -> Self {
        Self {
            bus,
            clock,
            registry,
            events,
            timeout_ms: config.timeout_ms(),
            scan_interval_ms: config.scan_interval_ms(),
            alarm: CanFrame::emergency_stop(registry.self_id(), config.alarm_priority),
        }
    }

    /// Frame sent for every detected timeout.
    pub fn alarm_frame(&self) -> &CanFrame {
        &self.alarm
    }

    /// One scan without the trailing delay.
    pub fn scan_once(&mut self) -> ScanReport {
        let now = self.clock.now_ms();
        let mut report = ScanReport::default();

        for node in self.registry.scan_for_timeouts(now, self.timeout_ms) {
            report.timed_out += 1;

            #[cfg(feature = "defmt")]
            defmt::warn!("No sign of life from satellite {}", node);

            let alarm_sent = match self.bus.try_send(&self.alarm) {
                Ok(()) => {
                    report.alarms_sent += 1;
                    true
                }
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "Alarm for satellite {} not sent: {}",
                        node,
                        defmt::Debug2Format(&_err)
                    );
                    report.send_failures += 1;
                    false
                }
            };

            if let Some(channel) = self.events {
                let event = TimeoutEvent {
                    node,
                    detected_at: now,
                    // Re-read: the receiver may have refreshed it mid-scan.
                    last_seen: self.registry.last_seen(node).unwrap_or(now),
                    alarm_sent,
                };
                if channel.try_send(event).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Timeout event channel full, dropping event");
                }
            }
        }

        report
    }

    /// Perpetual scan loop.
    pub async fn run(mut self) -> ! {
        loop {
            self.scan_once();
            self.clock.delay_ms(self.scan_interval_ms).await;
        }
    }
}
