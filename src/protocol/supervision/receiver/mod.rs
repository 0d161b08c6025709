//! Receiver task: drains the bus one frame per tick and feeds the registry.
//!
//! Single state, no transitions: poll, record, sleep `poll_interval`, repeat.
//! Nothing that happens on the bus can stop the loop.
use crate::config::WatchdogConfig;
use crate::protocol::supervision::registry::HeartbeatRegistry;
use crate::protocol::transport::can_id::{decode_sender_id, AcceptanceFilter, NodeId};
use crate::protocol::transport::traits::{can_bus::CanReceiver, watchdog_clock::WatchdogClock};

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No frame pending.
    Idle,
    /// Heartbeat recorded for this node.
    Recorded(NodeId),
    /// Frame did not pass the software acceptance filter.
    Ignored,
    /// Sender ID does not fit the registry; frame dropped.
    Rejected(NodeId),
    /// Driver reported an error; retried on the next tick.
    ReceiveError,
}

/// Owns the receive half of the driver and a clock; shares the registry.
pub struct HeartbeatReceiver<'r, R: CanReceiver, C: WatchdogClock, const N: usize> {
    bus: R,
    clock: C,
    registry: &'r HeartbeatRegistry<N>,
    filter: AcceptanceFilter,
    poll_interval_ms: u32,
}

impl<'r, R, C, const N: usize> HeartbeatReceiver<'r, R, C, N>
where
    R: CanReceiver,
    C: WatchdogClock,
{
    pub fn new(bus: R, clock: C, registry: &'r HeartbeatRegistry<N>, config: &WatchdogConfig) -> Self {
        Self {
            bus,
            clock,
            registry,
            filter: AcceptanceFilter::HEARTBEAT,
            poll_interval_ms: config.poll_interval_ms(),
        }
    }

    /// Replace the software filter (the default only keeps heartbeats).
    ///
    /// Use [`AcceptanceFilter::ACCEPT_ALL`] when the controller already
    /// filters in hardware, or when every frame counts as a sign of life.
    pub fn with_filter(mut self, filter: AcceptanceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// One iteration without the trailing delay.
    pub fn poll_once(&mut self) -> PollOutcome {
        let frame = match self.bus.try_receive() {
            Ok(Some(frame)) => frame,
            Ok(None) => return PollOutcome::Idle,
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("CAN receive error: {}", defmt::Debug2Format(&_err));
                return PollOutcome::ReceiveError;
            }
        };

        if !self.filter.matches(frame.id) {
            #[cfg(feature = "defmt")]
            defmt::trace!("Ignoring frame {=u32:#x}", frame.id.0);
            return PollOutcome::Ignored;
        }

        let sender = decode_sender_id(frame.id.0);
        match self.registry.record_heartbeat(sender, self.clock.now_ms()) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Heartbeat from satellite {}", sender);
                PollOutcome::Recorded(sender)
            }
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Dropping heartbeat: {}", _err);
                PollOutcome::Rejected(sender)
            }
        }
    }

    /// Perpetual receive loop.
    pub async fn run(mut self) -> ! {
        loop {
            self.poll_once();
            self.clock.delay_ms(self.poll_interval_ms).await;
        }
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
