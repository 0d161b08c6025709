//! Receiver task tests driven by a scripted driver and a manual clock.
extern crate std;

use super::*;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::{command, CanId};
use crate::protocol::transport::traits::watchdog_clock::Timestamp;
use std::collections::VecDeque;

/// Replays a fixed sequence of driver results, then stays idle.
struct ScriptedBus {
    script: VecDeque<Result<Option<CanFrame>, ()>>,
}

impl ScriptedBus {
    fn new(script: impl IntoIterator<Item = Result<Option<CanFrame>, ()>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl CanReceiver for ScriptedBus {
    type Error = ();

    fn try_receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Clock that only moves when told to.
struct ManualClock(Timestamp);

impl WatchdogClock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.0
    }

    async fn delay_ms(&mut self, millis: u32) {
        self.0 = self.0.wrapping_add(millis);
    }
}

#[test]
/// Heartbeat frames land in the registry with the current time.
fn test_poll_records_heartbeat() {
    let registry = HeartbeatRegistry::<253>::new(0);
    let bus = ScriptedBus::new([Ok(Some(CanFrame::heartbeat(7)))]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(1_234), &registry, &WatchdogConfig::default());

    assert_eq!(receiver.poll_once(), PollOutcome::Recorded(7));
    assert_eq!(registry.last_seen(7), Some(1_234));
    assert_eq!(receiver.poll_once(), PollOutcome::Idle);
}

#[test]
/// At most one frame is consumed per poll.
fn test_poll_consumes_one_frame() {
    let registry = HeartbeatRegistry::<253>::new(0);
    let bus = ScriptedBus::new([
        Ok(Some(CanFrame::heartbeat(1))),
        Ok(Some(CanFrame::heartbeat(2))),
    ]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(0), &registry, &WatchdogConfig::default());

    assert_eq!(receiver.poll_once(), PollOutcome::Recorded(1));
    assert_eq!(registry.last_seen(2), None);
    assert_eq!(receiver.poll_once(), PollOutcome::Recorded(2));
}

#[test]
/// Driver errors are absorbed and the next poll works.
fn test_receive_error_is_transient() {
    let registry = HeartbeatRegistry::<253>::new(0);
    let bus = ScriptedBus::new([Err(()), Ok(Some(CanFrame::heartbeat(4)))]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(10), &registry, &WatchdogConfig::default());

    assert_eq!(receiver.poll_once(), PollOutcome::ReceiveError);
    assert_eq!(receiver.poll_once(), PollOutcome::Recorded(4));
}

#[test]
/// Senders beyond the table are dropped without touching it.
fn test_out_of_range_sender_rejected() {
    let registry = HeartbeatRegistry::<253>::new(0);
    let bus = ScriptedBus::new([Ok(Some(CanFrame::heartbeat(254)))]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(10), &registry, &WatchdogConfig::default());

    assert_eq!(receiver.poll_once(), PollOutcome::Rejected(254));
    assert_eq!(registry.observed_count(), 0);
}

#[test]
/// Non-heartbeat traffic does not count as a sign of life by default.
fn test_filter_applies() {
    let registry = HeartbeatRegistry::<253>::new(0);
    let alarm = CanFrame::new(CanId::builder(command::EMERGENCY_STOP, 9).build(), &[]);

    let bus = ScriptedBus::new([Ok(Some(alarm.clone()))]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(10), &registry, &WatchdogConfig::default());
    assert_eq!(receiver.poll_once(), PollOutcome::Ignored);
    assert_eq!(registry.last_seen(9), None);

    let bus = ScriptedBus::new([Ok(Some(alarm))]);
    let mut receiver =
        HeartbeatReceiver::new(bus, ManualClock(10), &registry, &WatchdogConfig::default())
            .with_filter(AcceptanceFilter::ACCEPT_ALL);
    assert_eq!(receiver.poll_once(), PollOutcome::Recorded(9));
}
