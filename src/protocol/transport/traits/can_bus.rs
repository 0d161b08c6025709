//! Minimal abstraction over a CAN driver. The watchdog needs three
//! operations: bring the controller up, poll for one inbound frame, and try to
//! push one outbound frame. Receive and transmit are separate traits so the
//! receiver task and the monitor task can each own one half of the driver.
use crate::config::BusSettings;
use crate::protocol::transport::can_frame::CanFrame;

/// Controller bring-up (bitrate, pins, acceptance filter).
pub trait CanBusInit {
    type Error: core::fmt::Debug;
    /// Configure and start the controller. A failure here is fatal.
    fn begin(&mut self, settings: &BusSettings) -> Result<(), Self::Error>;
}

/// Receive half of the driver. A single task reads from it.
pub trait CanReceiver {
    type Error: core::fmt::Debug;
    /// Non-blocking poll: `Ok(None)` when no frame is pending.
    fn try_receive(&mut self) -> Result<Option<CanFrame>, Self::Error>;
}

/// Transmit half of the driver. A single task writes to it.
pub trait CanTransmitter {
    type Error: core::fmt::Debug;
    /// Non-blocking send. An error means the frame was not queued (TX buffer
    /// full, bus-off...). Callers do not retry within the same tick.
    fn try_send(&mut self, frame: &CanFrame) -> Result<(), Self::Error>;
}

impl<T: CanReceiver + ?Sized> CanReceiver for &mut T {
    type Error = T::Error;
    fn try_receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        (**self).try_receive()
    }
}

impl<T: CanTransmitter + ?Sized> CanTransmitter for &mut T {
    type Error = T::Error;
    fn try_send(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        (**self).try_send(frame)
    }
}
