//! Test doubles to simulate the CAN driver and the clock during integration tests.
#![allow(dead_code)]

use sat_watchdog::config::BusSettings;
use sat_watchdog::protocol::transport::{
    can_frame::CanFrame,
    traits::{
        can_bus::{CanBusInit, CanReceiver, CanTransmitter},
        watchdog_clock::{Timestamp, WatchdogClock},
    },
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{sleep, Duration, Instant};

/// Receive half of the monitor's driver.
pub struct MockRx {
    rx: mpsc::UnboundedReceiver<CanFrame>,
}

/// Transmit half of the monitor's driver.
pub struct MockTx {
    tx: mpsc::UnboundedSender<CanFrame>,
}

/// The rest of the bus, as seen by the test: satellites sending heartbeats,
/// and a listener collecting alarms.
pub struct HostBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: mpsc::UnboundedReceiver<CanFrame>,
}

impl HostBus {
    pub fn send(&self, frame: CanFrame) {
        self.tx.send(frame).expect("monitor side dropped");
    }

    pub fn try_recv(&mut self) -> Option<CanFrame> {
        self.rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<CanFrame> {
        self.rx.recv().await
    }
}

/// Construct an interconnected bus: monitor halves ↔ host.
pub fn create_bus() -> (MockRx, MockTx, HostBus) {
    let (host_tx, dut_rx) = mpsc::unbounded_channel();
    let (dut_tx, host_rx) = mpsc::unbounded_channel();
    (
        MockRx { rx: dut_rx },
        MockTx { tx: dut_tx },
        HostBus {
            tx: host_tx,
            rx: host_rx,
        },
    )
}

impl CanReceiver for MockRx {
    type Error = ();

    fn try_receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(()),
        }
    }
}

impl CanTransmitter for MockTx {
    type Error = ();

    fn try_send(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())
    }
}

#[derive(Clone)]
/// Clock based on `tokio::time`, deterministic under a paused runtime.
pub struct TokioClock {
    epoch: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl WatchdogClock for TokioClock {
    fn now_ms(&self) -> Timestamp {
        self.epoch.elapsed().as_millis() as Timestamp
    }

    async fn delay_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

#[derive(Default)]
/// Controller stub recording its settings; fails on demand.
pub struct StubController {
    pub started_with: Option<BusSettings>,
    pub error_code: Option<u32>,
}

impl CanBusInit for StubController {
    type Error = u32;

    fn begin(&mut self, settings: &BusSettings) -> Result<(), Self::Error> {
        if let Some(code) = self.error_code {
            return Err(code);
        }
        self.started_with = Some(*settings);
        Ok(())
    }
}
