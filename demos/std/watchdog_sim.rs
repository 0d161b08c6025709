//! # Watchdog simulation
//!
//! Runs the monitor against three simulated satellites on an in-memory bus.
//! Satellite 2 stops beating after two seconds; the monitor reports it and
//! broadcasts emergency-stop frames until the simulation ends.
//!
//! ```bash
//! cargo run --example watchdog_sim
//! ```

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};
use sat_watchdog::{
    config::{BusSettings, WatchdogConfig},
    protocol::{
        supervision::{
            monitor::{TimeoutEvent, TimeoutMonitor},
            receiver::HeartbeatReceiver,
            registry::HeartbeatRegistry,
            watchdog::{bring_up, run_watchdog},
        },
        transport::{
            can_frame::CanFrame,
            traits::{
                can_bus::{CanBusInit, CanReceiver, CanTransmitter},
                watchdog_clock::{Timestamp, WatchdogClock},
            },
        },
    },
    PROJECT, VERSION,
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{sleep, Duration, Instant};

// ============================================================================
// In-memory driver
// ============================================================================

struct SimController;

impl CanBusInit for SimController {
    type Error = ();

    fn begin(&mut self, settings: &BusSettings) -> Result<(), Self::Error> {
        println!(
            "Configure CAN: {} bit/s, rx GPIO{}, tx GPIO{} ok",
            settings.bitrate, settings.rx_pin, settings.tx_pin
        );
        Ok(())
    }
}

struct SimRx(mpsc::UnboundedReceiver<CanFrame>);

impl CanReceiver for SimRx {
    type Error = ();

    fn try_receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        match self.0.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(()),
        }
    }
}

struct SimTx(mpsc::UnboundedSender<CanFrame>);

impl CanTransmitter for SimTx {
    type Error = ();

    fn try_send(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        self.0.send(frame.clone()).map_err(|_| ())
    }
}

#[derive(Clone)]
struct SimClock(Instant);

impl WatchdogClock for SimClock {
    fn now_ms(&self) -> Timestamp {
        self.0.elapsed().as_millis() as Timestamp
    }

    async fn delay_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

// ============================================================================
// Simulation
// ============================================================================

static REGISTRY: HeartbeatRegistry<253> = HeartbeatRegistry::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("\n\nProject :    {PROJECT}");
    println!("Version :    {VERSION}\n");

    let config = WatchdogConfig::default();
    if let Err(err) = bring_up(&mut SimController, &BusSettings::default(), &config, &REGISTRY) {
        eprintln!("error {err}");
        return;
    }

    let (to_monitor, monitor_rx) = mpsc::unbounded_channel();
    let (monitor_tx, mut from_monitor) = mpsc::unbounded_channel();
    let events = Channel::<NoopRawMutex, TimeoutEvent, 8>::new();

    let clock = SimClock(Instant::now());
    let receiver = HeartbeatReceiver::new(SimRx(monitor_rx), clock.clone(), &REGISTRY, &config);
    let monitor = TimeoutMonitor::new(SimTx(monitor_tx), clock, &REGISTRY, Some(&events), &config);

    let satellites = async {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(4) {
            for id in [1u8, 2, 3] {
                // Satellite 2 dies after two seconds.
                if id == 2 && start.elapsed() > Duration::from_secs(2) {
                    continue;
                }
                let _ = to_monitor.send(CanFrame::heartbeat(id));
            }
            sleep(Duration::from_millis(100)).await;

            while let Ok(event) = events.try_receive() {
                println!(
                    "No sign of life from satellite {} (last seen {} ms, now {} ms)",
                    event.node, event.last_seen, event.detected_at
                );
            }
            while let Ok(frame) = from_monitor.try_recv() {
                println!(
                    "  alarm on bus: id 0x{:08X}, payload {:02X?}",
                    frame.id.0,
                    frame.payload()
                );
            }
        }
    };

    tokio::select! {
        _ = run_watchdog(receiver, monitor) => {}
        _ = satellites => println!("\nSimulation complete."),
    }
}
