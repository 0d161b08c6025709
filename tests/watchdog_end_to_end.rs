//! End-to-end supervision: both tasks running on an in-memory bus with a
//! paused tokio clock.
mod helpers;

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};
use helpers::{create_bus, TokioClock};
use sat_watchdog::config::WatchdogConfig;
use sat_watchdog::protocol::supervision::{
    monitor::{TimeoutEvent, TimeoutMonitor},
    receiver::HeartbeatReceiver,
    registry::HeartbeatRegistry,
    watchdog::run_watchdog,
};
use sat_watchdog::protocol::transport::{
    can_frame::{CanFrame, ESTOP_CODE},
    can_id::command,
};
use static_cell::StaticCell;
use tokio::time::{sleep, Duration, Instant};

#[tokio::test(start_paused = true)]
async fn silent_satellite_triggers_emergency_stop() {
    static REGISTRY: HeartbeatRegistry<253> = HeartbeatRegistry::new(0);
    let events = Channel::<NoopRawMutex, TimeoutEvent, 16>::new();

    let (rx, tx, mut host) = create_bus();
    let config = WatchdogConfig::default();
    let clock = TokioClock::new();
    let receiver = HeartbeatReceiver::new(rx, clock.clone(), &REGISTRY, &config);
    let monitor = TimeoutMonitor::new(tx, clock, &REGISTRY, Some(&events), &config);

    tokio::select! {
        _ = run_watchdog(receiver, monitor) => unreachable!("watchdog never returns"),

        _ = async {
            // One second of healthy traffic from satellites 3 and 7.
            for _ in 0..10 {
                host.send(CanFrame::heartbeat(3));
                host.send(CanFrame::heartbeat(7));
                sleep(Duration::from_millis(100)).await;
            }
            assert!(host.try_recv().is_none(), "no alarm while every satellite beats");
            assert!(events.try_receive().is_err());

            // Satellite 7 goes silent, 3 keeps beating.
            host.send(CanFrame::heartbeat(7));
            let last_beat = Instant::now();
            let alarm = loop {
                host.send(CanFrame::heartbeat(3));
                sleep(Duration::from_millis(10)).await;
                if let Some(frame) = host.try_recv() {
                    break frame;
                }
                // Keep 3 at 10 ms cadence; the receiver drains one frame per poll.
            };
            let latency = last_beat.elapsed();

            assert!(latency > Duration::from_millis(500), "alarm too early: {latency:?}");
            assert!(latency <= Duration::from_millis(650), "alarm too late: {latency:?}");
            assert_eq!(alarm.id.command(), command::EMERGENCY_STOP);
            assert_eq!(alarm.id.sender(), 0);
            assert_eq!(alarm.payload(), &[0, 0, 0, 0, ESTOP_CODE]);

            let event = events.try_receive().expect("timeout event published");
            assert_eq!(event.node, 7);
            assert!(event.alarm_sent);
        } => {}
    }
}

#[tokio::test(start_paused = true)]
async fn alarm_repeats_until_satellite_recovers() {
    static REGISTRY: HeartbeatRegistry<253> = HeartbeatRegistry::new(0);

    let (rx, tx, mut host) = create_bus();
    let config = WatchdogConfig::default();
    let clock = TokioClock::new();
    let receiver = HeartbeatReceiver::new(rx, clock.clone(), &REGISTRY, &config);
    let monitor: TimeoutMonitor<_, _, NoopRawMutex, 253, 0> =
        TimeoutMonitor::new(tx, clock, &REGISTRY, None, &config);

    tokio::select! {
        _ = run_watchdog(receiver, monitor) => unreachable!("watchdog never returns"),

        _ = async {
            host.send(CanFrame::heartbeat(42));

            // First alarm after the timeout, then one per scan.
            let first = host.recv().await.expect("first alarm");
            let first_at = Instant::now();
            let second = host.recv().await.expect("second alarm");
            assert_eq!(first, second);
            assert!(first_at.elapsed() <= Duration::from_millis(110));

            // Satellite 42 comes back: alarms stop at the next scan.
            host.send(CanFrame::heartbeat(42));
            sleep(Duration::from_millis(150)).await;
            while host.try_recv().is_some() {}

            for _ in 0..8 {
                host.send(CanFrame::heartbeat(42));
                sleep(Duration::from_millis(100)).await;
                assert!(host.try_recv().is_none(), "alarm after recovery");
            }
        } => {}
    }
}

#[tokio::test(start_paused = true)]
async fn monitor_id_and_foreign_senders_never_alarm() {
    // Self ID comes from runtime configuration, hence a cell rather than a const static.
    static REGISTRY: StaticCell<HeartbeatRegistry<253>> = StaticCell::new();
    let config = WatchdogConfig::default().with_this_node_id(252);
    let registry: &'static HeartbeatRegistry<253> =
        REGISTRY.init(HeartbeatRegistry::new(config.this_node_id));

    let (rx, tx, mut host) = create_bus();
    let clock = TokioClock::new();
    let receiver = HeartbeatReceiver::new(rx, clock.clone(), registry, &config);
    let monitor: TimeoutMonitor<_, _, NoopRawMutex, 253, 0> =
        TimeoutMonitor::new(tx, clock, registry, None, &config);

    tokio::select! {
        _ = run_watchdog(receiver, monitor) => unreachable!("watchdog never returns"),

        _ = async {
            // Own heartbeat echoed once, then silence; plus a sender beyond the table.
            host.send(CanFrame::heartbeat(252));
            host.send(CanFrame::heartbeat(254));
            sleep(Duration::from_secs(5)).await;

            assert!(host.try_recv().is_none());
            assert!(registry.last_seen(252).is_some());
            assert_eq!(registry.last_seen(254), None);
        } => {}
    }
}
