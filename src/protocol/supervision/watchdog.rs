//! Watchdog bring-up and runner.
//!
//! [`bring_up`] validates the configuration, prints the startup banner, and
//! starts the controller. It is the only fallible step: once the bus is up,
//! the receiver and the monitor run forever.
//!
//! The two tasks can be spawned separately (one executor task each, possibly
//! on different cores) or driven together on one task with [`run_watchdog`].

use core::fmt::Debug;

use futures_util::{future::select, future::Either, pin_mut};

use crate::config::{BusSettings, WatchdogConfig};
use crate::error::{ConfigError, WatchdogError};
use crate::protocol::supervision::{
    monitor::TimeoutMonitor, receiver::HeartbeatReceiver, registry::HeartbeatRegistry,
};
use crate::protocol::transport::traits::{
    can_bus::{CanBusInit, CanReceiver, CanTransmitter},
    watchdog_clock::WatchdogClock,
};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Check `config` against `registry`, then start the controller.
///
/// A driver error is returned as [`WatchdogError::BusInit`] and must halt the
/// firmware: bring-up is never retried automatically.
pub fn bring_up<B: CanBusInit, const N: usize>(
    driver: &mut B,
    settings: &BusSettings,
    config: &WatchdogConfig,
    registry: &HeartbeatRegistry<N>,
) -> Result<(), WatchdogError<B::Error>>
where
    B::Error: Debug,
{
    #[cfg(feature = "defmt")]
    defmt::info!(
        "Project : {=str} - Version : {=str}",
        crate::PROJECT,
        crate::VERSION
    );

    config.validate(registry.capacity())?;
    if registry.self_id() != config.this_node_id {
        return Err(WatchdogError::Config(ConfigError::SelfIdMismatch {
            registry: registry.self_id(),
            config: config.this_node_id,
        }));
    }

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Configure CAN: {} bit/s, rx {}, tx {}",
        settings.bitrate,
        settings.rx_pin,
        settings.tx_pin
    );

    match driver.begin(settings) {
        Ok(()) => {
            #[cfg(feature = "defmt")]
            defmt::info!("CAN ok, watching {} node slots", N);
            Ok(())
        }
        Err(err) => {
            #[cfg(feature = "defmt")]
            defmt::error!("CAN init error: {}", defmt::Debug2Format(&err));
            Err(WatchdogError::BusInit(err))
        }
    }
}

/// Drive the receiver and the monitor together on the current task.
///
/// Neither task ends, so this never returns. Firmware with several cores or
/// executors may instead spawn `receiver.run()` and `monitor.run()` apart.
pub async fn run_watchdog<'r, R, T, CR, CT, M, const N: usize, const EVT_CAP: usize>(
    receiver: HeartbeatReceiver<'r, R, CR, N>,
    monitor: TimeoutMonitor<'r, T, CT, M, N, EVT_CAP>,
) -> !
where
    R: CanReceiver,
    T: CanTransmitter,
    CR: WatchdogClock,
    CT: WatchdogClock,
    M: RawMutex,
{
    let receiver = receiver.run();
    let monitor = monitor.run();
    pin_mut!(receiver);
    pin_mut!(monitor);

    match select(receiver, monitor).await {
        Either::Left((never, _)) => never,
        Either::Right((never, _)) => never,
    }
}
