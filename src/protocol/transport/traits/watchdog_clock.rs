//! Monotonic millisecond clock and asynchronous delay, the only timing
//! primitives the supervision tasks rely on.

/// Milliseconds since an arbitrary epoch (usually boot). Wraps after ~49 days;
/// every comparison uses wrapping subtraction.
pub type Timestamp = u32;

/// Clock trait abstraction; each task owns its own instance.
pub trait WatchdogClock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> Timestamp;

    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}

/// Clock backed by the `embassy-time` driver registered by the firmware.
#[cfg(feature = "embassy-clock")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-clock")]
impl WatchdogClock for EmbassyClock {
    fn now_ms(&self) -> Timestamp {
        // Truncation is the intended wrap.
        embassy_time::Instant::now().as_millis() as Timestamp
    }

    async fn delay_ms(&mut self, millis: u32) {
        embassy_time::Timer::after_millis(millis as u64).await;
    }
}
