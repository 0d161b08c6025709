//! Heartbeat registry: last-seen timestamp of every satellite and the
//! timeout-detection policy.
//!
//! The table is written by the receiver task and read by the monitor task
//! without any lock. Each entry is an atomic timestamp plus an atomic
//! "observed" flag:
//!
//! * the writer stores the timestamp (`Release`) before raising the flag
//!   (`Release`);
//! * the reader loads the flag (`Acquire`) before the timestamp.
//!
//! A reader that sees the flag therefore sees a complete timestamp. Entries
//! are never reset, so no cross-entry consistency is needed: a scan may mix
//! pre- and post-update values and the next scan corrects itself.
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::RegistryError;
use crate::protocol::transport::can_id::NodeId;
use crate::protocol::transport::traits::watchdog_clock::Timestamp;

//==================================================================================ENTRY
/// One slot of the table.
struct HeartbeatEntry {
    last_seen: AtomicU32,
    observed: AtomicBool,
}

impl HeartbeatEntry {
    const fn new() -> Self {
        Self {
            last_seen: AtomicU32::new(0),
            observed: AtomicBool::new(false),
        }
    }

    fn store(&self, now: Timestamp) {
        self.last_seen.store(now, Ordering::Release);
        self.observed.store(true, Ordering::Release);
    }

    fn load(&self) -> Option<Timestamp> {
        if self.observed.load(Ordering::Acquire) {
            Some(self.last_seen.load(Ordering::Acquire))
        } else {
            None
        }
    }
}

/// Liveness of a single node at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeStatus {
    /// No heartbeat ever recorded.
    Unknown,
    /// Last heartbeat is within the timeout.
    Alive,
    /// Silent for longer than the timeout.
    TimedOut,
}

/// `true` when more than `timeout` ms elapsed between `last_seen` and `now`,
/// modulo the 32-bit wrap of the clock.
///
/// The difference is read as a signed value: a `last_seen` stamped after
/// `now` (receiver clock ahead of a scan in progress) is fresh, not 49 days
/// old. Consequence: a silence longer than `i32::MAX` ms (~24.8 days) aliases
/// to a fresh heartbeat. `WatchdogConfig::validate` keeps timeouts below it.
#[inline]
pub fn is_expired(last_seen: Timestamp, now: Timestamp, timeout: u32) -> bool {
    let elapsed = now.wrapping_sub(last_seen) as i32;
    elapsed > 0 && elapsed as u32 > timeout
}

//==================================================================================REGISTRY
/// Fixed-capacity table of `N` entries indexed by node ID.
///
/// `N` bounds the accepted IDs (`0..N`); the scan covers `1..N` minus the
/// monitor's own ID. `N` above 256 only wastes memory since IDs are 8 bits.
pub struct HeartbeatRegistry<const N: usize> {
    entries: [HeartbeatEntry; N],
    self_id: NodeId,
}

impl<const N: usize> HeartbeatRegistry<N> {
    /// All entries start in the sentinel state. `const` so the registry can
    /// live in a `static` shared by both tasks.
    pub const fn new(self_id: NodeId) -> Self {
        Self {
            entries: [const { HeartbeatEntry::new() }; N],
            self_id,
        }
    }

    /// Number of table entries (exclusive upper bound of node IDs).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The monitor's own ID, never reported by scans.
    pub fn self_id(&self) -> NodeId {
        self.self_id
    }

    /// Record a heartbeat from `id` at `now`.
    ///
    /// IDs outside the table are rejected and the table is left untouched.
    pub fn record_heartbeat(&self, id: NodeId, now: Timestamp) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get(id as usize)
            .ok_or(RegistryError::NodeIdOutOfRange { id, capacity: N })?;
        entry.store(now);
        Ok(())
    }

    /// Last heartbeat of `id`, `None` if never observed or out of range.
    pub fn last_seen(&self, id: NodeId) -> Option<Timestamp> {
        self.entries.get(id as usize).and_then(HeartbeatEntry::load)
    }

    /// Liveness of `id` at `now`.
    pub fn status(&self, id: NodeId, now: Timestamp, timeout: u32) -> NodeStatus {
        match self.last_seen(id) {
            None => NodeStatus::Unknown,
            Some(last) if is_expired(last, now, timeout) => NodeStatus::TimedOut,
            Some(_) => NodeStatus::Alive,
        }
    }

    /// Number of nodes heard from at least once.
    pub fn observed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.observed.load(Ordering::Relaxed))
            .count()
    }

    /// Lazily iterate over the nodes whose heartbeat is older than `timeout`.
    ///
    /// Each call starts a fresh pass reading the current state of the table.
    pub fn scan_for_timeouts(&self, now: Timestamp, timeout: u32) -> TimeoutScan<'_, N> {
        TimeoutScan {
            registry: self,
            next: 1,
            now,
            timeout,
        }
    }
}

//==================================================================================SCAN
/// Iterator returned by [`HeartbeatRegistry::scan_for_timeouts`].
pub struct TimeoutScan<'r, const N: usize> {
    registry: &'r HeartbeatRegistry<N>,
    next: usize,
    now: Timestamp,
    timeout: u32,
}

impl<const N: usize> Iterator for TimeoutScan<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let bound = N.min(NodeId::MAX as usize + 1);
        while self.next < bound {
            let id = self.next as NodeId;
            self.next += 1;

            if id == self.registry.self_id {
                continue;
            }
            if let Some(last) = self.registry.entries[id as usize].load() {
                if is_expired(last, self.now, self.timeout) {
                    return Some(id);
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let bound = N.min(NodeId::MAX as usize + 1);
        (0, Some(bound.saturating_sub(self.next)))
    }
}

impl<const N: usize> core::iter::FusedIterator for TimeoutScan<'_, N> {}
