//! Time-ordered queue of pending callbacks, swept without blocking

use super::types::ScheduleHandle;
use chrono::{DateTime, Duration, Local};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    fire_at: DateTime<Local>,
    priority: u32,
    sequence: u64,
}

/// A callback taken out of the scheduler because its fire time elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredCallback<T> {
    pub handle: ScheduleHandle,
    pub fire_at: DateTime<Local>,
    pub payload: T,
}

/// Single-threaded delay scheduler.
///
/// Entries are ordered by fire time, then priority (lower first), then
/// insertion order. Nothing here sleeps: callers sweep with
/// [`DelayScheduler::drain_due`] and run the returned callbacks themselves.
#[derive(Debug)]
pub struct DelayScheduler<T> {
    pending: BTreeMap<EntryKey, T>,
    index: HashMap<ScheduleHandle, EntryKey>,
    next_sequence: u64,
}

impl<T> DelayScheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            index: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Arm a callback to fire `delay` after `now`.
    ///
    /// Returns `None`, scheduling nothing, when the fire time is beyond the
    /// representable date range.
    pub fn schedule(
        &mut self,
        now: DateTime<Local>,
        delay: Duration,
        priority: u32,
        payload: T,
    ) -> Option<ScheduleHandle> {
        let Some(fire_at) = now.checked_add_signed(delay) else {
            warn!(
                "Callback delay of {} seconds is out of range, not scheduled",
                delay.num_seconds()
            );
            return None;
        };
        let key = EntryKey {
            fire_at,
            priority,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let handle = ScheduleHandle(key.sequence);
        self.pending.insert(key, payload);
        self.index.insert(handle, key);

        debug!(
            "Scheduled callback {} for {}",
            handle,
            key.fire_at.format("%Y-%m-%d %H:%M:%S")
        );
        Some(handle)
    }

    /// Cancel a pending callback. Returns false, without failing, when the
    /// callback already fired or was already cancelled.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        match self.index.remove(&handle) {
            Some(key) => {
                self.pending.remove(&key);
                debug!("Cancelled callback {}", handle);
                true
            }
            None => {
                debug!(
                    "Callback {} already fired or was cancelled, nothing to cancel",
                    handle
                );
                false
            }
        }
    }

    pub fn is_pending(&self, handle: ScheduleHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn fire_time(&self, handle: ScheduleHandle) -> Option<DateTime<Local>> {
        self.index.get(&handle).map(|key| key.fire_at)
    }

    /// Earliest pending fire time
    pub fn next_fire_time(&self) -> Option<DateTime<Local>> {
        self.pending.keys().next().map(|key| key.fire_at)
    }

    /// Remove and return, in firing order, every callback due at `now`.
    ///
    /// The result is a snapshot: callbacks scheduled while the caller works
    /// through it are left for the next sweep.
    pub fn drain_due(&mut self, now: DateTime<Local>) -> Vec<FiredCallback<T>> {
        let mut fired = Vec::new();

        while let Some(entry) = self.pending.first_entry() {
            if entry.key().fire_at > now {
                break;
            }
            let (key, payload) = entry.remove_entry();
            let handle = ScheduleHandle(key.sequence);
            self.index.remove(&handle);
            fired.push(FiredCallback {
                handle,
                fire_at: key.fire_at,
                payload,
            });
        }

        if !fired.is_empty() {
            debug!("{} scheduled callbacks due", fired.len());
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for DelayScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn payloads<T: Clone>(fired: &[FiredCallback<T>]) -> Vec<T> {
        fired.iter().map(|f| f.payload.clone()).collect()
    }

    #[test]
    fn test_drain_returns_due_callbacks_in_fire_time_order() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        scheduler.schedule(now, Duration::seconds(30), 1, "c");
        scheduler.schedule(now, Duration::seconds(10), 1, "a");
        scheduler.schedule(now, Duration::seconds(20), 1, "b");
        scheduler.schedule(now, Duration::seconds(60), 1, "later");

        let fired = scheduler.drain_due(now + Duration::seconds(30));
        assert_eq!(payloads(&fired), vec!["a", "b", "c"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            scheduler.next_fire_time(),
            Some(now + Duration::seconds(60))
        );
    }

    #[test]
    fn test_ties_break_by_priority_then_insertion_order() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        scheduler.schedule(now, Duration::seconds(5), 1, "first");
        scheduler.schedule(now, Duration::seconds(5), 1, "second");
        scheduler.schedule(now, Duration::seconds(5), 0, "urgent");

        let fired = scheduler.drain_due(now + Duration::seconds(5));
        assert_eq!(payloads(&fired), vec!["urgent", "first", "second"]);
    }

    #[test]
    fn test_drain_with_nothing_due_returns_immediately() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        scheduler.schedule(now, Duration::seconds(5), 1, ());

        assert!(scheduler.drain_due(now).is_empty());
        assert_eq!(scheduler.len(), 1);
        assert!(DelayScheduler::<()>::new().drain_due(now).is_empty());
    }

    #[test]
    fn test_cancel_pending_callback() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        let handle = scheduler.schedule(now, Duration::seconds(5), 1, "job").unwrap();

        assert!(scheduler.is_pending(handle));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.is_pending(handle));
        assert!(scheduler.drain_due(now + Duration::hours(1)).is_empty());
    }

    #[test]
    fn test_cancel_after_fire_or_twice_is_a_no_op() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        let fired_handle = scheduler.schedule(now, Duration::zero(), 1, "fired").unwrap();
        let cancelled = scheduler.schedule(now, Duration::seconds(5), 1, "cancelled").unwrap();
        let kept = scheduler.schedule(now, Duration::seconds(50), 1, "kept").unwrap();

        assert_eq!(scheduler.drain_due(now).len(), 1);
        assert!(!scheduler.cancel(fired_handle));

        assert!(scheduler.cancel(cancelled));
        assert!(!scheduler.cancel(cancelled));

        assert!(scheduler.is_pending(kept));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_callbacks_armed_during_a_sweep_wait_for_the_next_one() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        scheduler.schedule(now, Duration::zero(), 1, "repeat");

        let fired = scheduler.drain_due(now);
        for callback in &fired {
            scheduler.schedule(now, Duration::zero(), 1, callback.payload);
        }
        assert_eq!(fired.len(), 1);
        assert_eq!(scheduler.len(), 1);

        let next = scheduler.drain_due(now);
        assert_eq!(payloads(&next), vec!["repeat"]);
    }

    #[test]
    fn test_out_of_range_delay_is_not_scheduled() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        let kept = scheduler.schedule(now, Duration::seconds(5), 1, "kept").unwrap();

        assert!(scheduler
            .schedule(now, Duration::seconds(10_000_000_000_000), 1, "far")
            .is_none());
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.is_pending(kept));
    }

    #[test]
    fn test_handles_are_never_reused() {
        let now = start();
        let mut scheduler = DelayScheduler::new();
        let first = scheduler.schedule(now, Duration::zero(), 1, ()).unwrap();
        scheduler.drain_due(now);
        let second = scheduler.schedule(now, Duration::zero(), 1, ()).unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.fire_time(second), Some(now));
        assert_eq!(scheduler.fire_time(first), None);
    }
}
