//! Delayed-callback scheduling, abstracted for deterministic tests.
//!
//! A scheduler does not run callbacks.  It hands `(TimerId, GalleryTimer)`
//! back to its owner when the delay elapses, and the owner applies the
//! timer to whichever controller is mounted.  Timers that outlive their
//! controller are simply not recognised by the next one.

use std::time::Duration;

#[cfg(test)]
pub use manual::ManualScheduler;

/// Opaque handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryTimer {
    /// Debounced scroll-position save.
    ScrollSave,
    /// Delayed scroll restore after the grid has laid out.
    ScrollRestore,
}

pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, timer: GalleryTimer) -> TimerId;
    /// Cancelling an unknown or already-fired timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

// ───────────────────────────────────────── virtual time ──────

#[cfg(test)]
mod manual {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;
    use std::time::Duration;

    use super::{GalleryTimer, Scheduler, TimerId};

    #[derive(Debug, Default)]
    struct ManualInner {
        now: Duration,
        next_id: u64,
        /// Keyed by (deadline, id) so equal deadlines fire in scheduling order.
        pending: BTreeMap<(Duration, TimerId), GalleryTimer>,
    }

    /// Virtual-time scheduler.  Clones share one clock, so a test can keep a
    /// handle while the controller owns another.
    #[derive(Debug, Clone, Default)]
    pub struct ManualScheduler {
        inner: Rc<RefCell<ManualInner>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Move the clock forward and return every timer that came due, in
        /// deadline order.
        pub fn advance(&self, by: Duration) -> Vec<(TimerId, GalleryTimer)> {
            let mut inner = self.inner.borrow_mut();
            inner.now += by;
            let now = inner.now;
            let due: Vec<(Duration, TimerId)> = inner
                .pending
                .keys()
                .take_while(|(deadline, _)| *deadline <= now)
                .copied()
                .collect();
            due.into_iter()
                .filter_map(|key| inner.pending.remove(&key).map(|t| (key.1, t)))
                .collect()
        }

        pub fn pending_count(&self) -> usize {
            self.inner.borrow().pending.len()
        }

        pub fn now(&self) -> Duration {
            self.inner.borrow().now
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&mut self, delay: Duration, timer: GalleryTimer) -> TimerId {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = TimerId(inner.next_id);
            let deadline = inner.now + delay;
            inner.pending.insert((deadline, id), timer);
            id
        }

        fn cancel(&mut self, id: TimerId) {
            self.inner.borrow_mut().pending.retain(|(_, tid), _| *tid != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut s = ManualScheduler::new();
        let restore = s.schedule(MS * 300, GalleryTimer::ScrollRestore);
        let save = s.schedule(MS * 150, GalleryTimer::ScrollSave);

        assert!(s.advance(MS * 100).is_empty());
        assert_eq!(s.advance(MS * 100), vec![(save, GalleryTimer::ScrollSave)]);
        assert_eq!(s.advance(MS * 100), vec![(restore, GalleryTimer::ScrollRestore)]);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = ManualScheduler::new();
        let id = s.schedule(MS * 10, GalleryTimer::ScrollSave);
        s.cancel(id);
        assert!(s.advance(MS * 50).is_empty());
        // Second cancel of the same id is harmless.
        s.cancel(id);
    }

    #[test]
    fn clones_share_the_clock() {
        let handle = ManualScheduler::new();
        let mut owned = handle.clone();
        let id = owned.schedule(MS * 5, GalleryTimer::ScrollSave);
        assert_eq!(handle.advance(MS * 5), vec![(id, GalleryTimer::ScrollSave)]);
        assert_eq!(owned.now(), MS * 5);
    }
}
