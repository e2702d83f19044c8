//! Runtime [`Scheduler`] backed by tokio sleeps.
//!
//! Each timer is a small task that sleeps and then posts
//! [`AppEvent::Timer`] into the application channel.  Cancelling aborts the
//! task.  Ids come from a counter shared between siblings, so a timer that
//! was already queued when its controller went away can never be mistaken
//! for one of the next controller's timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::event::{AppEvent, EventSender};
use crate::core::scheduler::{GalleryTimer, Scheduler, TimerId};

pub struct TokioScheduler {
    tx: EventSender,
    next_id: Arc<AtomicU64>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            tasks: HashMap::new(),
        }
    }

    /// A scheduler with no pending timers that shares this one's channel
    /// and id space.  Every mounted controller gets its own sibling.
    pub fn sibling(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            next_id: Arc::clone(&self.next_id),
            tasks: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, timer: GalleryTimer) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A closed channel means the app is shutting down.
            let _ = tx.send(AppEvent::Timer(id, timer));
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn timer_posts_event_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let id = scheduler.schedule(Duration::from_millis(150), GalleryTimer::ScrollSave);

        match rx.recv().await {
            Some(AppEvent::Timer(got, GalleryTimer::ScrollSave)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_stays_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let id = scheduler.schedule(Duration::from_millis(50), GalleryTimer::ScrollRestore);
        scheduler.cancel(id);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn siblings_share_the_id_space() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut first = TokioScheduler::new(tx);
        let mut second = first.sibling();

        let a = first.schedule(Duration::from_secs(1), GalleryTimer::ScrollSave);
        let b = second.schedule(Duration::from_secs(1), GalleryTimer::ScrollSave);
        assert_ne!(a, b);
    }
}
