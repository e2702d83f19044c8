//! Gallery state controller.  Owns filter selection, the load-more window
//! and scroll restoration for one grid instance.
//!
//! The controller owns its store and scheduler and borrows the viewport per
//! call.  Nothing in here can fail from the caller's point of view: storage
//! problems are logged and the in-memory state carries on.
//!
//! Lifecycle: [`GalleryController::initialize`] puts the grid in
//! [`Phase::Restoring`]; the first useful call to
//! [`GalleryController::restore_scroll_position`] (or the restore timer it
//! arms) moves it to [`Phase::Ready`].  `set_filter` and `load_more` keep the
//! phase.  [`GalleryController::unmount`] (or dropping the controller)
//! cancels pending timers and leaves the snapshot behind for the next mount.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::records::GenerationId;
use super::scheduler::{GalleryTimer, Scheduler, TimerId};
use super::snapshot::{self, PersistedSnapshot};
use super::storage::KeyValueStore;
use super::viewport::Viewport;

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_SCROLL_SAVE_DEBOUNCE: Duration = Duration::from_millis(150);
pub const DEFAULT_SCROLL_RESTORE_DELAY: Duration = Duration::from_millis(300);

// ───────────────────────────────────────── types ─────────────

/// A closed set of mutually exclusive content categories.
pub trait Category:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Every value in display order.  The first entry is the "all" value.
    const ALL: &'static [Self];

    fn is_all(self) -> bool;
    fn label(self) -> &'static str;

    fn all() -> Self {
        Self::ALL[0]
    }
}

/// What the grid currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState<C> {
    pub category: C,
    /// Generation narrowing; only ever set when `category` is not "all".
    pub subgroup_id: Option<GenerationId>,
    /// Number of filtered items rendered.  Never below the page size.
    pub visible_count: usize,
}

impl<C: Category> FilterState<C> {
    /// "All" category, no generation, one page visible.
    pub fn initial(page_size: usize) -> Self {
        Self {
            category: C::all(),
            subgroup_id: None,
            visible_count: page_size,
        }
    }
}

/// How much of a stored snapshot a fresh mount takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// Category and generation only; the window restarts at one page.
    #[default]
    FilterOnly,
    /// Also the load-more window.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryOptions {
    pub page_size: usize,
    pub scroll_save_debounce: Duration,
    pub scroll_restore_delay: Duration,
    pub restore_policy: RestorePolicy,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scroll_save_debounce: DEFAULT_SCROLL_SAVE_DEBOUNCE,
            scroll_restore_delay: DEFAULT_SCROLL_RESTORE_DELAY,
            restore_policy: RestorePolicy::FilterOnly,
        }
    }
}

/// Bookkeeping for entrance animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealState {
    /// Items below this index were already on screen before the last reveal.
    pub previous_visible_count: usize,
    /// Whether the grid container is in the viewport.
    pub grid_intersecting: bool,
    /// Bumped by every `set_filter` and `load_more`, so renderers can restart
    /// their animation clock even when the filter did not change.
    pub epoch: u64,
}

/// How one rendered item should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    pub should_animate: bool,
    /// Position in the stagger sequence (0 for the first new item).
    pub order: usize,
}

impl Reveal {
    pub const IMMEDIATE: Reveal = Reveal {
        should_animate: false,
        order: 0,
    };

    /// Start delay for this item given the per-item stagger.
    pub fn delay(self, stagger: Duration) -> Duration {
        if !self.should_animate {
            return Duration::ZERO;
        }
        stagger.saturating_mul(u32::try_from(self.order).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Restoring,
    Ready,
    Unmounted,
}

// ───────────────────────────────────────── controller ────────

pub struct GalleryController<C: Category, S: KeyValueStore, T: Scheduler> {
    key: String,
    options: GalleryOptions,
    state: FilterState<C>,
    reveal: RevealState,
    phase: Phase,
    store: S,
    scheduler: T,
    scroll_save: Option<TimerId>,
    /// Armed restore and the offset it will apply.
    pending_restore: Option<(TimerId, u32)>,
    restore_attempted: bool,
}

impl<C: Category, S: KeyValueStore, T: Scheduler> GalleryController<C, S, T> {
    /// Mount a grid: seed the filter from the snapshot under `key`, falling
    /// back to `defaults` when it is absent or unusable.
    pub fn initialize(
        key: impl Into<String>,
        defaults: FilterState<C>,
        store: S,
        scheduler: T,
        options: GalleryOptions,
    ) -> Self {
        let key = key.into();
        let page_size = options.page_size.max(1);
        let options = GalleryOptions {
            page_size,
            ..options
        };
        let defaults = FilterState {
            category: defaults.category,
            subgroup_id: defaults.subgroup_id.filter(|_| !defaults.category.is_all()),
            visible_count: defaults.visible_count.max(page_size),
        };

        let state = snapshot::load_filter_state(
            &store,
            &key,
            defaults,
            options.restore_policy,
            page_size,
        );
        debug!(key = %key, ?state, "gallery mounted");

        Self {
            key,
            options,
            state,
            reveal: RevealState {
                previous_visible_count: state.visible_count,
                grid_intersecting: false,
                epoch: 0,
            },
            phase: Phase::Restoring,
            store,
            scheduler,
            scroll_save: None,
            pending_restore: None,
            restore_attempted: false,
        }
    }

    pub fn state(&self) -> FilterState<C> {
        self.state
    }

    pub fn reveal(&self) -> RevealState {
        self.reveal
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    // ── filter ──────────────────────────────────────────────────

    /// Select a filter.  Always resets the window to one page and replays
    /// the reveal, even when nothing changed.
    ///
    /// The generation is dropped when the category is "all".
    pub fn set_filter(
        &mut self,
        category: C,
        subgroup_id: Option<GenerationId>,
        viewport: &impl Viewport,
    ) -> FilterState<C> {
        if self.phase == Phase::Unmounted {
            return self.state;
        }
        let keep_subgroup = !category.is_all();
        let page_size = self.options.page_size;

        self.state = FilterState {
            category,
            subgroup_id: subgroup_id.filter(|_| keep_subgroup),
            visible_count: page_size,
        };
        self.reveal.previous_visible_count = page_size;
        self.reveal.epoch += 1;
        debug!(key = %self.key, state = ?self.state, "filter set");

        self.persist(viewport);
        self.state
    }

    /// Switch category, clearing the generation.
    pub fn select_category(&mut self, category: C, viewport: &impl Viewport) -> FilterState<C> {
        self.set_filter(category, None, viewport)
    }

    /// Narrow (or widen, with `None`) the current category by generation.
    pub fn select_subgroup(
        &mut self,
        subgroup_id: Option<GenerationId>,
        viewport: &impl Viewport,
    ) -> FilterState<C> {
        self.set_filter(self.state.category, subgroup_id, viewport)
    }

    /// Grow the window by one page.  Not clamped to the list length.
    pub fn load_more(&mut self, viewport: &impl Viewport) -> FilterState<C> {
        if self.phase == Phase::Unmounted {
            return self.state;
        }
        let before = self.state.visible_count;
        self.reveal.previous_visible_count = self.reveal.previous_visible_count.max(before);
        self.state.visible_count = before.saturating_add(self.options.page_size);
        self.reveal.epoch += 1;
        debug!(
            key = %self.key,
            visible = self.state.visible_count,
            previous = self.reveal.previous_visible_count,
            "load more"
        );

        self.persist(viewport);
        self.state
    }

    /// The rendered prefix of an already-filtered list.
    pub fn visible<'a, I>(&self, items: &'a [I]) -> &'a [I] {
        &items[..items.len().min(self.state.visible_count)]
    }

    pub fn has_more(&self, filtered_len: usize) -> bool {
        filtered_len > self.state.visible_count
    }

    // ── persistence ─────────────────────────────────────────────

    /// Overwrite the snapshot with the current filter and scroll offset.
    pub fn persist(&mut self, viewport: &impl Viewport) {
        if self.phase == Phase::Unmounted {
            return;
        }
        let snap = PersistedSnapshot::capture(&self.state, Some(viewport.scroll_offset()));
        self.write(&snap);
    }

    /// Scroll listener: (re)arm the debounced save.
    pub fn on_scroll(&mut self) {
        if self.phase == Phase::Unmounted {
            return;
        }
        if let Some(id) = self.scroll_save.take() {
            self.scheduler.cancel(id);
        }
        let id = self
            .scheduler
            .schedule(self.options.scroll_save_debounce, GalleryTimer::ScrollSave);
        self.scroll_save = Some(id);
    }

    /// Arm a one-shot restore of the stored scroll offset.
    ///
    /// Call after the list has loaded.  Returns `true` when a restore was
    /// scheduled.  The offset is stripped from the snapshot right away, so
    /// later calls (and later mounts) do not replay it.  A `false` from
    /// `ready` leaves the restore available for a later call.
    pub fn restore_scroll_position(&mut self, ready: impl FnOnce() -> bool) -> bool {
        if self.phase == Phase::Unmounted || self.restore_attempted {
            return false;
        }
        if !ready() {
            return false;
        }
        self.restore_attempted = true;

        let stored = match snapshot::read_snapshot::<C>(&self.store, &self.key) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(key = %self.key, error = %e, "cannot read snapshot for scroll restore");
                None
            }
        };
        let Some(mut snap) = stored else {
            self.phase = Phase::Ready;
            return false;
        };
        let Some(offset) = snap.scroll_position.take() else {
            self.phase = Phase::Ready;
            return false;
        };

        let id = self
            .scheduler
            .schedule(self.options.scroll_restore_delay, GalleryTimer::ScrollRestore);
        self.pending_restore = Some((id, offset));
        self.write(&snap);
        debug!(key = %self.key, offset, "scroll restore armed");
        true
    }

    /// Apply a fired timer.  Returns `false` for timers this controller does
    /// not (or no longer) own.
    pub fn on_timer(&mut self, id: TimerId, viewport: &mut impl Viewport) -> bool {
        if self.phase == Phase::Unmounted {
            trace!(?id, "timer after unmount ignored");
            return false;
        }
        if self.scroll_save == Some(id) {
            self.scroll_save = None;
            self.persist(&*viewport);
            return true;
        }
        match self.pending_restore {
            Some((restore_id, offset)) if restore_id == id => {
                self.pending_restore = None;
                viewport.scroll_to(offset);
                self.phase = Phase::Ready;
                debug!(key = %self.key, offset, "scroll restored");
                true
            }
            _ => {
                trace!(?id, "stale timer ignored");
                false
            }
        }
    }

    fn write(&mut self, snap: &PersistedSnapshot<C>) {
        if let Err(e) = snapshot::write_snapshot(&mut self.store, &self.key, snap) {
            warn!(key = %self.key, error = %e, "gallery snapshot not saved");
        }
    }

    // ── reveal ──────────────────────────────────────────────────

    /// Feed the container/viewport intersection signal.
    pub fn set_grid_intersecting(&mut self, intersecting: bool) {
        if self.reveal.grid_intersecting != intersecting {
            trace!(key = %self.key, intersecting, "grid visibility changed");
        }
        self.reveal.grid_intersecting = intersecting;
    }

    pub fn classify_for_animation(&self, index: usize) -> Reveal {
        let threshold = self.reveal.previous_visible_count;
        if self.reveal.grid_intersecting && index >= threshold {
            Reveal {
                should_animate: true,
                order: index - threshold,
            }
        } else {
            Reveal::IMMEDIATE
        }
    }

    // ── teardown ────────────────────────────────────────────────

    pub fn unmount(&mut self) {
        if self.phase == Phase::Unmounted {
            return;
        }
        self.cancel_timers();
        self.phase = Phase::Unmounted;
        debug!(key = %self.key, "gallery unmounted");
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.scroll_save.take() {
            self.scheduler.cancel(id);
        }
        if let Some((id, _)) = self.pending_restore.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl<C: Category, S: KeyValueStore, T: Scheduler> Drop for GalleryController<C, S, T> {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

impl<C: Category, S: KeyValueStore, T: Scheduler> fmt::Debug for GalleryController<C, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryController")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("reveal", &self.reveal)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
