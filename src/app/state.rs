//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use super::event::EventSender;
use super::media::spawn_decode;
use super::page::{ActivePage, PageId, PageKind};
use super::timers::TokioScheduler;
use crate::config::AppConfig;
use crate::core::catalog::{Catalog, CatalogError};
use crate::core::records::{ActivityCategory, ProjectCategory};
use crate::core::scheduler::TimerId;
use crate::core::storage::{KeyValueStore, SessionStore};
use crate::ui::detail::{DetailHitZones, DetailView, MediaPreview};
use crate::ui::layout::AppLayout;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Gallery,
    Detail,
    SettingsMenu,
    ControlsSubmenu,
}

/// The detail overlay's content and the media item it shows.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub view: DetailView,
    pub media_index: usize,
}

/// Decode state of one local media file.
#[derive(Debug, Clone)]
pub enum MediaSlot {
    Loading,
    Ready(Arc<image::RgbaImage>),
    Failed(String),
}

/// Top-level application state.
pub struct AppState {
    /// `None` until the background load finishes.
    pub catalog: Option<Catalog>,
    /// Media URLs resolve against this directory.
    pub catalog_dir: PathBuf,
    /// Set when the catalog could not be loaded.
    pub load_error: Option<String>,
    /// The mounted gallery page.
    pub page: ActivePage,
    store: SessionStore,
    /// Template for the scheduler each mounted page gets.
    scheduler: TokioScheduler,
    /// User configuration (bindings and gallery settings).
    pub config: AppConfig,
    pub config_file: PathBuf,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted item in the controls submenu.
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,
    pub detail: Option<DetailState>,
    /// Clickable regions of the detail overlay from the last frame.
    pub detail_hit_zones: Option<DetailHitZones>,
    /// Decoded previews, keyed by local path.
    pub media: HashMap<PathBuf, MediaSlot>,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Tick counter driving the loading spinner.
    pub tick: u64,
    /// Full terminal area from the last draw.
    pub terminal_area: Rect,
    events: EventSender,
}

impl AppState {
    pub fn new(
        catalog_path: &Path,
        page: PageId,
        store: SessionStore,
        events: EventSender,
        config: AppConfig,
        config_file: PathBuf,
    ) -> Self {
        let scheduler = TokioScheduler::new(events.clone());
        let page = ActivePage::mount(
            page,
            store.clone(),
            scheduler.sibling(),
            config.gallery_options(),
        );
        let catalog_dir = catalog_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            catalog: None,
            catalog_dir,
            load_error: None,
            page,
            store,
            scheduler,
            config,
            config_file,
            active_view: ActiveView::default(),
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            detail: None,
            detail_hit_zones: None,
            media: HashMap::new(),
            status_message: None,
            should_quit: false,
            tick: 0,
            terminal_area: Rect::default(),
            events,
        }
    }

    pub fn layout(&mut self, now: Instant) {
        let layout = AppLayout::from_area(self.terminal_area);
        self.page.layout(self.catalog.as_ref(), layout.page_inner, now);
    }

    // ── catalog ─────────────────────────────────────────────────

    pub fn catalog_loaded(&mut self, result: Result<Catalog, CatalogError>) {
        match result {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.load_error = None;
                self.page.try_restore(self.catalog.as_ref());
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                self.load_error = Some(e.to_string());
            }
        }
    }

    // ── pages ───────────────────────────────────────────────────

    /// Save the current page, unmount it and mount `id` in its place.
    pub fn switch_page(&mut self, id: PageId) {
        self.page.unmount();
        self.page = ActivePage::mount(
            id,
            self.store.clone(),
            self.scheduler.sibling(),
            self.config.gallery_options(),
        );
        self.page.try_restore(self.catalog.as_ref());
        self.close_detail();
        debug!(page = ?id, "page switched");
    }

    /// Remount the current page so new gallery options take effect.
    pub fn remount(&mut self) {
        self.switch_page(self.page.id());
    }

    pub fn on_timer(&mut self, id: TimerId) {
        self.page.on_timer(id);
    }

    /// Snapshot and unmount the mounted page before exit.
    pub fn shutdown(&mut self) {
        self.page.unmount();
    }

    /// Drop both pages' snapshots from the session store.
    pub fn forget_saved_positions(&mut self) {
        for key in [ProjectCategory::STORAGE_KEY, ActivityCategory::STORAGE_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "could not remove snapshot");
            }
        }
        info!(dir = %self.store.dir().display(), "saved gallery positions cleared");
    }

    pub fn save_config(&self) {
        self.config.save_or_warn(&self.config_file);
    }

    // ── detail overlay ──────────────────────────────────────────

    pub fn open_detail(&mut self) {
        let Some(catalog) = self.catalog.as_ref() else {
            return;
        };
        let Some(view) = self.page.detail(catalog, &self.catalog_dir) else {
            return;
        };
        self.detail = Some(DetailState {
            view,
            media_index: 0,
        });
        self.active_view = ActiveView::Detail;
        self.request_media();
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.detail_hit_zones = None;
        if self.active_view == ActiveView::Detail {
            self.active_view = ActiveView::Gallery;
        }
    }

    /// Move through the detail media by `delta`, staying in range.
    pub fn step_media(&mut self, delta: isize) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        let len = detail.view.media.len();
        if len == 0 {
            return;
        }
        let target = (detail.media_index as isize + delta).clamp(0, len as isize - 1);
        detail.media_index = target as usize;
        self.request_media();
    }

    /// Start decoding the current media item unless it is cached or remote.
    fn request_media(&mut self) {
        let Some(path) = self
            .detail
            .as_ref()
            .and_then(|d| d.view.media.get(d.media_index))
            .and_then(|m| m.local.clone())
        else {
            return;
        };
        if self.media.contains_key(&path) {
            return;
        }
        self.media.insert(path.clone(), MediaSlot::Loading);
        spawn_decode(self.events.clone(), path);
    }

    pub fn media_decoded(&mut self, path: PathBuf, result: Result<Arc<image::RgbaImage>, String>) {
        let slot = match result {
            Ok(img) => MediaSlot::Ready(img),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "media preview failed");
                MediaSlot::Failed(e)
            }
        };
        self.media.insert(path, slot);
    }

    /// Preview state for the detail overlay's current media item.
    pub fn preview(&self) -> MediaPreview<'_> {
        let local = self
            .detail
            .as_ref()
            .and_then(|d| d.view.media.get(d.media_index))
            .and_then(|m| m.local.as_ref());
        match local.and_then(|p| self.media.get(p)) {
            Some(MediaSlot::Ready(img)) => MediaPreview::Ready(img),
            Some(MediaSlot::Failed(e)) => MediaPreview::Failed(e),
            Some(MediaSlot::Loading) => MediaPreview::Loading,
            None => MediaPreview::Unavailable,
        }
    }
}
