//! One mounted gallery page.
//!
//! A [`GalleryPage`] wraps the core controller with the terminal's share of
//! the state: the scroll position, the card selection, the intersection
//! watcher and the clock for the reveal animation.  [`ActivePage`] holds
//! whichever of the two pages is on screen.

use std::path::Path;
use std::time::{Duration, Instant};

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use super::media::resolve_media_path;
use super::timers::TokioScheduler;
use crate::core::catalog::{filter_items, Catalog, GalleryItem};
use crate::core::gallery::{
    Category, FilterState, GalleryController, GalleryOptions, Reveal,
};
use crate::core::records::{
    Activity, ActivityCategory, GenerationId, Introduce, MediaKind, MediaRow, Project, ProjectCategory,
};
use crate::core::scheduler::{Scheduler, TimerId};
use crate::core::storage::{KeyValueStore, SessionStore};
use crate::core::viewport::{IntersectionWatcher, RowSpan, Viewport};
use crate::ui::detail::{DetailView, MediaEntry};
use crate::ui::gallery::{CardLook, CardText, CardView, GalleryView, GalleryWidget, PageGeometry};

// ───────────────────────────────────────── page kinds ────────

/// Which page the app shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PageId {
    #[default]
    Projects,
    Activities,
}

impl PageId {
    pub fn other(self) -> Self {
        match self {
            PageId::Projects => PageId::Activities,
            PageId::Activities => PageId::Projects,
        }
    }
}

/// A category type that has a page of its own.
pub trait PageKind: Category {
    type Item: GalleryItem<Self>;

    const ID: PageId;
    /// Session-store key of this page's grid snapshot.
    const STORAGE_KEY: &'static str;
    const TITLE: &'static str;

    fn items(catalog: &Catalog) -> &[Self::Item];
    /// Introduction sections shown above the filter bar.
    fn intro(catalog: &Catalog) -> &[Introduce];
    fn card(item: &Self::Item, catalog: &Catalog) -> CardText;
    fn detail(item: &Self::Item, catalog: &Catalog, catalog_dir: &Path) -> DetailView;
}

impl PageKind for ProjectCategory {
    type Item = Project;

    const ID: PageId = PageId::Projects;
    const STORAGE_KEY: &'static str = "projects-grid";
    const TITLE: &'static str = "Projects";

    fn items(catalog: &Catalog) -> &[Project] {
        &catalog.projects
    }

    fn intro(catalog: &Catalog) -> &[Introduce] {
        &catalog.introduce
    }

    fn card(item: &Project, catalog: &Catalog) -> CardText {
        let date = item.created_at.map(|d| d.format("%Y-%m-%d").to_string());
        CardText {
            title: item.title.clone(),
            meta: meta_line(item.category.label(), generation_label(catalog, item.generation_id), date),
            blurb: item.summary.clone().unwrap_or_default(),
        }
    }

    fn detail(item: &Project, catalog: &Catalog, catalog_dir: &Path) -> DetailView {
        let mut fields = Vec::new();
        let detail = catalog.project_detail(item.id);
        if let Some(role) = detail.and_then(|d| d.role.clone()) {
            fields.push(("Role", role));
        }
        if let Some(d) = detail.filter(|d| !d.tech_stack.is_empty()) {
            fields.push(("Stack", d.tech_stack.join(", ")));
        }
        if let Some(url) = detail.and_then(|d| d.github_url.clone()) {
            fields.push(("GitHub", url));
        }
        if let Some(url) = detail.and_then(|d| d.demo_url.clone()) {
            fields.push(("Demo", url));
        }
        if let Some(created) = item.created_at {
            fields.push(("Created", created.format("%Y-%m-%d").to_string()));
        }

        DetailView {
            title: item.title.clone(),
            subtitle: meta_line(item.category.label(), generation_label(catalog, item.generation_id), None),
            fields,
            body: detail
                .and_then(|d| d.overview.clone())
                .or_else(|| item.summary.clone()),
            media: media_entries(catalog.project_media(item.id), catalog_dir),
        }
    }
}

impl PageKind for ActivityCategory {
    type Item = Activity;

    const ID: PageId = PageId::Activities;
    const STORAGE_KEY: &'static str = "activities-grid";
    const TITLE: &'static str = "Activities";

    fn items(catalog: &Catalog) -> &[Activity] {
        &catalog.activities
    }

    fn intro(_catalog: &Catalog) -> &[Introduce] {
        &[]
    }

    fn card(item: &Activity, catalog: &Catalog) -> CardText {
        let date = item.held_on.map(|d| d.format("%Y-%m-%d").to_string());
        let blurb = item
            .description
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or_default()
            .to_string();
        CardText {
            title: item.title.clone(),
            meta: meta_line(item.category.label(), generation_label(catalog, item.generation_id), date),
            blurb,
        }
    }

    fn detail(item: &Activity, catalog: &Catalog, catalog_dir: &Path) -> DetailView {
        let fields = item
            .held_on
            .map(|d| vec![("Date", d.format("%Y-%m-%d").to_string())])
            .unwrap_or_default();
        DetailView {
            title: item.title.clone(),
            subtitle: meta_line(item.category.label(), generation_label(catalog, item.generation_id), None),
            fields,
            body: item.description.clone(),
            media: media_entries(catalog.activity_media(item.id), catalog_dir),
        }
    }
}

fn generation_label(catalog: &Catalog, id: Option<GenerationId>) -> Option<String> {
    id.and_then(|id| catalog.generation(id)).map(|g| g.label())
}

fn meta_line(category: &str, generation: Option<String>, date: Option<String>) -> String {
    std::iter::once(category.to_string())
        .chain(generation)
        .chain(date)
        .collect::<Vec<_>>()
        .join(" · ")
}

fn media_entries<M: MediaRow>(rows: Vec<&M>, catalog_dir: &Path) -> Vec<MediaEntry> {
    rows.into_iter()
        .map(|m| MediaEntry {
            url: m.url().to_string(),
            kind: m.kind(),
            local: match m.kind() {
                MediaKind::Image => resolve_media_path(catalog_dir, m.url()),
                MediaKind::Video => None,
            },
        })
        .collect()
}

// ───────────────────────────────────────── scroll ────────────

/// Scroll state of the page viewport.  Offsets are clamped at layout time,
/// so a restore can land before the page has grown to its full height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageScroll {
    pub offset: u32,
    pub height: u16,
}

impl Viewport for PageScroll {
    fn scroll_offset(&self) -> u32 {
        self.offset
    }

    fn scroll_to(&mut self, offset: u32) {
        self.offset = offset;
    }
}

/// What a click inside the page viewport landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageHit {
    Card(usize),
    LoadMore,
    Nothing,
}

/// Map a reveal classification and the time since the reveal started to a
/// card's look: hidden until its delay, dim for one stagger step, then normal.
pub fn card_look(reveal: Reveal, stagger: Duration, elapsed: Duration) -> CardLook {
    if !reveal.should_animate {
        return CardLook::Normal;
    }
    let delay = reveal.delay(stagger);
    if elapsed < delay {
        CardLook::Hidden
    } else if elapsed < delay.saturating_add(stagger) {
        CardLook::Dim
    } else {
        CardLook::Normal
    }
}

// ───────────────────────────────────────── page ──────────────

pub struct GalleryPage<C: PageKind, S: KeyValueStore = SessionStore, T: Scheduler = TokioScheduler> {
    controller: GalleryController<C, S, T>,
    scroll: PageScroll,
    selected: usize,
    watcher: IntersectionWatcher,
    reveal_epoch: u64,
    reveal_started: Instant,
    geometry: PageGeometry,
    /// Cards laid out on the last frame.
    cards: usize,
}

impl<C: PageKind, S: KeyValueStore, T: Scheduler> GalleryPage<C, S, T> {
    pub fn mount(store: S, scheduler: T, options: GalleryOptions) -> Self {
        let controller = GalleryController::initialize(
            C::STORAGE_KEY,
            FilterState::initial(options.page_size),
            store,
            scheduler,
            options,
        );
        Self {
            reveal_epoch: controller.reveal().epoch,
            controller,
            scroll: PageScroll::default(),
            selected: 0,
            watcher: IntersectionWatcher::new(),
            reveal_started: Instant::now(),
            geometry: PageGeometry::default(),
            cards: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FilterState<C> {
        self.controller.state()
    }

    #[cfg(test)]
    pub fn scroll(&self) -> PageScroll {
        self.scroll
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    #[cfg(test)]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Items passing the current filter, in catalog order.
    pub fn filtered<'a>(&self, catalog: &'a Catalog) -> Vec<&'a C::Item> {
        let state = self.controller.state();
        filter_items(C::items(catalog), state.category, state.subgroup_id)
    }

    /// Arm the stored scroll restore once the grid has something to show.
    pub fn try_restore(&mut self, catalog: Option<&Catalog>) -> bool {
        let ready = catalog.is_some_and(|c| !self.filtered(c).is_empty());
        self.controller.restore_scroll_position(|| ready)
    }

    /// Recompute geometry for a viewport of `area`, clamp the scroll and
    /// feed grid visibility to the controller.
    pub fn layout(&mut self, catalog: Option<&Catalog>, area: Rect, now: Instant) {
        let (intro, cards) = match catalog {
            Some(c) => (C::intro(c), self.controller.visible(&self.filtered(c)).len()),
            None => (&[][..], 0),
        };
        self.geometry = PageGeometry::compute(intro, cards, area.width);
        self.cards = cards;
        self.selected = self.selected.min(cards.saturating_sub(1));

        self.scroll.height = area.height;
        self.scroll.offset = self.scroll.offset.min(self.geometry.max_offset(area.height));

        let window = RowSpan::new(self.scroll.offset, u32::from(area.height));
        if let Some(intersecting) = self.watcher.observe(self.geometry.grid, window) {
            self.controller.set_grid_intersecting(intersecting);
        }

        let epoch = self.controller.reveal().epoch;
        if epoch != self.reveal_epoch {
            self.reveal_epoch = epoch;
            self.reveal_started = now;
        }
    }

    /// Build the widget model for the current frame.
    pub fn view<'a>(&self, catalog: &'a Catalog, stagger: Duration, now: Instant) -> GalleryView<'a> {
        let state = self.controller.state();
        let filtered = self.filtered(catalog);
        let elapsed = now.saturating_duration_since(self.reveal_started);

        let cards: Vec<CardView> = self
            .controller
            .visible(&filtered)
            .iter()
            .enumerate()
            .map(|(index, item)| CardView {
                text: C::card(item, catalog),
                look: card_look(self.controller.classify_for_animation(index), stagger, elapsed),
            })
            .collect();

        let generations = (!state.category.is_all()).then(|| {
            catalog
                .generations_for(C::items(catalog), state.category)
                .into_iter()
                .map(|g| (g.label(), state.subgroup_id == Some(g.id)))
                .collect()
        });

        GalleryView {
            title: C::TITLE,
            banner: catalog
                .recruiting_generation()
                .map(|g| format!("{} is recruiting", g.label())),
            intro: C::intro(catalog),
            categories: C::ALL
                .iter()
                .map(|c| (c.label(), *c == state.category))
                .collect(),
            generations,
            selected: (!cards.is_empty()).then(|| self.selected.min(cards.len() - 1)),
            cards,
            total: filtered.len(),
            has_more: self.controller.has_more(filtered.len()),
        }
    }

    pub fn render(&self, catalog: &Catalog, stagger: Duration, now: Instant, area: Rect, buf: &mut Buffer) {
        let view = self.view(catalog, stagger, now);
        GalleryWidget {
            view: &view,
            geometry: &self.geometry,
            offset: self.scroll.offset,
        }
        .render(area, buf);
    }

    // ── filter ──────────────────────────────────────────────────

    pub fn cycle_category(&mut self, forward: bool) -> C {
        let all = C::ALL;
        let current = all
            .iter()
            .position(|c| *c == self.controller.state().category)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.controller.select_category(all[next], &self.scroll);
        self.selected = 0;
        all[next]
    }

    /// Step to the next generation offered for the current category, wrapping
    /// back to "all generations".  `None` when the category is "all".
    pub fn cycle_generation(&mut self, catalog: &Catalog) -> Option<String> {
        let state = self.controller.state();
        if state.category.is_all() {
            return None;
        }
        let choices = catalog.generations_for(C::items(catalog), state.category);
        let next = match state.subgroup_id {
            None => choices.first().copied(),
            Some(id) => choices
                .iter()
                .position(|g| g.id == id)
                .and_then(|i| choices.get(i + 1))
                .copied(),
        };
        self.controller.select_subgroup(next.map(|g| g.id), &self.scroll);
        self.selected = 0;
        Some(next.map_or_else(|| "All generations".to_string(), |g| g.label()))
    }

    pub fn clear_generation(&mut self) {
        self.controller.select_subgroup(None, &self.scroll);
        self.selected = 0;
    }

    /// Show one more page if there is more to show.
    pub fn load_more(&mut self, catalog: &Catalog) -> bool {
        if !self.controller.has_more(self.filtered(catalog).len()) {
            return false;
        }
        self.controller.load_more(&self.scroll);
        true
    }

    // ── scrolling & selection ───────────────────────────────────

    pub fn scroll_by(&mut self, delta: i64) {
        let max = self.geometry.max_offset(self.scroll.height);
        let target = (i64::from(self.scroll.offset) + delta).clamp(0, i64::from(max));
        self.set_offset(u32::try_from(target).unwrap_or(0));
    }

    pub fn scroll_page(&mut self, forward: bool) {
        let step = i64::from(self.scroll.height.saturating_sub(1).max(1));
        self.scroll_by(if forward { step } else { -step });
    }

    /// Move the card selection by whole columns / rows and keep it on screen.
    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        if self.cards == 0 {
            return;
        }
        let columns = self.geometry.columns.max(1) as isize;
        let target = self.selected as isize + dx + dy * columns;
        self.selected = target.clamp(0, self.cards as isize - 1) as usize;
        self.reveal_selected();
    }

    pub fn select(&mut self, index: usize) {
        if index < self.cards {
            self.selected = index;
        }
    }

    fn reveal_selected(&mut self) {
        let span = self.geometry.card_span(self.selected);
        let height = u32::from(self.scroll.height);
        if span.top < self.scroll.offset {
            self.set_offset(span.top);
        } else if span.bottom() > self.scroll.offset + height {
            self.set_offset(span.bottom().saturating_sub(height));
        }
    }

    fn set_offset(&mut self, offset: u32) {
        if offset != self.scroll.offset {
            self.scroll.offset = offset;
            self.controller.on_scroll();
        }
    }

    /// Hit-test a click at `row` rows below the top of the viewport.
    pub fn hit(&self, row: u16, x: u16) -> PageHit {
        let doc_row = self.scroll.offset + u32::from(row);
        if let Some(index) = self.geometry.card_at(doc_row, x, self.cards) {
            PageHit::Card(index)
        } else if self.geometry.footer_contains(doc_row) {
            PageHit::LoadMore
        } else {
            PageHit::Nothing
        }
    }

    pub fn selected_item<'a>(&self, catalog: &'a Catalog) -> Option<&'a C::Item> {
        let filtered = self.filtered(catalog);
        self.controller.visible(&filtered).get(self.selected).copied()
    }

    pub fn detail(&self, catalog: &Catalog, catalog_dir: &Path) -> Option<DetailView> {
        self.selected_item(catalog)
            .map(|item| C::detail(item, catalog, catalog_dir))
    }

    // ── persistence ─────────────────────────────────────────────

    pub fn on_timer(&mut self, id: TimerId) -> bool {
        self.controller.on_timer(id, &mut self.scroll)
    }

    /// Save the snapshot and stop the controller's timers.
    pub fn unmount(&mut self) {
        self.controller.persist(&self.scroll);
        self.controller.unmount();
    }

    pub fn status(&self, catalog: &Catalog) -> String {
        let state = self.controller.state();
        let total = self.filtered(catalog).len();
        let shown = total.min(state.visible_count);
        let generation = state
            .subgroup_id
            .and_then(|id| catalog.generation(id))
            .map(|g| format!(" · {}", g.label()))
            .unwrap_or_default();
        format!(
            "{} · {}{generation} · {shown}/{total}",
            C::TITLE,
            state.category.label()
        )
    }
}

// ───────────────────────────────────────── active page ───────

/// The page currently mounted.
pub enum ActivePage {
    Projects(GalleryPage<ProjectCategory>),
    Activities(GalleryPage<ActivityCategory>),
}

macro_rules! on_page {
    ($page:expr, $p:ident => $body:expr) => {
        match $page {
            ActivePage::Projects($p) => $body,
            ActivePage::Activities($p) => $body,
        }
    };
}

impl ActivePage {
    pub fn mount(id: PageId, store: SessionStore, scheduler: TokioScheduler, options: GalleryOptions) -> Self {
        match id {
            PageId::Projects => ActivePage::Projects(GalleryPage::mount(store, scheduler, options)),
            PageId::Activities => {
                ActivePage::Activities(GalleryPage::mount(store, scheduler, options))
            }
        }
    }

    pub fn id(&self) -> PageId {
        match self {
            ActivePage::Projects(_) => ProjectCategory::ID,
            ActivePage::Activities(_) => ActivityCategory::ID,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ActivePage::Projects(_) => ProjectCategory::TITLE,
            ActivePage::Activities(_) => ActivityCategory::TITLE,
        }
    }

    pub fn try_restore(&mut self, catalog: Option<&Catalog>) -> bool {
        on_page!(self, p => p.try_restore(catalog))
    }

    pub fn layout(&mut self, catalog: Option<&Catalog>, area: Rect, now: Instant) {
        on_page!(self, p => p.layout(catalog, area, now))
    }

    pub fn render(&self, catalog: &Catalog, stagger: Duration, now: Instant, area: Rect, buf: &mut Buffer) {
        on_page!(self, p => p.render(catalog, stagger, now, area, buf))
    }

    pub fn cycle_category(&mut self, forward: bool) -> &'static str {
        on_page!(self, p => p.cycle_category(forward).label())
    }

    pub fn cycle_generation(&mut self, catalog: &Catalog) -> Option<String> {
        on_page!(self, p => p.cycle_generation(catalog))
    }

    pub fn clear_generation(&mut self) {
        on_page!(self, p => p.clear_generation())
    }

    pub fn load_more(&mut self, catalog: &Catalog) -> bool {
        on_page!(self, p => p.load_more(catalog))
    }

    pub fn scroll_by(&mut self, delta: i64) {
        on_page!(self, p => p.scroll_by(delta))
    }

    pub fn scroll_page(&mut self, forward: bool) {
        on_page!(self, p => p.scroll_page(forward))
    }

    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        on_page!(self, p => p.move_selection(dx, dy))
    }

    pub fn select(&mut self, index: usize) {
        on_page!(self, p => p.select(index))
    }

    pub fn selected(&self) -> usize {
        on_page!(self, p => p.selected())
    }

    pub fn hit(&self, row: u16, x: u16) -> PageHit {
        on_page!(self, p => p.hit(row, x))
    }

    pub fn detail(&self, catalog: &Catalog, catalog_dir: &Path) -> Option<DetailView> {
        on_page!(self, p => p.detail(catalog, catalog_dir))
    }

    pub fn on_timer(&mut self, id: TimerId) -> bool {
        on_page!(self, p => p.on_timer(id))
    }

    pub fn unmount(&mut self) {
        on_page!(self, p => p.unmount())
    }

    pub fn status(&self, catalog: &Catalog) -> String {
        on_page!(self, p => p.status(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualScheduler;
    use crate::core::storage::MemoryStore;

    type TestPage<C> = GalleryPage<C, MemoryStore, ManualScheduler>;

    const SAMPLE: &str = r#"{
        "generations": [
            {"id": 1, "number": 6},
            {"id": 2, "number": 7, "is_recruiting": true}
        ],
        "projects": [
            {"id": 1, "generation_id": 1, "category": "web", "title": "P1", "created_at": "2024-01-01T00:00:00Z"},
            {"id": 2, "generation_id": 2, "category": "web", "title": "P2", "created_at": "2024-02-01T00:00:00Z"},
            {"id": 3, "generation_id": 2, "category": "app", "title": "P3", "created_at": "2024-03-01T00:00:00Z"},
            {"id": 4, "generation_id": 2, "category": "web", "title": "P4", "created_at": "2024-04-01T00:00:00Z"},
            {"id": 5, "generation_id": 1, "category": "game", "title": "P5", "created_at": "2024-05-01T00:00:00Z"},
            {"id": 6, "generation_id": 2, "category": "web", "title": "P6", "created_at": "2024-06-01T00:00:00Z"},
            {"id": 7, "generation_id": 2, "category": "ai", "title": "P7", "created_at": "2024-07-01T00:00:00Z"},
            {"id": 8, "generation_id": 1, "category": "web", "title": "P8", "created_at": "2024-08-01T00:00:00Z"}
        ],
        "project_details": [
            {"project_id": 8, "role": "Backend", "tech_stack": ["Rust", "Postgres"]}
        ],
        "project_media": [
            {"id": 1, "project_id": 8, "url": "media/b.png", "order_index": 1},
            {"id": 2, "project_id": 8, "url": "https://cdn.example.com/a.png", "order_index": 0},
            {"id": 3, "project_id": 8, "url": "media/demo.mp4", "kind": "video", "order_index": 2}
        ]
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_json(SAMPLE).unwrap()
    }

    fn options(page_size: usize) -> GalleryOptions {
        GalleryOptions {
            page_size,
            ..GalleryOptions::default()
        }
    }

    fn mount(store: &MemoryStore, scheduler: &ManualScheduler, page_size: usize) -> TestPage<ProjectCategory> {
        GalleryPage::mount(store.clone(), scheduler.clone(), options(page_size))
    }

    #[test]
    fn reveal_looks_follow_the_stagger() {
        let stagger = Duration::from_millis(80);
        let second = Reveal {
            should_animate: true,
            order: 1,
        };
        assert_eq!(card_look(Reveal::IMMEDIATE, stagger, Duration::ZERO), CardLook::Normal);
        assert_eq!(card_look(second, stagger, Duration::from_millis(79)), CardLook::Hidden);
        assert_eq!(card_look(second, stagger, Duration::from_millis(80)), CardLook::Dim);
        assert_eq!(card_look(second, stagger, Duration::from_millis(160)), CardLook::Normal);
        assert_eq!(card_look(second, Duration::ZERO, Duration::ZERO), CardLook::Normal);
    }

    #[test]
    fn view_slices_the_filtered_list() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);
        let now = Instant::now();
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 30), now);

        let view = page.view(&catalog, Duration::ZERO, now);
        let titles: Vec<_> = view.cards.iter().map(|c| c.text.title.as_str()).collect();
        assert_eq!(titles, vec!["P8", "P7", "P6"]);
        assert_eq!(view.total, 8);
        assert!(view.has_more);
        assert!(view.generations.is_none());
        assert_eq!(view.banner.as_deref(), Some("Gen 7 is recruiting"));

        page.cycle_category(true);
        let view = page.view(&catalog, Duration::ZERO, now);
        assert_eq!(view.categories[1], ("Web", true));
        assert_eq!(view.total, 5);
        let gens: Vec<_> = view.generations.unwrap().into_iter().map(|(l, _)| l).collect();
        assert_eq!(gens, vec!["Gen 7", "Gen 6"]);
    }

    #[test]
    fn generation_cycle_wraps_back_to_all() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);

        assert_eq!(page.cycle_generation(&catalog), None, "no generations under all");

        page.cycle_category(true); // web
        assert_eq!(page.cycle_generation(&catalog).as_deref(), Some("Gen 7"));
        assert_eq!(page.state().subgroup_id, Some(2));
        assert_eq!(page.cycle_generation(&catalog).as_deref(), Some("Gen 6"));
        assert_eq!(page.cycle_generation(&catalog).as_deref(), Some("All generations"));
        assert_eq!(page.state().subgroup_id, None);
    }

    #[test]
    fn category_cycle_wraps_both_ways() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let mut page = mount(&store, &scheduler, 3);
        assert_eq!(page.cycle_category(false), ProjectCategory::Ai);
        assert_eq!(page.cycle_category(true), ProjectCategory::All);
    }

    #[test]
    fn load_more_stops_at_the_end_of_the_list() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);

        assert!(page.load_more(&catalog));
        assert!(page.load_more(&catalog));
        assert_eq!(page.state().visible_count, 9);
        assert!(!page.load_more(&catalog));
        assert_eq!(page.state().visible_count, 9);
    }

    #[test]
    fn scrolling_is_clamped_and_debounced() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 6);
        page.layout(Some(&catalog), Rect::new(0, 0, 30, 10), Instant::now());

        page.scroll_by(-5);
        assert_eq!(page.scroll().offset, 0);
        assert_eq!(scheduler.pending_count(), 0, "no movement, no save");

        page.scroll_by(10_000);
        assert_eq!(page.scroll().offset, page.geometry().max_offset(10));
        assert_eq!(scheduler.pending_count(), 1);

        for (id, _) in scheduler.advance(Duration::from_millis(150)) {
            assert!(page.on_timer(id));
        }
        let raw = store.raw(ProjectCategory::STORAGE_KEY).unwrap();
        assert!(raw.contains(&format!("\"scrollPosition\":{}", page.scroll().offset)));
    }

    #[test]
    fn selection_moves_by_rows_and_stays_on_screen() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 6);
        // Two columns, viewport shorter than the grid.
        page.layout(Some(&catalog), Rect::new(0, 0, 60, 12), Instant::now());

        page.move_selection(0, 2);
        assert_eq!(page.selected(), 4);
        let span = page.geometry().card_span(4);
        let scroll = page.scroll();
        assert!(span.top >= scroll.offset);
        assert!(span.bottom() <= scroll.offset + u32::from(scroll.height));

        page.move_selection(10, 10);
        assert_eq!(page.selected(), 5);
        page.move_selection(-10, -10);
        assert_eq!(page.selected(), 0);
    }

    #[test]
    fn restore_waits_for_a_non_empty_grid() {
        let mut store = MemoryStore::new();
        store
            .set(ProjectCategory::STORAGE_KEY, r#"{"category":"game","scrollPosition":12}"#)
            .unwrap();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);

        assert!(!page.try_restore(None));
        assert!(page.try_restore(Some(&catalog)));
        assert!(!page.try_restore(Some(&catalog)), "one shot");

        // Tall viewport: nothing to scroll, the restored offset is clamped.
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 20), Instant::now());
        for (id, _) in scheduler.advance(Duration::from_millis(300)) {
            assert!(page.on_timer(id));
        }
        assert_eq!(page.scroll().offset, 12);
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 20), Instant::now());
        assert_eq!(page.scroll().offset, page.geometry().max_offset(20));
    }

    #[test]
    fn restore_is_skipped_while_filter_matches_nothing() {
        let mut store = MemoryStore::new();
        store
            .set(ProjectCategory::STORAGE_KEY, r#"{"category":"app","subgroupId":1,"scrollPosition":4}"#)
            .unwrap();
        let scheduler = ManualScheduler::new();
        let mut page = mount(&store, &scheduler, 3);
        assert!(!page.try_restore(Some(&catalog())));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn hit_testing_accounts_for_scroll() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 40), Instant::now());

        let grid_top = u16::try_from(page.geometry().grid.top).unwrap();
        assert_eq!(page.hit(grid_top, 31), PageHit::Card(1));
        let footer = u16::try_from(page.geometry().footer.top).unwrap();
        assert_eq!(page.hit(footer, 0), PageHit::LoadMore);
        assert_eq!(page.hit(0, 0), PageHit::Nothing);
    }

    #[test]
    fn detail_collects_fields_and_ordered_media() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 40), Instant::now());

        let detail = page.detail(&catalog, Path::new("/srv/club")).unwrap();
        assert_eq!(detail.title, "P8");
        assert_eq!(detail.subtitle, "Web · Gen 6");
        assert_eq!(detail.fields[0], ("Role", "Backend".to_string()));
        assert_eq!(detail.fields[1], ("Stack", "Rust, Postgres".to_string()));

        let locals: Vec<_> = detail.media.iter().map(|m| m.local.clone()).collect();
        assert_eq!(
            locals,
            vec![None, Some(std::path::PathBuf::from("/srv/club/media/b.png")), None]
        );
    }

    #[test]
    fn status_line_names_page_and_counts() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let page = mount(&store, &scheduler, 3);
        assert_eq!(page.status(&catalog), "Projects · All · 3/8");
    }

    #[test]
    fn grid_on_screen_at_mount_animates_the_loaded_page() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let stagger = Duration::from_secs(1);
        let t0 = Instant::now();

        let mut page = mount(&store, &scheduler, 3);
        assert!(page.load_more(&catalog));
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 30), t0);

        let looks: Vec<_> = page.view(&catalog, stagger, t0).cards.iter().map(|c| c.look).collect();
        assert_eq!(
            looks,
            vec![
                CardLook::Normal,
                CardLook::Normal,
                CardLook::Normal,
                CardLook::Dim,
                CardLook::Hidden,
                CardLook::Hidden,
            ]
        );
    }

    #[test]
    fn grid_below_the_viewport_does_not_animate() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let t0 = Instant::now();

        let mut page = mount(&store, &scheduler, 3);
        assert!(page.load_more(&catalog));
        // Intro and filter bar fill the whole window.
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 3), t0);

        let view = page.view(&catalog, Duration::from_secs(1), t0);
        assert!(view.cards.iter().all(|c| c.look == CardLook::Normal));
    }

    #[test]
    fn unmount_saves_scroll_and_cancels_pending_save() {
        let store = MemoryStore::new();
        let scheduler = ManualScheduler::new();
        let catalog = catalog();
        let mut page = mount(&store, &scheduler, 3);
        page.layout(Some(&catalog), Rect::new(0, 0, 90, 10), Instant::now());

        page.scroll_by(2);
        assert_eq!(scheduler.pending_count(), 1, "debounced save armed");

        page.unmount();
        assert_eq!(scheduler.pending_count(), 0);
        let saved = store.raw(ProjectCategory::STORAGE_KEY).unwrap();
        assert!(saved.contains("\"scrollPosition\":2"), "{saved}");
    }
}
