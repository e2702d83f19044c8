//! Input handling.  Maps key and mouse events to state mutations.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::{Action, KeyBind};
use crate::ui::layout::AppLayout;

use super::page::PageHit;
use super::settings::SETTINGS_ITEMS;
use super::state::{ActiveView, AppState};

/// Rows moved per mouse-wheel notch.
const WHEEL_ROWS: i64 = 3;

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Gallery => handle_gallery_key(state, key),
        ActiveView::Detail => handle_detail_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Gallery page (configurable bindings) ────────────────────────

fn handle_gallery_key(state: &mut AppState, key: KeyEvent) {
    // Navigation keys that always work on the page.
    match key.code {
        KeyCode::Home => {
            state.page.scroll_by(-i64::from(u32::MAX));
            return;
        }
        KeyCode::End => {
            state.page.scroll_by(i64::from(u32::MAX));
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::MoveUp => state.page.move_selection(0, -1),
        Action::MoveDown => state.page.move_selection(0, 1),
        Action::MoveLeft => state.page.move_selection(-1, 0),
        Action::MoveRight => state.page.move_selection(1, 0),
        Action::NextCategory | Action::PrevCategory => {
            let label = state.page.cycle_category(action == Action::NextCategory);
            state.status_message = Some(format!("Category: {label}"));
        }
        Action::NextGeneration => {
            let Some(catalog) = state.catalog.as_ref() else {
                return;
            };
            state.status_message = Some(match state.page.cycle_generation(catalog) {
                Some(label) => format!("Generation: {label}"),
                None => "Pick a category to filter by generation".to_string(),
            });
        }
        Action::ClearGeneration => {
            state.page.clear_generation();
            state.status_message = Some("Generation: All generations".to_string());
        }
        Action::LoadMore => load_more(state),
        Action::OpenDetail => state.open_detail(),
        Action::SwitchPage => {
            let next = state.page.id().other();
            state.switch_page(next);
            state.status_message = None;
        }
        Action::ScrollPageUp => state.page.scroll_page(false),
        Action::ScrollPageDown => state.page.scroll_page(true),
    }
}

fn load_more(state: &mut AppState) {
    let Some(catalog) = state.catalog.as_ref() else {
        return;
    };
    if !state.page.load_more(catalog) {
        state.status_message = Some("Everything is already shown".to_string());
    }
}

// ── Detail overlay ──────────────────────────────────────────────

fn handle_detail_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') | KeyCode::Enter => {
            state.close_detail();
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            state.step_media(-1);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            state.step_media(1);
        }
        _ => {}
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Gallery;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                item.activate(state);
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Gallery;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected < item_count - 1 {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                state.save_config();
                state.status_message = Some("Key bindings reset".to_string());
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                state.save_config();
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    // Only process Press events (ignore Release/Repeat on supported terminals).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }

    let Some(&action) = Action::ALL.get(state.controls_selected) else {
        state.awaiting_rebind = false;
        return;
    };
    state.config.add_binding(action, KeyBind::from_key_event(key));
    state.save_config();
    state.awaiting_rebind = false;
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match state.active_view {
        ActiveView::Detail => handle_detail_mouse(state, mouse),
        ActiveView::Gallery => handle_gallery_mouse(state, mouse),
        ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => {}
    }
}

fn handle_gallery_mouse(state: &mut AppState, mouse: MouseEvent) {
    let viewport = AppLayout::from_area(state.terminal_area).page_inner;
    if !point_in_rect(viewport, mouse.column, mouse.row) {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => state.page.scroll_by(-WHEEL_ROWS),
        MouseEventKind::ScrollDown => state.page.scroll_by(WHEEL_ROWS),
        MouseEventKind::Down(MouseButton::Left) => {
            let row = mouse.row - viewport.y;
            let x = mouse.column - viewport.x;
            match state.page.hit(row, x) {
                // A click on the highlighted card opens it.
                PageHit::Card(index) if index == state.page.selected() => state.open_detail(),
                PageHit::Card(index) => state.page.select(index),
                PageHit::LoadMore => load_more(state),
                PageHit::Nothing => {}
            }
        }
        _ => {}
    }
}

fn handle_detail_mouse(state: &mut AppState, mouse: MouseEvent) {
    let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
        return;
    };
    let Some(zones) = state.detail_hit_zones else {
        return;
    };
    if point_in_rect(zones.close_rect, mouse.column, mouse.row) {
        state.close_detail();
    } else if point_in_rect(zones.prev_rect, mouse.column, mouse.row) {
        state.step_media(-1);
    } else if point_in_rect(zones.next_rect, mouse.column, mouse.row) {
        state.step_media(1);
    }
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Instant;

    use tokio::sync::mpsc;

    use super::*;
    use crate::app::event::AppEvent;
    use crate::app::page::PageId;
    use crate::config::AppConfig;
    use crate::core::catalog::Catalog;
    use crate::core::storage::SessionStore;

    const SAMPLE: &str = r#"{
        "generations": [{"id": 1, "number": 7}],
        "projects": [
            {"id": 1, "generation_id": 1, "category": "web", "title": "Club Site", "created_at": "2025-03-01T00:00:00Z"},
            {"id": 2, "generation_id": 1, "category": "app", "title": "Lunch Roulette", "created_at": "2025-02-01T00:00:00Z"},
            {"id": 3, "generation_id": 1, "category": "game", "title": "Pixel Run", "created_at": "2025-01-01T00:00:00Z"}
        ],
        "activities": [
            {"id": 1, "generation_id": 1, "category": "study", "title": "Rust Study", "held_on": "2025-04-02"},
            {"id": 2, "generation_id": 1, "category": "event", "title": "Demo Day", "held_on": "2025-06-20"}
        ]
    }"#;

    fn test_state(dir: &Path) -> (AppState, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(
            &dir.join("catalog.json"),
            PageId::Projects,
            SessionStore::with_dir(dir.join("session")),
            tx,
            AppConfig::default(),
            dir.join("config.toml"),
        );
        state.catalog_loaded(Ok(Catalog::from_json(SAMPLE).unwrap()));
        state.terminal_area = Rect::new(0, 0, 100, 40);
        state.layout(Instant::now());
        (state, rx)
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
        state.layout(Instant::now());
    }

    fn click(state: &mut AppState, column: u16, row: u16) {
        handle_mouse(
            state,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        );
    }

    fn status(state: &AppState) -> String {
        state.page.status(state.catalog.as_ref().unwrap())
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_any_view() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());
        state.active_view = ActiveView::ControlsSubmenu;
        state.awaiting_rebind = true;
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[tokio::test]
    async fn category_keys_filter_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());

        press(&mut state, KeyCode::Char(']'));
        assert_eq!(state.status_message.as_deref(), Some("Category: Web"));
        assert_eq!(status(&state), "Projects · Web · 1/1");

        press(&mut state, KeyCode::Char('g'));
        assert_eq!(state.status_message.as_deref(), Some("Generation: Gen 7"));
        assert_eq!(status(&state), "Projects · Web · Gen 7 · 1/1");

        press(&mut state, KeyCode::Char('['));
        press(&mut state, KeyCode::Char('g'));
        assert_eq!(
            state.status_message.as_deref(),
            Some("Pick a category to filter by generation")
        );
    }

    #[tokio::test]
    async fn switching_pages_keeps_each_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());

        press(&mut state, KeyCode::Char(']')); // projects: web
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.page.id(), PageId::Activities);
        assert_eq!(status(&state), "Activities · All · 2/2");

        press(&mut state, KeyCode::Char('[')); // activities: event
        press(&mut state, KeyCode::Tab);
        assert_eq!(status(&state), "Projects · Web · 1/1");
        press(&mut state, KeyCode::Tab);
        assert_eq!(status(&state), "Activities · Event · 1/1");
    }

    #[tokio::test]
    async fn load_more_reports_when_nothing_is_left() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());
        press(&mut state, KeyCode::Char('m'));
        assert_eq!(
            state.status_message.as_deref(),
            Some("Everything is already shown")
        );
    }

    #[tokio::test]
    async fn settings_cycle_saves_config_and_remounts() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());
        press(&mut state, KeyCode::Char(']'));

        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.config.page_size, 9);
        let saved = std::fs::read_to_string(tmp.path().join("config.toml")).unwrap();
        assert!(saved.contains("page_size = 9"));
        // The remounted page picked its filter back up from the session.
        assert_eq!(status(&state), "Projects · Web · 1/1");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.active_view, ActiveView::Gallery);
    }

    #[tokio::test]
    async fn rebinding_captures_the_next_key() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());

        press(&mut state, KeyCode::Char('?'));
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.active_view, ActiveView::ControlsSubmenu);

        let load_more = Action::ALL.iter().position(|a| *a == Action::LoadMore).unwrap();
        for _ in 0..load_more {
            press(&mut state, KeyCode::Down);
        }
        press(&mut state, KeyCode::Enter);
        assert!(state.awaiting_rebind);
        press(&mut state, KeyCode::Char('n'));

        assert!(!state.awaiting_rebind);
        assert_eq!(
            state.config.match_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)),
            Some(Action::LoadMore)
        );
    }

    #[tokio::test]
    async fn clicking_selects_then_opens_a_card() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());

        let viewport = AppLayout::from_area(state.terminal_area).page_inner;
        let grid_top = match &state.page {
            crate::app::page::ActivePage::Projects(p) => p.geometry().grid.top as u16,
            crate::app::page::ActivePage::Activities(p) => p.geometry().grid.top as u16,
        };
        let (x, y) = (viewport.x + 40, viewport.y + grid_top + 1);

        click(&mut state, x, y);
        assert_eq!(state.page.selected(), 1);
        assert_eq!(state.active_view, ActiveView::Gallery);

        click(&mut state, x, y);
        assert_eq!(state.active_view, ActiveView::Detail);
        assert_eq!(state.detail.as_ref().unwrap().view.title, "Lunch Roulette");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.active_view, ActiveView::Gallery);
        assert!(state.detail.is_none());
    }

    #[tokio::test]
    async fn wheel_outside_the_page_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut state, _rx) = test_state(tmp.path());
        state.terminal_area = Rect::new(0, 0, 40, 10);
        state.layout(Instant::now());

        handle_mouse(
            &mut state,
            MouseEvent {
                kind: MouseEventKind::ScrollDown,
                column: 5,
                row: 9, // status bar
                modifiers: KeyModifiers::NONE,
            },
        );
        let offset = match &state.page {
            crate::app::page::ActivePage::Projects(p) => p.scroll().offset,
            crate::app::page::ActivePage::Activities(p) => p.scroll().offset,
        };
        assert_eq!(offset, 0);
    }
}
