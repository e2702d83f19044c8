//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::{ActiveView, AppState};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle: reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
    /// One-off action.
    Command {
        label: &'static str,
        run: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. }
            | Self::Command { label, .. } => label,
        }
    }

    /// Current value shown after the label, if the item has one.
    pub fn value(&self, state: &AppState) -> Option<String> {
        match self {
            Self::Toggle { get, .. } => Some(if get(state) { "ON" } else { "OFF" }.to_string()),
            Self::Cycle { value, .. } => Some(value(state)),
            Self::Submenu { .. } | Self::Command { .. } => None,
        }
    }

    /// Carry out the item's effect.
    pub fn activate(&self, state: &mut AppState) {
        match self {
            Self::Submenu { view, .. } => {
                state.active_view = *view;
                state.controls_selected = 0;
            }
            Self::Toggle { get, set, .. } => {
                let current = get(state);
                set(state, !current);
            }
            Self::Cycle { cycle, .. } => cycle(state),
            Self::Command { run, .. } => run(state),
        }
    }
}

/// Next entry after `current` in `choices`, wrapping; `fallback` positions
/// values that are not in the list.
fn next_choice<T: Copy + PartialEq>(choices: &[T], current: T, fallback: usize) -> T {
    let idx = choices.iter().position(|c| *c == current).unwrap_or(fallback);
    choices[(idx + 1) % choices.len()]
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Cycle {
        label: "Page Size",
        value: |s| s.config.page_size.to_string(),
        cycle: |s| {
            s.config.page_size = next_choice(&[3, 6, 9, 12], s.config.page_size, 0);
            s.save_config();
            s.remount();
            s.status_message = Some(format!("Page size: {}", s.config.page_size));
        },
    },
    SettingsItem::Toggle {
        label: "Restore Load-More Window",
        get: |s| s.config.restore_visible_count,
        set: |s, v| {
            s.config.restore_visible_count = v;
            s.save_config();
            s.remount();
        },
    },
    SettingsItem::Cycle {
        label: "Reveal Stagger",
        value: |s| format!("{}ms", s.config.reveal_stagger_ms),
        cycle: |s| {
            s.config.reveal_stagger_ms =
                next_choice(&[0, 40, 80, 120, 200], s.config.reveal_stagger_ms, 1);
            s.save_config();
            s.status_message = Some(format!("Reveal stagger: {}ms", s.config.reveal_stagger_ms));
        },
    },
    SettingsItem::Cycle {
        label: "Scroll Save Delay",
        value: |s| format!("{}ms", s.config.scroll_save_debounce_ms),
        cycle: |s| {
            s.config.scroll_save_debounce_ms =
                next_choice(&[100, 150, 300, 500], s.config.scroll_save_debounce_ms, 0);
            s.save_config();
            s.remount();
            s.status_message = Some(format!(
                "Scroll save delay: {}ms",
                s.config.scroll_save_debounce_ms
            ));
        },
    },
    SettingsItem::Command {
        label: "Forget Saved Positions",
        run: |s| {
            s.forget_saved_positions();
            s.status_message = Some("Saved filters and scroll positions cleared".to_string());
        },
    },
];
