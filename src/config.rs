//! User configuration: keybindings, gallery settings, and persistence.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/club-gallery/config.toml` (default
//! `~/.config/club-gallery/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::gallery::{GalleryOptions, RestorePolicy};

const DEFAULT_REVEAL_STAGGER_MS: u64 = 80;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on a gallery page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextCategory,
    PrevCategory,
    NextGeneration,
    ClearGeneration,
    LoadMore,
    OpenDetail,
    SwitchPage,
    ScrollPageUp,
    ScrollPageDown,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::NextCategory,
        Action::PrevCategory,
        Action::NextGeneration,
        Action::ClearGeneration,
        Action::LoadMore,
        Action::OpenDetail,
        Action::SwitchPage,
        Action::ScrollPageUp,
        Action::ScrollPageDown,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::MoveLeft => "Move Left",
            Action::MoveRight => "Move Right",
            Action::NextCategory => "Next Category",
            Action::PrevCategory => "Prev Category",
            Action::NextGeneration => "Next Generation",
            Action::ClearGeneration => "All Generations",
            Action::LoadMore => "Load More",
            Action::OpenDetail => "Open Detail",
            Action::SwitchPage => "Switch Page",
            Action::ScrollPageUp => "Scroll Page Up",
            Action::ScrollPageDown => "Scroll Page Down",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::NextCategory => "next_category",
            Action::PrevCategory => "prev_category",
            Action::NextGeneration => "next_generation",
            Action::ClearGeneration => "clear_generation",
            Action::LoadMore => "load_more",
            Action::OpenDetail => "open_detail",
            Action::SwitchPage => "switch_page",
            Action::ScrollPageUp => "scroll_page_up",
            Action::ScrollPageDown => "scroll_page_down",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code plus modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.  SHIFT is ignored for character
    /// keys since it is already part of the character (`G`, `?`, `]`).
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code
            && significant_modifiers(self.code, self.modifiers)
                == significant_modifiers(event.code, event.modifiers)
    }

    /// Create a binding from a raw key event (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: significant_modifiers(event.code, event.modifiers),
        }
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Alt+Up"`, `"Ctrl+c"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"G"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = *parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        // Single characters keep their case: `g` and `G` are different keys.
        let mut chars = key_part.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyBind::new(KeyCode::Char(c), modifiers));
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn significant_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    let mut mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
    if matches!(code, KeyCode::Char(_)) {
        mask.remove(KeyModifiers::SHIFT);
    }
    modifiers & mask
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: keybindings and gallery behaviour.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Items per "load more" step and the initial window.
    pub page_size: usize,
    /// Quiet period before a scroll position is saved.
    pub scroll_save_debounce_ms: u64,
    /// Delay between the list loading and the stored scroll being applied.
    pub scroll_restore_delay_ms: u64,
    /// Per-card delay of the entrance animation.
    pub reveal_stagger_ms: u64,
    /// Restore the load-more window too, not just the filter.
    pub restore_visible_count: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gallery = GalleryOptions::default();
        Self {
            bindings: Self::default_bindings(),
            page_size: gallery.page_size,
            scroll_save_debounce_ms: millis(gallery.scroll_save_debounce),
            scroll_restore_delay_ms: millis(gallery.scroll_restore_delay),
            reveal_stagger_ms: DEFAULT_REVEAL_STAGGER_MS,
            restore_visible_count: false,
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(MoveLeft, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(MoveRight, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(NextCategory, vec![KeyBind::new(Char(']'), n)]);
        m.insert(PrevCategory, vec![KeyBind::new(Char('['), n)]);
        m.insert(NextGeneration, vec![KeyBind::new(Char('g'), n)]);
        m.insert(ClearGeneration, vec![KeyBind::new(Char('G'), n)]);
        m.insert(LoadMore, vec![KeyBind::new(Char('m'), n)]);
        m.insert(OpenDetail, vec![KeyBind::new(Enter, n)]);
        m.insert(SwitchPage, vec![KeyBind::new(Tab, n)]);
        m.insert(ScrollPageUp, vec![KeyBind::new(PageUp, n)]);
        m.insert(ScrollPageDown, vec![KeyBind::new(PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Options handed to every gallery controller mounted with this config.
    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions {
            page_size: self.page_size,
            scroll_save_debounce: Duration::from_millis(self.scroll_save_debounce_ms),
            scroll_restore_delay: Duration::from_millis(self.scroll_restore_delay_ms),
            restore_policy: if self.restore_visible_count {
                RestorePolicy::Full
            } else {
                RestorePolicy::FilterOnly
            },
        }
    }

    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Add a binding for `action`, taking the key away from any other action.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}{}: category | {}: generation | {}: more | {}: detail | {}: page | {}: settings",
            self.short_binding(Action::PrevCategory),
            self.short_binding(Action::NextCategory),
            self.short_binding(Action::NextGeneration),
            self.short_binding(Action::LoadMore),
            self.short_binding(Action::OpenDetail),
            self.short_binding(Action::SwitchPage),
            self.short_binding(Action::OpenSettings),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Persist current config to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    /// Save, logging instead of failing.  Settings edits go through here.
    pub fn save_or_warn(&self, path: &Path) {
        if let Err(e) = self.save_to(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not save config");
        }
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Gallery settings.  Out-of-range numbers are clamped.
            match key {
                "page_size" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.page_size = v.clamp(1, 60);
                    }
                    continue;
                }
                "scroll_save_debounce_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.scroll_save_debounce_ms = v.min(5000);
                    }
                    continue;
                }
                "scroll_restore_delay_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.scroll_restore_delay_ms = v.min(5000);
                    }
                    continue;
                }
                "reveal_stagger_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.reveal_stagger_ms = v.min(1000);
                    }
                    continue;
                }
                "restore_visible_count" => {
                    config.restore_visible_count = value == "true";
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(key, "unknown config key ignored");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .map(|part| part.trim().trim_matches('"'))
                .filter_map(KeyBind::parse)
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# club-gallery configuration".to_string(),
            String::new(),
            "# Gallery settings".to_string(),
            format!("page_size = {}", self.page_size),
            format!("scroll_save_debounce_ms = {}", self.scroll_save_debounce_ms),
            format!("scroll_restore_delay_ms = {}", self.scroll_restore_delay_ms),
            format!("reveal_stagger_ms = {}", self.reveal_stagger_ms),
            format!("restore_visible_count = {}", self.restore_visible_count),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Return the config file path (`$XDG_CONFIG_HOME/club-gallery/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("club-gallery").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gallery::DEFAULT_PAGE_SIZE;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn defaults_match_gallery_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.gallery_options(), GalleryOptions::default());
    }

    #[test]
    fn shifted_characters_match_plain_bindings() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(Action::ClearGeneration)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Char('g'), KeyModifiers::NONE)),
            Some(Action::NextGeneration)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Char('?'), KeyModifiers::SHIFT)),
            Some(Action::OpenSettings)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn parse_keeps_character_case() {
        assert_eq!(
            KeyBind::parse("G"),
            Some(KeyBind::new(KeyCode::Char('G'), KeyModifiers::NONE))
        );
        assert_eq!(
            KeyBind::parse("Alt+Up"),
            Some(KeyBind::new(KeyCode::Up, KeyModifiers::ALT))
        );
        assert_eq!(KeyBind::parse("Hyper+x"), None);
    }

    #[test]
    fn settings_are_parsed_and_clamped() {
        let config = AppConfig::parse_config(
            "# comment\n\
             page_size = 0\n\
             reveal_stagger_ms = 99999\n\
             restore_visible_count = true\n\
             load_more = n, End\n\
             bogus = 3\n",
        );
        assert_eq!(config.page_size, 1);
        assert_eq!(config.reveal_stagger_ms, 1000);
        assert_eq!(config.gallery_options().restore_policy, RestorePolicy::Full);
        assert_eq!(config.display_bindings(Action::LoadMore), "n/End");
        assert_eq!(config.scroll_save_debounce_ms, 150);
    }

    #[test]
    fn save_then_load_preserves_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.page_size = 9;
        config.scroll_restore_delay_ms = 500;
        config.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.page_size, 9);
        assert_eq!(loaded.scroll_restore_delay_ms, 500);
        assert_eq!(loaded.bindings, config.bindings);
    }

    #[test]
    fn add_binding_steals_key_from_other_action() {
        let mut config = AppConfig::default();
        config.add_binding(Action::LoadMore, KeyBind::new(KeyCode::Char('g'), KeyModifiers::NONE));
        assert_eq!(
            config.match_key(key(KeyCode::Char('g'), KeyModifiers::NONE)),
            Some(Action::LoadMore)
        );
        assert_eq!(config.display_bindings(Action::NextGeneration), "unbound");
    }
}
