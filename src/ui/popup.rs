//! Popup overlay widgets for the settings menu and controls submenu.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::app::state::AppState;
use crate::config::{Action, AppConfig};

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

// ───────────────────────────────────────── settings popup ────

/// Settings menu popup overlay.
pub struct SettingsPopup<'a> {
    pub state: &'a AppState,
}

impl Widget for SettingsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (SETTINGS_ITEMS.len() as u16) + 5;
        let popup = centered_fixed(48, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Settings ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let selected = i == self.state.settings_selected;
            let prefix = if selected { " ▸ " } else { "   " };
            let mut spans = vec![Span::styled(
                format!("{prefix}{:<26}", item.label()),
                row_style(selected),
            )];

            if let Some(value) = item.value(self.state) {
                let value_style = match (item, value.as_str()) {
                    (SettingsItem::Toggle { .. }, "ON") => Style::default().fg(Color::Green),
                    (SettingsItem::Toggle { .. }, _) => Style::default().fg(Color::DarkGray),
                    _ => Style::default().fg(Color::Yellow),
                };
                spans.push(Span::styled(format!("[{value}]"), value_style));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Interactive controls / keybinding popup overlay.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub selected: usize,
    pub awaiting_rebind: bool,
}

impl Widget for ControlsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Actions, two blanks, reset row, hint, borders.
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(56, height, area);
        Clear.render(popup, buf);

        let block = popup_block(" Controls ");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];

        for (i, &action) in Action::ALL.iter().enumerate() {
            let is_selected = i == self.selected;
            let rebinding = is_selected && self.awaiting_rebind;
            let prefix = if is_selected { " ▸ " } else { "   " };

            let keys_display = if rebinding {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };

            let key_style = match (is_selected, rebinding) {
                (true, true) => Style::default()
                    .fg(Color::Yellow)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Yellow).bg(Color::DarkGray),
                _ => Style::default().fg(Color::Yellow),
            };

            // Label left-aligned, keys right-aligned.
            let label_col = format!("{prefix}{:<24}", action.label());
            let keys_width = (inner.width as usize)
                .saturating_sub(label_col.chars().count())
                .max(1);
            let keys_col = format!("{keys_display:>keys_width$}");

            lines.push(Line::from(vec![
                Span::styled(label_col, row_style(is_selected)),
                Span::styled(keys_col, key_style),
            ]));
        }

        let reset_selected = self.selected == Action::ALL.len();
        let reset_prefix = if reset_selected { " ▸ " } else { "   " };
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{reset_prefix}⟳ Reset to defaults"),
            row_style(reset_selected),
        )));

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter: add key  Del: clear  Esc: back",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 30, 10);
        assert_eq!(centered_fixed(48, 20, area), area);
        assert_eq!(centered_fixed(10, 4, area), Rect::new(10, 3, 10, 4));
    }

    #[test]
    fn controls_popup_marks_the_row_being_rebound() {
        let config = AppConfig::default();
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        ControlsPopup {
            config: &config,
            selected: 0,
            awaiting_rebind: true,
        }
        .render(area, &mut buf);

        let popup = centered_fixed(56, Action::ALL.len() as u16 + 7, area);
        // Border row, blank row, then the first action.
        let y = popup.y + 2;
        let row: String = (popup.x..popup.x + popup.width)
            .filter_map(|x| buf.cell((x, y)))
            .map(|c| c.symbol().to_string())
            .collect();
        assert!(row.contains("Press a key…"), "{row}");
    }
}
