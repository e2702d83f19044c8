//! Loading indicator: a small spinner and label rendered in the top-right
//! corner of a given area.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A "loading…" marker with a spinning icon.
///
/// Render this over the page border.  It is invisible when `visible` is
/// false.
pub struct LoadingIndicator<'a> {
    pub visible: bool,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
    pub label: &'a str,
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.height == 0 {
            return;
        }

        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        let label = format!(" {frame} {} ", self.label);
        let label_width = label.chars().count() as u16;
        if area.width < label_width + 2 {
            return;
        }

        // Top-right, leaving one column for the border corner.
        let x = area.x + area.width.saturating_sub(label_width + 2);
        let line = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(x, area.y, &line, label_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_indicator_draws_nothing() {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        LoadingIndicator {
            visible: false,
            tick: 3,
            label: "loading",
        }
        .render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn frame_follows_tick() {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        LoadingIndicator {
            visible: true,
            tick: 11,
            label: "loading",
        }
        .render(area, &mut buf);
        // " ⠙ loading " is 11 wide, placed 2 in from the right edge.
        assert_eq!(buf[(18u16, 0u16)].symbol(), "⠙");
    }
}
