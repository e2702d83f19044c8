//! Layout helpers.  Split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

/// Primary screen layout: the framed page and a bottom status bar.
pub struct AppLayout {
    /// The page frame, border included.
    pub page_area: Rect,
    /// Inside the page border; the scrollable viewport.
    pub page_inner: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // page (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let page_area = chunks[0];
        Self {
            page_area,
            page_inner: Block::default().borders(Borders::ALL).inner(page_area),
            status_area: chunks[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_inner_sits_inside_the_border() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.page_area, Rect::new(0, 0, 80, 23));
        assert_eq!(layout.page_inner, Rect::new(1, 1, 78, 21));
        assert_eq!(layout.status_area, Rect::new(0, 23, 80, 1));
    }
}
