//! Viewport port and intersection bookkeeping.
//!
//! Offsets and spans are measured in rows from the top of the page.

/// The scrollable surface the gallery lives in.
pub trait Viewport {
    /// Current distance from the top of the page.
    fn scroll_offset(&self) -> u32;
    fn scroll_to(&mut self, offset: u32);
}

/// A vertical range `[top, top + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowSpan {
    pub top: u32,
    pub height: u32,
}

impl RowSpan {
    pub fn new(top: u32, height: u32) -> Self {
        Self { top, height }
    }

    pub fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// True when the two spans share at least one row.
    pub fn intersects(self, other: RowSpan) -> bool {
        self.height > 0 && other.height > 0 && self.top < other.bottom() && other.top < self.bottom()
    }
}

/// Watches one container against the viewport and reports changes.
///
/// The first observation always reports, which covers a container that is
/// already on screen when watching begins.
#[derive(Debug, Default)]
pub struct IntersectionWatcher {
    last: Option<bool>,
}

impl IntersectionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(intersecting)` on the first call and whenever the answer
    /// changes; `None` otherwise.
    pub fn observe(&mut self, container: RowSpan, viewport: RowSpan) -> Option<bool> {
        let now = container.intersects(viewport);
        if self.last == Some(now) {
            return None;
        }
        self.last = Some(now);
        Some(now)
    }
}
