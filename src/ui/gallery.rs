//! Gallery page rendering.
//!
//! A page is one tall document: header and introduction, filter bar, card
//! grid, load-more footer.  [`PageGeometry`] places those sections in
//! document rows; the widget draws the document and shows the window that
//! starts at the current scroll offset.  Input handling shares the same
//! geometry for hit-testing and keeping the selection on screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::core::records::Introduce;
use crate::core::viewport::RowSpan;

use super::theme::Theme;

/// Narrowest card before the grid drops a column.
pub const CARD_MIN_WIDTH: u16 = 30;
/// Card height in rows, including the gap below it.
pub const CARD_HEIGHT: u16 = 7;

const HEADER_ROWS: u32 = 2;
const FILTER_ROWS: u32 = 3;
const FOOTER_ROWS: u32 = 2;
const EMPTY_GRID_ROWS: u32 = 3;

// ───────────────────────────────────────── geometry ──────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageGeometry {
    pub intro: RowSpan,
    pub filter: RowSpan,
    pub grid: RowSpan,
    pub footer: RowSpan,
    pub columns: usize,
    pub card_width: u16,
}

impl PageGeometry {
    /// Lay out a page `width` columns wide showing `cards` cards.
    pub fn compute(intro: &[Introduce], cards: usize, width: u16) -> Self {
        let columns = (width / CARD_MIN_WIDTH).max(1);
        let card_width = (width / columns).max(1);
        let columns = usize::from(columns);

        let intro_rows = HEADER_ROWS + intro.iter().map(intro_section_rows).sum::<u32>();
        let intro = RowSpan::new(0, intro_rows);
        let filter = RowSpan::new(intro.bottom(), FILTER_ROWS);
        let grid_rows = if cards == 0 {
            EMPTY_GRID_ROWS
        } else {
            let rows = u32::try_from(cards.div_ceil(columns)).unwrap_or(u32::MAX);
            rows.saturating_mul(u32::from(CARD_HEIGHT))
        };
        let grid = RowSpan::new(filter.bottom(), grid_rows);
        let footer = RowSpan::new(grid.bottom(), FOOTER_ROWS);

        Self {
            intro,
            filter,
            grid,
            footer,
            columns,
            card_width,
        }
    }

    pub fn total_rows(&self) -> u32 {
        self.footer.bottom()
    }

    /// Largest useful scroll offset for a viewport `rows` tall.
    pub fn max_offset(&self, rows: u16) -> u32 {
        self.total_rows().saturating_sub(u32::from(rows))
    }

    pub fn card_span(&self, index: usize) -> RowSpan {
        let row = u32::try_from(index / self.columns.max(1)).unwrap_or(u32::MAX);
        RowSpan::new(
            self.grid
                .top
                .saturating_add(row.saturating_mul(u32::from(CARD_HEIGHT))),
            u32::from(CARD_HEIGHT),
        )
    }

    /// Card under document row `doc_row` and column `x`, if any.
    pub fn card_at(&self, doc_row: u32, x: u16, cards: usize) -> Option<usize> {
        if doc_row < self.grid.top || doc_row >= self.grid.bottom() {
            return None;
        }
        let row = ((doc_row - self.grid.top) / u32::from(CARD_HEIGHT)) as usize;
        let col = usize::from(x / self.card_width);
        if col >= self.columns {
            return None;
        }
        let index = row * self.columns + col;
        (index < cards).then_some(index)
    }

    pub fn footer_contains(&self, doc_row: u32) -> bool {
        doc_row >= self.footer.top && doc_row < self.footer.bottom()
    }
}

fn intro_section_rows(section: &Introduce) -> u32 {
    let body = section.body.lines().count().max(1);
    // Title, body, blank.
    2 + u32::try_from(body).unwrap_or(u32::MAX - 2)
}

// ───────────────────────────────────────── view model ────────

/// Text shown on one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText {
    pub title: String,
    /// Category, generation and date on one line.
    pub meta: String,
    pub blurb: String,
}

/// Where a card is in its entrance animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLook {
    Hidden,
    Dim,
    Normal,
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub text: CardText,
    pub look: CardLook,
}

/// Everything the page widget draws, already filtered and sliced.
#[derive(Debug, Clone)]
pub struct GalleryView<'a> {
    pub title: &'static str,
    /// e.g. "Gen 7 is recruiting".
    pub banner: Option<String>,
    pub intro: &'a [Introduce],
    /// Category labels with the active one flagged.
    pub categories: Vec<(&'static str, bool)>,
    /// Generation choices; `None` while the category is "all".
    pub generations: Option<Vec<(String, bool)>>,
    pub cards: Vec<CardView>,
    pub selected: Option<usize>,
    /// Size of the filtered list.
    pub total: usize,
    pub has_more: bool,
}

// ───────────────────────────────────────── widget ────────────

pub struct GalleryWidget<'a> {
    pub view: &'a GalleryView<'a>,
    pub geometry: &'a PageGeometry,
    pub offset: u32,
}

impl Widget for GalleryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let target = Window {
            rows: RowSpan::new(self.offset, u32::from(area.height)),
            area,
        };
        let width = area.width;

        target.draw(self.geometry.intro, 0, width, buf, |rect, scratch| {
            self.render_intro(rect, scratch)
        });
        target.draw(self.geometry.filter, 0, width, buf, |rect, scratch| {
            self.render_filter(rect, scratch)
        });
        self.render_grid(&target, buf);
        target.draw(self.geometry.footer, 0, width, buf, |rect, scratch| {
            self.render_footer(rect, scratch)
        });
    }
}

impl GalleryWidget<'_> {
    fn render_intro(&self, rect: Rect, scratch: &mut Buffer) {
        let mut lines = Vec::new();
        let mut header = vec![Span::styled(self.view.title, Theme::title_style())];
        if let Some(banner) = &self.view.banner {
            header.push(Span::raw("  "));
            header.push(Span::styled(format!(" {banner} "), Theme::banner_style()));
        }
        lines.push(Line::from(header));
        lines.push(Line::raw(""));

        for section in self.view.intro {
            lines.push(Line::from(Span::styled(
                section.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if section.body.is_empty() {
                lines.push(Line::raw(""));
            }
            for body_line in section.body.lines() {
                lines.push(Line::from(Span::styled(
                    body_line.to_string(),
                    Theme::body_style(),
                )));
            }
            lines.push(Line::raw(""));
        }

        Paragraph::new(lines).render(rect, scratch);
    }

    fn render_filter(&self, rect: Rect, scratch: &mut Buffer) {
        let mut category_line = vec![Span::styled("Category    ", Theme::label_style())];
        for (label, active) in &self.view.categories {
            category_line.push(chip(label, *active));
        }

        let generation_line = match &self.view.generations {
            None => Line::from(vec![
                Span::styled("Generation  ", Theme::label_style()),
                Span::styled("pick a category first", Theme::dim_style()),
            ]),
            Some(choices) => {
                let any_selected = choices.iter().any(|(_, active)| *active);
                let mut spans = vec![
                    Span::styled("Generation  ", Theme::label_style()),
                    chip("All", !any_selected),
                ];
                for (label, active) in choices {
                    spans.push(chip(label, *active));
                }
                Line::from(spans)
            }
        };

        Paragraph::new(vec![Line::from(category_line), generation_line]).render(rect, scratch);
    }

    fn render_grid(&self, target: &Window, buf: &mut Buffer) {
        if self.view.cards.is_empty() {
            target.draw(self.geometry.grid, 0, target.area.width, buf, |rect, scratch| {
                Paragraph::new(Line::from(Span::styled(
                    "  Nothing here yet for this filter.",
                    Theme::dim_style(),
                )))
                .render(rect, scratch);
            });
            return;
        }

        let columns = self.geometry.columns.max(1);
        let card_w = self.geometry.card_width;
        for (index, card) in self.view.cards.iter().enumerate() {
            if card.look == CardLook::Hidden {
                continue;
            }
            // The last row of each card span is the gap below it.
            let span = self.geometry.card_span(index);
            let span = RowSpan::new(span.top, span.height.saturating_sub(1));
            let col = u16::try_from(index % columns).unwrap_or(0);
            let selected = self.view.selected == Some(index);
            target.draw(span, col * card_w, card_w.saturating_sub(1), buf, |rect, scratch| {
                render_card(card, selected, rect, scratch)
            });
        }
    }

    fn render_footer(&self, rect: Rect, scratch: &mut Buffer) {
        let shown = self.view.cards.len();
        let line = if self.view.has_more {
            Line::from(vec![
                Span::styled("  ▼ Load more ", Theme::title_style()),
                Span::styled(
                    format!("({shown} of {} shown)", self.view.total),
                    Theme::dim_style(),
                ),
            ])
        } else if shown > 0 {
            Line::from(Span::styled(
                format!("  · all {shown} shown ·"),
                Theme::dim_style(),
            ))
        } else {
            Line::raw("")
        };
        Paragraph::new(line).render(rect, scratch);
    }
}

/// The scrolled slice of the document that lands on screen.
struct Window {
    /// Document rows shown.
    rows: RowSpan,
    area: Rect,
}

impl Window {
    /// Draw the part of the document at rows `span`, columns `x..x + width`,
    /// into a scratch buffer of its own size and copy the rows that fall in
    /// the window onto `buf`.  Parts outside the window are not drawn.
    fn draw(
        &self,
        span: RowSpan,
        x: u16,
        width: u16,
        buf: &mut Buffer,
        paint: impl FnOnce(Rect, &mut Buffer),
    ) {
        if !span.intersects(self.rows) || width == 0 {
            return;
        }
        let width = width.min(self.area.width.saturating_sub(x));
        let height = u16::try_from(span.height).unwrap_or(u16::MAX);
        if width == 0 || height == 0 {
            return;
        }
        let mut scratch = Buffer::empty(Rect::new(0, 0, width, height));
        paint(scratch.area, &mut scratch);

        let first = span.top.max(self.rows.top);
        let last = span.bottom().min(self.rows.bottom());
        for doc_row in first..last {
            let (Ok(src_y), Ok(dst_y)) = (
                u16::try_from(doc_row - span.top),
                u16::try_from(doc_row - self.rows.top),
            ) else {
                break;
            };
            for col in 0..width {
                if let (Some(src), Some(dst)) = (
                    scratch.cell((col, src_y)),
                    buf.cell_mut((self.area.x + x + col, self.area.y + dst_y)),
                ) {
                    *dst = src.clone();
                }
            }
        }
    }
}

fn render_card(card: &CardView, selected: bool, rect: Rect, doc: &mut Buffer) {
    if rect.width < 4 || rect.height < 3 {
        return;
    }
    let dim = card.look == CardLook::Dim;
    let border_style = match (selected, dim) {
        (_, true) => Theme::dim_style(),
        (true, false) => Theme::selected_border_style(),
        (false, false) => Theme::border_style(),
    };
    let title_style = if dim {
        Theme::dim_style()
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", card.text.title), title_style));
    let inner = block.inner(rect);
    block.render(rect, doc);

    let body_style = if dim { Theme::dim_style() } else { Theme::body_style() };
    Paragraph::new(vec![
        Line::from(Span::styled(card.text.meta.clone(), Theme::meta_style())),
        Line::from(Span::styled(card.text.blurb.clone(), body_style)),
    ])
    .wrap(Wrap { trim: true })
    .render(inner, doc);
}

fn chip(label: &str, active: bool) -> Span<'static> {
    if active {
        Span::styled(format!("[{label}] "), Theme::active_chip_style())
    } else {
        Span::styled(format!(" {label}  "), Theme::body_style())
    }
}
