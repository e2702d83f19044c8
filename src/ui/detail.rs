//! Detail overlay for one project or activity.
//!
//! Text on the left, the current media item on the right (stacked on narrow
//! terminals).  Images are drawn with `▀` half-blocks; other media is listed
//! by URL.  Navigation arrows and a close button double as mouse targets.

use std::path::PathBuf;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::core::records::MediaKind;

use super::theme::Theme;

/// Below this width the media pane goes under the text.
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 72;
const TEXT_COL_MAX: u16 = 44;

// ───────────────────────────────────────── view model ────────

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEntry {
    pub url: String,
    pub kind: MediaKind,
    /// Local file the URL resolves to, if previewable.
    pub local: Option<PathBuf>,
}

/// Owned snapshot of everything the overlay shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    /// Category and generation, e.g. "Web · Gen 7".
    pub subtitle: String,
    pub fields: Vec<(&'static str, String)>,
    pub body: Option<String>,
    pub media: Vec<MediaEntry>,
}

/// State of the preview for the current media item.
#[derive(Debug, Clone, Copy)]
pub enum MediaPreview<'a> {
    Ready(&'a image::RgbaImage),
    Loading,
    Failed(&'a str),
    /// Remote URL or non-image media.
    Unavailable,
}

// ───────────────────────────────────────── widget ────────────

pub struct DetailWidget<'a> {
    pub view: &'a DetailView,
    pub media_index: usize,
    pub preview: MediaPreview<'a>,
}

/// Clickable regions returned after rendering, for mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailHitZones {
    pub close_rect: Rect,
    pub prev_rect: Rect,
    pub next_rect: Rect,
}

impl DetailWidget<'_> {
    /// Overlay area: centred, 80% of the terminal.
    fn overlay_area(terminal: Rect) -> Rect {
        let margin_x = terminal.width / 10;
        let margin_y = terminal.height / 10;
        Rect::new(
            terminal.x + margin_x,
            terminal.y + margin_y,
            terminal.width.saturating_sub(margin_x * 2).max(20).min(terminal.width),
            terminal.height.saturating_sub(margin_y * 2).max(8).min(terminal.height),
        )
    }

    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(self, terminal_area: Rect, buf: &mut Buffer) -> DetailHitZones {
        let area = Self::overlay_area(terminal_area);
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightBlue))
            .title(Span::styled(
                format!(" {} ", self.view.title),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let close_rect = Rect::new(area.x + area.width.saturating_sub(5), area.y, 3, 1);
        Paragraph::new(Line::from(Span::styled(
            "[X]",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )))
        .render(close_rect, buf);

        // Footer hint takes the last inner row.
        let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
        let (text_area, media_area) = split_panes(body);

        self.render_text(text_area, buf);
        let (prev_rect, next_rect) = self.render_media(media_area, buf);

        let footer = Line::from(Span::styled(
            " ←/→ media   Esc close ",
            Theme::dim_style(),
        ));
        Paragraph::new(footer).render(
            Rect::new(inner.x, inner.y + inner.height.saturating_sub(1), inner.width, 1),
            buf,
        );

        DetailHitZones {
            close_rect,
            prev_rect,
            next_rect,
        }
    }

    fn render_text(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut lines = vec![
            Line::from(Span::styled(self.view.subtitle.clone(), Theme::meta_style())),
            Line::raw(""),
        ];
        for (label, value) in &self.view.fields {
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<10}"), Theme::label_style()),
                Span::raw(value.clone()),
            ]));
        }
        if let Some(body) = &self.view.body {
            lines.push(Line::raw(""));
            lines.extend(body.lines().map(|l| Line::raw(l.to_string())));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    /// Draw the current media item; returns the prev/next arrow rects.
    fn render_media(&self, area: Rect, buf: &mut Buffer) -> (Rect, Rect) {
        let arrow_y = area.y + area.height / 2;
        let prev_rect = Rect::new(area.x, arrow_y, 2, 1);
        let next_rect = Rect::new(area.x + area.width.saturating_sub(2), arrow_y, 2, 1);
        if area.width < 8 || area.height < 2 {
            return (prev_rect, next_rect);
        }

        let total = self.view.media.len();
        let Some(entry) = self.view.media.get(self.media_index) else {
            Paragraph::new(Line::from(Span::styled("No media", Theme::dim_style())))
                .render(Rect::new(area.x + 2, area.y, area.width - 4, 1), buf);
            return (prev_rect, next_rect);
        };

        let kind = match entry.kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        let caption = Line::from(vec![
            Span::styled(
                format!("{}/{total} · {kind} ", self.media_index + 1),
                Theme::label_style(),
            ),
            Span::styled(entry.url.clone(), Theme::dim_style()),
        ]);
        Paragraph::new(caption).render(Rect::new(area.x + 2, area.y, area.width - 4, 1), buf);

        let arrow = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        if self.media_index > 0 {
            Paragraph::new(Span::styled("◀", arrow)).render(prev_rect, buf);
        }
        if self.media_index + 1 < total {
            Paragraph::new(Span::styled(" ▶", arrow)).render(next_rect, buf);
        }

        let img_area = Rect::new(
            area.x + 2,
            area.y + 1,
            area.width - 4,
            area.height.saturating_sub(1),
        );
        match self.preview {
            MediaPreview::Ready(img) => draw_halfblocks(img, img_area, buf),
            MediaPreview::Loading => centred_note("Loading…", img_area, buf),
            MediaPreview::Failed(err) => centred_note(&format!("Cannot preview: {err}"), img_area, buf),
            MediaPreview::Unavailable => centred_note("No preview for this media", img_area, buf),
        }
        (prev_rect, next_rect)
    }
}

fn split_panes(body: Rect) -> (Rect, Rect) {
    if body.width >= SIDE_BY_SIDE_MIN_WIDTH {
        let text_w = TEXT_COL_MAX.min(body.width / 2);
        (
            Rect::new(body.x, body.y, text_w, body.height),
            Rect::new(body.x + text_w + 1, body.y, body.width - text_w - 1, body.height),
        )
    } else {
        let text_h = body.height / 2;
        (
            Rect::new(body.x, body.y, body.width, text_h),
            Rect::new(body.x, body.y + text_h, body.width, body.height - text_h),
        )
    }
}

fn centred_note(text: &str, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    Paragraph::new(Line::from(Span::styled(text.to_string(), Theme::dim_style())))
        .centered()
        .render(Rect::new(area.x, y, area.width, 1), buf);
}

// ───────────────────────────────────────── half-blocks ───────

/// Draw `img` into `area`, two vertical pixels per cell.
///
/// The image is scaled down (never up) to fit, keeping its aspect ratio, and
/// centred horizontally.
pub fn draw_halfblocks(img: &image::RgbaImage, area: Rect, buf: &mut Buffer) {
    use image::imageops::FilterType;

    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }
    let budget_w = f64::from(area.width);
    let budget_h = f64::from(area.height) * 2.0;
    let (src_w, src_h) = (f64::from(img.width()), f64::from(img.height()));
    let scale = (budget_w / src_w).min(budget_h / src_h).min(1.0);
    let fit_w = ((src_w * scale).round() as u32).max(1);
    let fit_h = ((src_h * scale).round() as u32).max(1);

    let fitted = image::imageops::resize(img, fit_w, fit_h, FilterType::Triangle);
    let left = area.x + area.width.saturating_sub(fit_w as u16) / 2;

    for (row, top_y) in (0..fit_h).step_by(2).enumerate() {
        let Ok(row) = u16::try_from(row) else { break };
        if row >= area.height {
            break;
        }
        for x in 0..fit_w.min(u32::from(area.width)) {
            let top = fitted.get_pixel(x, top_y);
            let bottom = if top_y + 1 < fit_h {
                let p = fitted.get_pixel(x, top_y + 1);
                Color::Rgb(p[0], p[1], p[2])
            } else {
                Color::Reset
            };
            if let Some(cell) = buf.cell_mut(Position::new(left + x as u16, area.y + row)) {
                cell.set_char('▀')
                    .set_fg(Color::Rgb(top[0], top[1], top[2]))
                    .set_bg(bottom);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(media: usize) -> DetailView {
        DetailView {
            title: "Club Site".into(),
            subtitle: "Web · Gen 7".into(),
            fields: vec![("Role", "Frontend".into())],
            body: Some("Rebuilt the landing page.".into()),
            media: (0..media)
                .map(|i| MediaEntry {
                    url: format!("media/{i}.png"),
                    kind: MediaKind::Image,
                    local: None,
                })
                .collect(),
        }
    }

    #[test]
    fn close_button_sits_on_the_top_border() {
        let terminal = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(terminal);
        let v = view(2);
        let zones = DetailWidget {
            view: &v,
            media_index: 0,
            preview: MediaPreview::Loading,
        }
        .render_and_hit(terminal, &mut buf);

        assert_eq!(zones.close_rect.y, 4);
        assert_eq!(buf[(zones.close_rect.x, zones.close_rect.y)].symbol(), "[");
        // Only the forward arrow is drawn on the first item.
        assert_eq!(buf[(zones.prev_rect.x, zones.prev_rect.y)].symbol(), " ");
        assert_eq!(buf[(zones.next_rect.x + 1, zones.next_rect.y)].symbol(), "▶");
    }

    #[test]
    fn halfblocks_pack_two_pixel_rows_per_cell() {
        let mut img = image::RgbaImage::from_pixel(2, 4, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        draw_halfblocks(&img, area, &mut buf);

        let cell = &buf[(0u16, 0u16)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn narrow_overlay_stacks_panes() {
        let (text, media) = split_panes(Rect::new(0, 0, 40, 20));
        assert_eq!(text.width, 40);
        assert_eq!(media.y, text.y + text.height);
    }
}
