use std::collections::HashMap;
use std::ops::Range;

use cue_bracket::layout::{BracketLayout, MatchBox};
use cue_bracket::options::{LayoutOptions, PartialLayoutOptions, PartialLineInfo, PartialRoundHeader};
use cue_bracket::{Match, MatchStatus, Participant, Tournament};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

use crate::components::theme::{ThemeColor, connector_style, resolve};

// ---------------------------------------------------------------------------
// Terminal geometry
// ---------------------------------------------------------------------------

/// Rows per match box: top player, status, bottom player.
pub const GAME_HEIGHT: u16 = 3;

/// Layout options measured in terminal cells.
///
/// Round headers are kept out of the per-box offset; they are painted in the
/// spare row above each column instead (the canvas padding row for the upper
/// half, the gap under the last upper row for the lower half).
pub fn terminal_preset() -> PartialLayoutOptions {
    PartialLayoutOptions {
        column_width: Some(30.0),
        row_height: Some(4.0),
        box_height: Some(f64::from(GAME_HEIGHT)),
        canvas_padding: Some(1.0),
        round_separator_width: Some(6.0),
        horizontal_offset: Some(0.0),
        line_info: Some(PartialLineInfo {
            separation: Some(1.0),
            home_visitor_spread: Some(1.0),
        }),
        round_header: Some(PartialRoundHeader {
            is_shown: Some(false),
            ..PartialRoundHeader::default()
        }),
        ..PartialLayoutOptions::default()
    }
}

fn to_cell(value: f64) -> i32 {
    value.floor() as i32
}

fn to_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

/// Canvas cell rectangle `(x, y, width, height)` covered by a match box.
pub fn box_cells(bx: &MatchBox, opts: &LayoutOptions) -> (u16, u16, u16, u16) {
    (
        to_u16(to_cell(bx.position.x)),
        to_u16(to_cell(bx.position.y + opts.round_header_offset())),
        to_u16(to_cell(opts.width)),
        GAME_HEIGHT,
    )
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

/// Paints a computed [`BracketLayout`] onto the terminal, one layout unit per
/// cell, shifted by the scroll offsets.
pub struct BracketView<'a> {
    pub tournament: &'a Tournament,
    pub layout: &'a BracketLayout,
    pub opts: &'a LayoutOptions,
    /// Match id under the cursor.
    pub selected: Option<&'a str>,
    /// Participant whose name is emphasized in every box.
    pub tracked: Option<&'a str>,
    pub scroll_x: u16,
    pub scroll_y: u16,
}

impl Widget for BracketView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < GAME_HEIGHT {
            return;
        }
        let viewport = Viewport {
            area,
            scroll_x: i32::from(self.scroll_x),
            scroll_y: i32::from(self.scroll_y),
        };

        // Pass 1: connectors, so box text wins wherever they touch.
        for (&(cx, cy), stroke) in &trace_connectors(self.layout, &viewport) {
            if let Some((x, y)) = viewport.screen(cx, cy) {
                put_char(buf, x, y, stroke_char(stroke.mask), connector_style(stroke.color, stroke.highlighted));
            }
        }

        // Pass 2: round headers.
        let header_style = resolve(ThemeColor::Header);
        let header_shift = if self.opts.round_header.is_shown { 0 } else { -1 };
        for header in &self.layout.headers {
            let x = to_cell(header.position.x) + 1;
            let y = to_cell(header.position.y) + header_shift;
            viewport.put_str(buf, x, y, &header.label, header_style);
        }

        // Pass 3: match boxes.
        for bx in &self.layout.boxes {
            if let Some(game) = self.tournament.find_match(&bx.match_id) {
                self.draw_match_box(game, bx, &viewport, buf);
            }
        }
    }
}

impl BracketView<'_> {
    fn draw_match_box(&self, game: &Match, bx: &MatchBox, viewport: &Viewport, buf: &mut Buffer) {
        let (x, y, width, _) = box_cells(bx, self.opts);
        let (x, y, width) = (i32::from(x), i32::from(y), usize::from(width));
        let selected = self.selected == Some(game.id.as_str());

        let base = if selected { resolve(ThemeColor::Selected) } else { resolve(ThemeColor::Text) };
        let status_style = match game.status {
            MatchStatus::InProgress => resolve(ThemeColor::Live),
            _ if selected => base,
            _ => resolve(ThemeColor::Dim),
        };

        let rows = [
            (
                format_player_line(game.top.as_ref(), game.score.map(|(s, _)| s), width),
                self.slot_style(game, game.top.as_ref(), base),
            ),
            (format_status_line(game, selected, width), status_style),
            (
                format_player_line(game.bottom.as_ref(), game.score.map(|(_, s)| s), width),
                self.slot_style(game, game.bottom.as_ref(), base),
            ),
        ];
        for (dy, (text, style)) in (0i32..).zip(rows) {
            viewport.put_str(buf, x, y + dy, &text, style);
        }
    }

    fn slot_style(&self, game: &Match, participant: Option<&Participant>, base: Style) -> Style {
        let Some(participant) = participant else {
            return resolve(ThemeColor::Dim);
        };
        let mut style = if game.winner_id.as_deref() == Some(participant.id.as_str()) {
            resolve(ThemeColor::Winner)
        } else {
            base
        };
        if self.tracked == Some(participant.id.as_str()) {
            style = style.patch(resolve(ThemeColor::Tracked));
        }
        style
    }
}

/// Maps canvas cells to screen cells and clips to the widget area.
struct Viewport {
    area: Rect,
    scroll_x: i32,
    scroll_y: i32,
}

impl Viewport {
    /// Canvas columns and rows that land inside the widget area.
    fn visible(&self) -> (Range<i32>, Range<i32>) {
        (
            self.scroll_x..self.scroll_x + i32::from(self.area.width),
            self.scroll_y..self.scroll_y + i32::from(self.area.height),
        )
    }

    fn screen(&self, cx: i32, cy: i32) -> Option<(u16, u16)> {
        let rx = cx - self.scroll_x;
        let ry = cy - self.scroll_y;
        if rx < 0 || ry < 0 || rx >= i32::from(self.area.width) || ry >= i32::from(self.area.height) {
            return None;
        }
        Some((self.area.x + rx as u16, self.area.y + ry as u16))
    }

    fn put_str(&self, buf: &mut Buffer, cx: i32, cy: i32, text: &str, style: Style) {
        for (dx, ch) in (0i32..).zip(text.chars()) {
            if let Some((x, y)) = self.screen(cx + dx, cy) {
                put_char(buf, x, y, ch, style);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Connector rasterization
// ---------------------------------------------------------------------------

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const UP: u8 = 4;
const DOWN: u8 = 8;

/// Line directions leaving one cell, merged across every connector crossing it.
#[derive(Debug, Clone, Copy, Default)]
struct Stroke<'a> {
    mask: u8,
    highlighted: bool,
    color: &'a str,
}

/// Rasterize the visible part of every connector polyline into cells. Cells
/// shared by several connectors merge their directions, which is how
/// `├`-style joins appear.
fn trace_connectors<'a>(layout: &'a BracketLayout, viewport: &Viewport) -> HashMap<(i32, i32), Stroke<'a>> {
    let (cols, rows) = viewport.visible();
    let mut cells: HashMap<(i32, i32), Stroke<'_>> = HashMap::new();

    for connector in &layout.connectors {
        let mut mark = |cell: (i32, i32), direction: u8| {
            let stroke = cells.entry(cell).or_default();
            stroke.mask |= direction;
            if connector.highlighted || stroke.color.is_empty() {
                stroke.color = &connector.path.color;
            }
            stroke.highlighted |= connector.highlighted;
        };

        let points: Vec<(i32, i32)> = connector
            .path
            .points()
            .into_iter()
            .map(|(x, y)| (to_cell(x), to_cell(y)))
            .collect();

        for segment in points.windows(2) {
            let ((x0, y0), (x1, y1)) = (segment[0], segment[1]);
            // Steps start one cell before the window so edge cells keep their inbound half.
            if y0 == y1 && rows.contains(&y0) {
                for x in x0.min(x1).max(cols.start - 1)..x0.max(x1).min(cols.end) {
                    mark((x, y0), RIGHT);
                    mark((x + 1, y0), LEFT);
                }
            } else if x0 == x1 && cols.contains(&x0) {
                for y in y0.min(y1).max(rows.start - 1)..y0.max(y1).min(rows.end) {
                    mark((x0, y), DOWN);
                    mark((x0, y + 1), UP);
                }
            }
        }
    }
    cells
}

fn stroke_char(mask: u8) -> char {
    let has = |bit: u8| mask & bit != 0;
    match (has(LEFT), has(RIGHT), has(UP), has(DOWN)) {
        (true, _, false, false) | (_, true, false, false) => '─',
        (false, false, _, _) => '│',
        (false, true, false, true) => '┌',
        (true, false, false, true) => '┐',
        (false, true, true, false) => '└',
        (true, false, true, false) => '┘',
        (true, true, false, true) => '┬',
        (true, true, true, false) => '┴',
        (false, true, true, true) => '├',
        (true, false, true, true) => '┤',
        (true, true, true, true) => '┼',
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// `"[seed] [name       ] [score] "`, exactly `width` characters.
fn format_player_line(participant: Option<&Participant>, score: Option<u16>, width: usize) -> String {
    let seed = match participant.and_then(|p| p.seed) {
        Some(seed) => format!("{seed:2}"),
        None => "  ".to_string(),
    };
    let name = participant.map(|p| p.name.as_str()).unwrap_or("TBD");
    let score = match score {
        Some(s) => format!("{s:3}"),
        None => "   ".to_string(),
    };
    // seed(2) + sp + name + sp + score(3) + sp
    let name_w = width.saturating_sub(8);
    let name: String = name.chars().take(name_w).collect();
    let line = format!("{seed} {name:<name_w$} {score} ");
    line.chars().take(width).collect()
}

fn format_status_line(game: &Match, selected: bool, width: usize) -> String {
    let marker = if selected { '▸' } else { ' ' };
    let status = match game.status {
        MatchStatus::Scheduled => "scheduled",
        MatchStatus::InProgress => "LIVE",
        MatchStatus::Completed => "final",
        MatchStatus::Walkover => "walkover",
    };
    let raw = format!("{marker}  {} · {status}", game.id);
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
