//! Orthogonal connectors between a match and its predecessors.
//!
//! A connector starts at the left edge of the current match, level with the
//! participant slot it feeds, and ends at the right edge of the predecessor.
//! When both boxes share a row it is a single horizontal stroke, otherwise an
//! elbow that turns on a vertical spine in the middle of the round separator.

use crate::options::LayoutOptions;
use crate::position::Position;
use serde::Serialize;
use std::fmt;

/// Rows closer than this are treated as the same row.
const SAME_ROW_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    Horizontal(f64),
    Vertical(f64),
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo { x, y } => write!(f, "M {x} {y}"),
            PathCommand::Horizontal(x) => write!(f, "H {x}"),
            PathCommand::Vertical(y) => write!(f, "V {y}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathDescriptor {
    pub commands: Vec<PathCommand>,
    pub color: String,
}

impl PathDescriptor {
    /// SVG `d` attribute, e.g. `M 215 60 H 200 V 40 H 190`.
    pub fn to_svg_d(&self) -> String {
        self.commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Absolute vertices of the polyline, in drawing order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.commands.len());
        let mut cursor = (0.0, 0.0);
        for command in &self.commands {
            cursor = match *command {
                PathCommand::MoveTo { x, y } => (x, y),
                PathCommand::Horizontal(x) => (x, cursor.1),
                PathCommand::Vertical(y) => (cursor.0, y),
            };
            points.push(cursor);
        }
        points
    }
}

/// Which of the two incoming connectors belong to the tracked player's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightFlags {
    pub top: bool,
    pub bottom: bool,
}

/// Route the connectors from `current` back to its predecessors.
///
/// Returns the top connector first. A missing predecessor contributes nothing,
/// so `route(current, None, None, ..)` is empty.
pub fn route(
    current: Position,
    top: Option<Position>,
    bottom: Option<Position>,
    opts: &LayoutOptions,
    highlight: HighlightFlags,
) -> Vec<PathDescriptor> {
    let mut paths = Vec::with_capacity(2);
    if let Some(previous) = top {
        paths.push(PathDescriptor {
            commands: path_info(current, previous, -1.0, opts),
            color: stroke(opts, highlight.top),
        });
    }
    if let Some(previous) = bottom {
        paths.push(PathDescriptor {
            commands: path_info(current, previous, 1.0, opts),
            color: stroke(opts, highlight.bottom),
        });
    }
    paths
}

/// `multiplier` is -1 for the top slot and +1 for the bottom slot.
fn path_info(current: Position, previous: Position, multiplier: f64, opts: &LayoutOptions) -> Vec<PathCommand> {
    let middle_of_box = opts.box_height / 2.0;
    let header_offset = opts.round_header_offset();

    let start = PathCommand::MoveTo {
        x: current.x - opts.horizontal_offset - opts.line_info.separation,
        y: current.y + opts.line_info.home_visitor_spread * multiplier + middle_of_box + header_offset,
    };
    let into_previous = PathCommand::Horizontal(previous.x + opts.width);

    if (current.y - previous.y).abs() < SAME_ROW_TOLERANCE {
        return vec![start, into_previous];
    }

    let spine_x = current.x - opts.round_separator_width / 2.0 - opts.horizontal_offset;
    let vertical_height = previous.y + middle_of_box + header_offset;
    vec![
        start,
        PathCommand::Horizontal(spine_x),
        PathCommand::Vertical(vertical_height),
        into_previous,
    ]
}

fn stroke(opts: &LayoutOptions, highlighted: bool) -> String {
    if highlighted {
        opts.connector_color_highlight.clone()
    } else {
        opts.connector_color.clone()
    }
}
