//! Bracket style options.
//!
//! Callers hand over a sparse [`PartialLayoutOptions`] (typically deserialized
//! from a camelCase JSON style file) and [`resolve`] turns it into a fully
//! populated [`LayoutOptions`]. Every nested field defaults on its own, so the
//! geometry code never has to deal with a missing value.

use serde::Deserialize;

pub const DEFAULT_CONNECTOR_COLOR: &str = "#58595e";
pub const DEFAULT_CONNECTOR_COLOR_HIGHLIGHT: &str = "#707582";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialLayoutOptions {
    pub width: Option<f64>,
    pub column_width: Option<f64>,
    pub row_height: Option<f64>,
    pub box_height: Option<f64>,
    pub canvas_padding: Option<f64>,
    pub round_separator_width: Option<f64>,
    pub horizontal_offset: Option<f64>,
    pub line_info: Option<PartialLineInfo>,
    pub round_header: Option<PartialRoundHeader>,
    pub connector_color: Option<String>,
    pub connector_color_highlight: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialLineInfo {
    pub separation: Option<f64>,
    pub home_visitor_spread: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialRoundHeader {
    pub is_shown: Option<bool>,
    pub height: Option<f64>,
    pub margin_bottom: Option<f64>,
}

impl PartialLayoutOptions {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(&self, other: &PartialLayoutOptions) -> PartialLayoutOptions {
        let line_info = match (&self.line_info, &other.line_info) {
            (Some(a), Some(b)) => Some(PartialLineInfo {
                separation: b.separation.or(a.separation),
                home_visitor_spread: b.home_visitor_spread.or(a.home_visitor_spread),
            }),
            (a, b) => b.clone().or_else(|| a.clone()),
        };
        let round_header = match (&self.round_header, &other.round_header) {
            (Some(a), Some(b)) => Some(PartialRoundHeader {
                is_shown: b.is_shown.or(a.is_shown),
                height: b.height.or(a.height),
                margin_bottom: b.margin_bottom.or(a.margin_bottom),
            }),
            (a, b) => b.clone().or_else(|| a.clone()),
        };

        PartialLayoutOptions {
            width: other.width.or(self.width),
            column_width: other.column_width.or(self.column_width),
            row_height: other.row_height.or(self.row_height),
            box_height: other.box_height.or(self.box_height),
            canvas_padding: other.canvas_padding.or(self.canvas_padding),
            round_separator_width: other.round_separator_width.or(self.round_separator_width),
            horizontal_offset: other.horizontal_offset.or(self.horizontal_offset),
            line_info,
            round_header,
            connector_color: other.connector_color.clone().or_else(|| self.connector_color.clone()),
            connector_color_highlight: other
                .connector_color_highlight
                .clone()
                .or_else(|| self.connector_color_highlight.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Match box width. Defaults to the column width minus the round separator.
    pub width: f64,
    pub column_width: f64,
    pub row_height: f64,
    pub box_height: f64,
    pub canvas_padding: f64,
    pub round_separator_width: f64,
    pub horizontal_offset: f64,
    pub line_info: LineInfo,
    pub round_header: RoundHeaderStyle,
    pub connector_color: String,
    pub connector_color_highlight: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineInfo {
    /// Gap between a match box and the start of its incoming connectors.
    pub separation: f64,
    /// Vertical distance from the box middle to each participant slot.
    pub home_visitor_spread: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundHeaderStyle {
    pub is_shown: bool,
    pub height: f64,
    pub margin_bottom: f64,
}

impl LayoutOptions {
    /// Vertical space taken by the round header above every match box.
    pub fn round_header_offset(&self) -> f64 {
        if self.round_header.is_shown {
            self.round_header.height + self.round_header.margin_bottom
        } else {
            0.0
        }
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        resolve(&PartialLayoutOptions::default())
    }
}

/// Fill every missing option with its default.
pub fn resolve(options: &PartialLayoutOptions) -> LayoutOptions {
    let column_width = options.column_width.unwrap_or(0.0);
    let round_separator_width = options.round_separator_width.unwrap_or(0.0);
    let line_info = options.line_info.clone().unwrap_or_default();
    let round_header = options.round_header.clone().unwrap_or_default();

    LayoutOptions {
        width: options
            .width
            .unwrap_or_else(|| (column_width - round_separator_width).max(0.0)),
        column_width,
        row_height: options.row_height.unwrap_or(0.0),
        box_height: options.box_height.unwrap_or(0.0),
        canvas_padding: options.canvas_padding.unwrap_or(0.0),
        round_separator_width,
        horizontal_offset: options.horizontal_offset.unwrap_or(0.0),
        line_info: LineInfo {
            separation: line_info.separation.unwrap_or(0.0),
            home_visitor_spread: line_info.home_visitor_spread.unwrap_or(0.0),
        },
        round_header: RoundHeaderStyle {
            is_shown: round_header.is_shown.unwrap_or(false),
            height: round_header.height.unwrap_or(0.0),
            margin_bottom: round_header.margin_bottom.unwrap_or(0.0),
        },
        connector_color: options
            .connector_color
            .clone()
            .unwrap_or_else(|| DEFAULT_CONNECTOR_COLOR.to_string()),
        connector_color_highlight: options
            .connector_color_highlight
            .clone()
            .unwrap_or_else(|| DEFAULT_CONNECTOR_COLOR_HIGHLIGHT.to_string()),
    }
}

/// Parse a camelCase JSON style document. Unknown keys are ignored.
pub fn parse_partial(json: &str) -> serde_json::Result<PartialLayoutOptions> {
    serde_json::from_str(json)
}
