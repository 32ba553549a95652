//! SVG rendering of a computed [`BracketLayout`].

use crate::layout::{BracketLayout, MatchBox};
use crate::options::{LayoutOptions, PartialLayoutOptions, PartialLineInfo, PartialRoundHeader};
use crate::{Match, Participant, Tournament};
use std::fmt::Write as _;
use std::path::Path;

const BACKGROUND: &str = "#1b1d22";
const BOX_FILL: &str = "#2a2d35";
const BOX_STROKE: &str = "#3c3f48";
const TEXT: &str = "#d7d9de";
const TEXT_DIM: &str = "#8a8d96";
const WINNER: &str = "#57c27e";
const LIVE: &str = "#f2b33d";
const FONT: &str = "Inter, Helvetica, Arial, sans-serif";

/// Pixel sizes used for SVG export when the user supplies no style file.
pub fn svg_preset() -> PartialLayoutOptions {
    PartialLayoutOptions {
        column_width: Some(260.0),
        row_height: Some(72.0),
        box_height: Some(56.0),
        canvas_padding: Some(24.0),
        round_separator_width: Some(44.0),
        line_info: Some(PartialLineInfo {
            separation: Some(0.0),
            home_visitor_spread: Some(14.0),
        }),
        round_header: Some(PartialRoundHeader {
            is_shown: Some(true),
            height: Some(24.0),
            margin_bottom: Some(8.0),
        }),
        ..PartialLayoutOptions::default()
    }
}

pub fn render_svg(tournament: &Tournament, layout: &BracketLayout, opts: &LayoutOptions) -> String {
    let mut svg = String::new();
    let (width, height) = (layout.width, layout.height);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = write!(svg, "<title>{}</title>", escape_xml(&tournament.name));
    let _ = write!(svg, "<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>");

    if opts.round_header.is_shown {
        for header in &layout.headers {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" fill=\"{TEXT_DIM}\" font-family=\"{FONT}\" font-size=\"13\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
                header.position.x + opts.width / 2.0,
                header.position.y + opts.round_header.height / 2.0,
                escape_xml(&header.label)
            );
        }
    }

    for connector in &layout.connectors {
        let _ = write!(
            svg,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            connector.path.to_svg_d(),
            escape_xml(&connector.path.color),
            if connector.highlighted { 2 } else { 1 }
        );
    }

    for bx in &layout.boxes {
        if let Some(game) = tournament.find_match(&bx.match_id) {
            match_box_svg(&mut svg, bx, game, opts);
        }
    }

    svg.push_str("</svg>");
    svg
}

fn match_box_svg(svg: &mut String, bx: &MatchBox, game: &Match, opts: &LayoutOptions) {
    let x = bx.position.x;
    let y = bx.position.y + opts.round_header_offset();
    let middle = y + opts.box_height / 2.0;
    let spread = opts.line_info.home_visitor_spread;
    let stroke = if game.status == crate::MatchStatus::InProgress { LIVE } else { BOX_STROKE };

    let _ = write!(
        svg,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" rx=\"4\" fill=\"{BOX_FILL}\" stroke=\"{stroke}\"/>",
        opts.width, opts.box_height
    );

    let scores = game.score.map(|(t, b)| (t.to_string(), b.to_string()));
    let slots = [
        (game.top.as_ref(), middle - spread, scores.as_ref().map(|s| s.0.as_str())),
        (game.bottom.as_ref(), middle + spread, scores.as_ref().map(|s| s.1.as_str())),
    ];
    for (participant, slot_y, score) in slots {
        let is_winner = participant.is_some_and(|p| game.winner_id.as_deref() == Some(p.id.as_str()));
        let fill = if is_winner { WINNER } else { TEXT };
        let weight = if is_winner { "bold" } else { "normal" };
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{slot_y}\" fill=\"{fill}\" font-family=\"{FONT}\" font-size=\"13\" font-weight=\"{weight}\" dominant-baseline=\"middle\">{}</text>",
            x + 10.0,
            escape_xml(&participant_label(participant))
        );
        if let Some(score) = score {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{slot_y}\" fill=\"{fill}\" font-family=\"{FONT}\" font-size=\"13\" text-anchor=\"end\" dominant-baseline=\"middle\">{score}</text>",
                x + opts.width - 10.0
            );
        }
    }
}

fn participant_label(participant: Option<&Participant>) -> String {
    match participant {
        Some(Participant { name, seed: Some(seed), .. }) => format!("{seed} {name}"),
        Some(p) => p.name.clone(),
        None => "TBD".to_string(),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> std::io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg),
        None => {
            print!("{svg}");
            Ok(())
        }
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
