use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    Text,
    Selected,
    Dim,
    Winner,
    Live,
    Tracked,
    Header,
    Error,
}

pub fn resolve(color: ThemeColor) -> Style {
    match color {
        ThemeColor::Text => Style::default().fg(Color::Gray),
        ThemeColor::Selected => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ThemeColor::Dim => Style::default().fg(Color::Indexed(240)),
        ThemeColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ThemeColor::Live => Style::default().fg(Color::Rgb(242, 179, 61)),
        ThemeColor::Tracked => Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
        ThemeColor::Header => Style::default().fg(Color::Rgb(0, 122, 195)).add_modifier(Modifier::BOLD),
        ThemeColor::Error => Style::default().fg(Color::Red),
    }
}

/// Parse `#rrggbb` or `#rgb` into a true-color terminal color.
pub fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// Stroke style for a connector color string; unparseable colors fall back
/// to the dim palette entry.
pub fn connector_style(color: &str, highlighted: bool) -> Style {
    let base = match parse_hex(color) {
        Some(fg) => Style::default().fg(fg),
        None => resolve(ThemeColor::Dim),
    };
    if highlighted { base.add_modifier(Modifier::BOLD) } else { base }
}
