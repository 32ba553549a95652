use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketView, box_cells};
use crate::components::theme::{ThemeColor, resolve};
use crate::state::loader::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use cue_bracket::layout::BracketLayout;
use cue_bracket::{Match, MatchStatus, Participant};

static TABS: &[&str; 2] = &["Bracket", "Matches"];

const HELP_TEXT: &str = "\
1 bracket   2 matches   ? help   q quit

h / l    previous / next round
j / k    previous / next match
Tab      upper / lower / finals
t / b    track top / bottom player of the selected match
Esc      stop tracking
arrows   scroll the bracket
r        reload the snapshot
f        full screen
\"        toggle logs";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("Failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Matches => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn tournament_title(app: &App) -> String {
    match app.state.bracket.tournament.as_ref() {
        Some(t) => match t.venue.as_deref() {
            Some(venue) => format!(" {} · {venue} ", t.name),
            None => format!(" {} ", t.name),
        },
        None => " Bracket ".to_string(),
    }
}

/// Message shown while there is nothing to draw yet.
fn draw_not_loaded(f: &mut Frame, area: Rect, app: &App) {
    let msg = if let Some(err) = app.state.last_error.as_deref() {
        format!("Bracket load failed:\n{err}")
    } else {
        "Loading bracket data...".to_string()
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(tournament_title(app));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(layout) = app.compute_layout() else {
        draw_not_loaded(f, inner, app);
        return;
    };

    let [canvas, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    if app.state.bracket.follow_selection {
        if let Some(id) = app.state.bracket.selected_match_id()
            && let Some(bx) = layout.box_for(&id)
        {
            let cell = box_cells(bx, &app.layout_options);
            app.state.bracket.ensure_visible(cell, (canvas.width, canvas.height));
        }
        app.state.bracket.follow_selection = false;
    }

    let state = &app.state.bracket;
    let Some(tournament) = state.tournament.as_ref() else {
        return;
    };
    let selected = state.selected_match_id();
    f.render_widget(
        BracketView {
            tournament,
            layout: &layout,
            opts: &app.layout_options,
            selected: selected.as_deref(),
            tracked: state.tracked.as_deref(),
            scroll_x: state.scroll_x,
            scroll_y: state.scroll_y,
        },
        canvas,
    );

    f.render_widget(Paragraph::new(status_line(app)), status);
}

fn status_line(app: &App) -> Line<'static> {
    let state = &app.state.bracket;
    let dim = resolve(ThemeColor::Dim);
    let mut spans = vec![Span::styled(
        state.section.bracket_type().label().to_string(),
        resolve(ThemeColor::Header),
    )];

    if let Some(name) = state.tracked_name() {
        spans.push(Span::styled("  tracking ", dim));
        spans.push(Span::styled(name.to_string(), resolve(ThemeColor::Tracked)));
    }
    if let Some(updated) = state.tournament.as_ref().and_then(|t| t.updated_at) {
        spans.push(Span::styled(format!("  updated {}", updated.format("%Y-%m-%d %H:%M UTC")), dim));
    }
    if let Some(loaded) = app.state.last_loaded {
        spans.push(Span::styled(format!("  loaded {}", loaded.format("%H:%M:%S")), dim));
    }
    if let Some(err) = app.state.last_error.as_deref() {
        spans.push(Span::styled(format!("  {err}"), resolve(ThemeColor::Error)));
    }
    Line::from(spans)
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(layout) = app.compute_layout() else {
        draw_not_loaded(f, inner, app);
        return;
    };

    let state = &app.state.bracket;
    let bracket_type = state.section.bracket_type();
    let mut lines = vec![
        Line::styled(
            format!("{} | h/l round, j/k match, Tab section, t/b track", bracket_type.label()),
            resolve(ThemeColor::Dim),
        ),
        Line::default(),
    ];
    let mut selected_line = 0usize;

    for (c, games) in state.columns().iter().enumerate() {
        lines.push(Line::styled(round_label(&layout, bracket_type, c), resolve(ThemeColor::Header)));
        for (idx, game) in games.iter().enumerate() {
            let selected = c == state.column && idx == state.game;
            if selected {
                selected_line = lines.len();
            }
            lines.push(match_line(game, selected, state.tracked.as_deref()));
        }
        lines.push(Line::default());
    }

    // Keep the cursor on screen.
    let visible = usize::from(inner.height.max(1));
    let offset = (selected_line + 1).saturating_sub(visible);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

fn round_label(layout: &BracketLayout, bracket_type: cue_bracket::BracketType, column: usize) -> String {
    let mut headers = layout.headers.iter().filter(|h| h.bracket_type == bracket_type);
    // Finals are listed one per column but laid out after the last round.
    let header = if bracket_type == cue_bracket::BracketType::GrandFinal {
        headers.nth(column)
    } else {
        headers.find(|h| h.column as usize == column)
    };
    header
        .map(|h| h.label.clone())
        .unwrap_or_else(|| format!("Round {}", column + 1))
}

fn match_line(game: &Match, selected: bool, tracked: Option<&str>) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let base = if selected { resolve(ThemeColor::Selected) } else { resolve(ThemeColor::Text) };
    let status = match game.status {
        MatchStatus::Scheduled => ("scheduled", resolve(ThemeColor::Dim)),
        MatchStatus::InProgress => ("LIVE", resolve(ThemeColor::Live)),
        MatchStatus::Completed => ("final", resolve(ThemeColor::Dim)),
        MatchStatus::Walkover => ("walkover", resolve(ThemeColor::Dim)),
    };

    let slot = |participant: Option<&Participant>, score: Option<u16>| {
        let style = match participant {
            Some(p) if tracked == Some(p.id.as_str()) => base.patch(resolve(ThemeColor::Tracked)),
            Some(p) if game.winner_id.as_deref() == Some(p.id.as_str()) => resolve(ThemeColor::Winner),
            Some(_) => base,
            None => resolve(ThemeColor::Dim),
        };
        Span::styled(format_slot(participant, score), style)
    };

    Line::from(vec![
        Span::styled(format!("{marker} {:<7}", game.id), base),
        slot(game.top.as_ref(), game.score.map(|(s, _)| s)),
        Span::styled(" vs ", resolve(ThemeColor::Dim)),
        slot(game.bottom.as_ref(), game.score.map(|(_, s)| s)),
        Span::styled(format!("  [{}]", status.0), status.1),
    ])
}

fn format_slot(participant: Option<&Participant>, score: Option<u16>) -> String {
    let name = match participant {
        Some(Participant { name, seed: Some(seed), .. }) => format!("({seed}) {name}"),
        Some(p) => p.name.clone(),
        None => "TBD".to_string(),
    };
    match score {
        Some(score) => format!("{name} {score}"),
        None => name,
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Left),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_slot() {
        let p = Participant { id: "p1".into(), name: "Mara Kessler".into(), seed: Some(1) };
        assert_eq!(format_slot(Some(&p), Some(7)), "(1) Mara Kessler 7");
        let unseeded = Participant { seed: None, ..p };
        assert_eq!(format_slot(Some(&unseeded), None), "Mara Kessler");
        assert_eq!(format_slot(None, None), "TBD");
    }

    #[test]
    fn match_line_marks_selection() {
        let game = Match {
            id: "W1-0".into(),
            status: MatchStatus::InProgress,
            ..Match::default()
        };
        let line = match_line(&game, true, None);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "> W1-0   TBD vs TBD  [LIVE]");
    }

    #[test]
    fn round_labels_follow_layout_columns() {
        use crate::components::bracket::terminal_preset;
        use cue_bracket::options::resolve as resolve_options;
        use cue_bracket::{Bracket, BracketType};

        let game = |id: &str, bracket_type: BracketType, round: u32| Match {
            id: id.into(),
            round,
            bracket_type,
            ..Match::default()
        };
        let matches = vec![
            game("W1-0", BracketType::Winner, 1),
            game("W3-0", BracketType::Winner, 3),
            game("GF-1", BracketType::GrandFinal, 1),
            game("GF-2", BracketType::GrandFinal, 2),
        ];
        let opts = resolve_options(&terminal_preset());
        let layout = BracketLayout::compute(&Bracket::from_matches(&matches), &opts, None);

        assert_eq!(round_label(&layout, BracketType::Winner, 0), "Upper round 1");
        assert_eq!(round_label(&layout, BracketType::Winner, 1), "Round 2");
        assert_eq!(round_label(&layout, BracketType::Winner, 2), "Upper final");
        assert_eq!(round_label(&layout, BracketType::GrandFinal, 1), "Reset");
    }
}
