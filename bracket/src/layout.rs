use crate::connector::{PathDescriptor, route};
use crate::highlight::{BracketSnippet, is_player_path_highlighted};
use crate::options::LayoutOptions;
use crate::position::{
    FinalGameExtra, Offset, Position, final_game_position, lower_bracket_position, upper_bracket_position,
};
use crate::{Bracket, BracketFormat, BracketType, Match};
use log::debug;

/// A match and the position it was placed at.
type Placed<'a> = (&'a Match, Position);

// ---------------------------------------------------------------------------
// Layout output
// ---------------------------------------------------------------------------

/// One placed match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchBox {
    pub match_id: String,
    pub bracket_type: BracketType,
    /// Layout column. Finals share the column space with both halves.
    pub column: u32,
    /// Bracket position of the match within its round.
    pub index: usize,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorSide {
    Top,
    Bottom,
}

/// One drawn link from a match back to one of its predecessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// The match the connector enters.
    pub match_id: String,
    pub side: ConnectorSide,
    pub highlighted: bool,
    pub path: PathDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundHeader {
    pub label: String,
    pub bracket_type: BracketType,
    pub column: u32,
    pub position: Position,
}

/// Geometry for a whole bracket, ready for a rendering surface.
///
/// Canvas arrangement for double elimination:
///
/// ```text
///  upper r1 | upper r2 | upper r3 |          | grand final | reset
///  lower r1 | lower r2 | lower r3 | lower r4 |
/// ```
///
/// The lower half is stacked under the upper half and the finals sit to the
/// right of whichever half has more columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BracketLayout {
    pub boxes: Vec<MatchBox>,
    pub connectors: Vec<Connector>,
    pub headers: Vec<RoundHeader>,
    pub upper_bracket_height: f64,
    pub lower_bracket_height: f64,
    pub width: f64,
    pub height: f64,
}

impl BracketLayout {
    /// Walk the whole tree and place every match and connector.
    ///
    /// Stateless: call it again whenever the tree, the options or the tracked
    /// participant change.
    pub fn compute(bracket: &Bracket, opts: &LayoutOptions, tracked: Option<&str>) -> Self {
        let mut out = Self {
            upper_bracket_height: half_height(&bracket.upper, opts),
            lower_bracket_height: half_height(&bracket.lower, opts),
            ..Self::default()
        };

        let format = bracket.format();
        let upper = out.place_upper(bracket, opts, tracked, format);
        let lower = out.place_lower(bracket, opts, tracked);
        out.place_finals(bracket, opts, tracked, &upper, lower);
        out.measure(opts);

        debug!(
            "bracket layout: {} boxes, {} connectors, {}x{}",
            out.boxes.len(),
            out.connectors.len(),
            out.width,
            out.height
        );
        out
    }

    pub fn box_for(&self, match_id: &str) -> Option<&MatchBox> {
        self.boxes.iter().find(|b| b.match_id == match_id)
    }

    pub fn connectors_for<'a>(&'a self, match_id: &'a str) -> impl Iterator<Item = &'a Connector> + 'a {
        self.connectors.iter().filter(move |c| c.match_id == match_id)
    }

    fn place_upper<'a>(
        &mut self,
        bracket: &'a Bracket,
        opts: &LayoutOptions,
        tracked: Option<&str>,
        format: BracketFormat,
    ) -> Vec<Vec<Placed<'a>>> {
        let rounds = bracket.upper.len();
        let mut placed: Vec<Vec<Placed<'a>>> = Vec::with_capacity(rounds);

        for (c, games) in bracket.upper.iter().enumerate() {
            let column = c as u32;
            if !games.is_empty() {
                self.headers.push(RoundHeader {
                    label: upper_round_label(c, rounds, format),
                    bracket_type: BracketType::Winner,
                    column,
                    position: upper_bracket_position(0.0, column, opts, Offset::default()),
                });
            }

            let mut column_placed = Vec::with_capacity(games.len());
            for game in games {
                let i = game.bracket_position as usize;
                let position = upper_bracket_position(centered_row(column, i), column, opts, Offset::default());
                column_placed.push((game, position));
                self.push_box(game, column, position);

                if let Some(previous) = c.checked_sub(1).map(|p| &placed[p]) {
                    let (top_idx, bottom_idx) = feeder_rows(i);
                    self.connect(
                        game,
                        position,
                        lookup(previous, Some(top_idx)),
                        lookup(previous, Some(bottom_idx)),
                        opts,
                        tracked,
                    );
                }
            }
            placed.push(column_placed);
        }
        placed
    }

    fn place_lower<'a>(
        &mut self,
        bracket: &'a Bracket,
        opts: &LayoutOptions,
        tracked: Option<&str>,
    ) -> Vec<Vec<Placed<'a>>> {
        let rounds = bracket.lower.len();
        let offset = Offset::vertical(self.upper_bracket_height);
        let mut placed: Vec<Vec<Placed<'a>>> = Vec::with_capacity(rounds);

        for (c, games) in bracket.lower.iter().enumerate() {
            let column = c as u32;
            if !games.is_empty() {
                self.headers.push(RoundHeader {
                    label: lower_round_label(c, rounds),
                    bracket_type: BracketType::Loser,
                    column,
                    position: lower_bracket_position(0.0, column, opts, offset),
                });
            }

            let mut column_placed = Vec::with_capacity(games.len());
            for game in games {
                let i = game.bracket_position as usize;
                // Seeding columns feed 1:1, so only every second column merges rows.
                let position = lower_bracket_position(centered_row(column / 2, i), column, opts, offset);
                column_placed.push((game, position));
                self.push_box(game, column, position);

                if let Some(previous) = c.checked_sub(1).map(|p| &placed[p]) {
                    let (top_idx, bottom_idx) = if is_seeding_column(c) {
                        (None, i)
                    } else {
                        let (top, bottom) = feeder_rows(i);
                        (Some(top), bottom)
                    };
                    self.connect(
                        game,
                        position,
                        lookup(previous, top_idx),
                        lookup(previous, Some(bottom_idx)),
                        opts,
                        tracked,
                    );
                }
            }
            placed.push(column_placed);
        }
        placed
    }

    /// Grand final plus the optional reset game.
    ///
    /// Finals are appended to the lower columns so the reset game can find
    /// the first grand final at index `num_of_lower_rounds`.
    fn place_finals<'a>(
        &mut self,
        bracket: &'a Bracket,
        opts: &LayoutOptions,
        tracked: Option<&str>,
        upper: &[Vec<Placed<'a>>],
        mut lower_and_finals: Vec<Vec<Placed<'a>>>,
    ) {
        let Some(grand_final) = bracket.finals.first() else {
            return;
        };
        let num_of_lower_rounds = bracket.lower.len();
        let final_column = bracket.upper.len().max(num_of_lower_rounds) as u32;
        let extra = FinalGameExtra {
            offset_y: 0.0,
            lower_bracket_height: self.lower_bracket_height,
            upper_bracket_height: self.upper_bracket_height,
            game_height: opts.row_height + opts.round_header_offset(),
        };

        let position = final_game_position(0.0, final_column, opts, extra);
        self.push_final_header("Grand final", final_column, position);
        self.push_box(grand_final, final_column, position);
        let top = last_game(upper);
        let bottom = last_game(&lower_and_finals);
        self.connect(grand_final, position, top, bottom, opts, tracked);
        lower_and_finals.push(vec![(grand_final, position)]);

        let Some(reset) = bracket.finals.get(1) else {
            return;
        };
        if bracket.finals.len() > 2 {
            debug!("ignoring {} extra final games", bracket.finals.len() - 2);
        }
        let reset_column = final_column + 1;
        let position = final_game_position(0.0, reset_column, opts, extra);
        self.push_final_header("Reset", reset_column, position);
        self.push_box(reset, reset_column, position);
        let first_final = lower_and_finals
            .get(num_of_lower_rounds)
            .and_then(|column| column.first())
            .copied();
        self.connect(reset, position, first_final, None, opts, tracked);
    }

    fn push_box(&mut self, game: &Match, column: u32, position: Position) {
        self.boxes.push(MatchBox {
            match_id: game.id.clone(),
            bracket_type: game.bracket_type,
            column,
            index: game.bracket_position as usize,
            position,
        });
    }

    fn push_final_header(&mut self, label: &str, column: u32, position: Position) {
        self.headers.push(RoundHeader {
            label: label.to_string(),
            bracket_type: BracketType::GrandFinal,
            column,
            position,
        });
    }

    fn connect(
        &mut self,
        game: &Match,
        position: Position,
        top: Option<(&Match, Position)>,
        bottom: Option<(&Match, Position)>,
        opts: &LayoutOptions,
        tracked: Option<&str>,
    ) {
        let snippet = BracketSnippet {
            current: game,
            previous_top: top.map(|(m, _)| m),
            previous_bottom: bottom.map(|(m, _)| m),
        };
        let flags = is_player_path_highlighted(&snippet, tracked);
        let paths = route(position, top.map(|(_, p)| p), bottom.map(|(_, p)| p), opts, flags);

        let sides = [
            top.map(|_| (ConnectorSide::Top, flags.top)),
            bottom.map(|_| (ConnectorSide::Bottom, flags.bottom)),
        ];
        for ((side, highlighted), path) in sides.into_iter().flatten().zip(paths) {
            self.connectors.push(Connector {
                match_id: game.id.clone(),
                side,
                highlighted,
                path,
            });
        }
    }

    fn measure(&mut self, opts: &LayoutOptions) {
        let header = opts.round_header_offset();
        let (right, bottom) = self.boxes.iter().fold((0.0f64, 0.0f64), |(r, b), bx| {
            (
                r.max(bx.position.x + opts.width),
                b.max(bx.position.y + header + opts.box_height),
            )
        });
        self.width = right.max(opts.canvas_padding) + opts.canvas_padding;
        self.height = bottom.max(opts.canvas_padding) + opts.canvas_padding;
    }
}

// ---------------------------------------------------------------------------
// Tree arithmetic
// ---------------------------------------------------------------------------

/// Odd lower columns take one player from the lower bracket and one dropping
/// down from the upper bracket.
pub fn is_seeding_column(column: usize) -> bool {
    column % 2 != 0
}

/// Rows in the previous column feeding row `index`: `(top, bottom)`.
pub fn feeder_rows(index: usize) -> (usize, usize) {
    let bottom = (index + 1) * 2 - 1;
    (bottom - 1, bottom)
}

/// Layout row of match `index` after `merges` halvings of the first column.
///
/// ```text
///   merges 0: 0, 1, 2, 3 ...
///   merges 1: 0.5, 2.5, 4.5 ...
///   merges 2: 1.5, 5.5 ...
/// ```
fn centered_row(merges: u32, index: usize) -> f64 {
    let span = f64::from(1u32 << merges.min(31));
    span * index as f64 + (span - 1.0) / 2.0
}

fn half_height(columns: &[Vec<Match>], opts: &LayoutOptions) -> f64 {
    match columns.first().map(Vec::len) {
        Some(rows) if rows > 0 => rows as f64 * opts.row_height + opts.round_header_offset(),
        _ => 0.0,
    }
}

fn lookup<'a>(column: &[Placed<'a>], index: Option<usize>) -> Option<Placed<'a>> {
    let index = index?;
    column
        .iter()
        .find(|(game, _)| game.bracket_position as usize == index)
        .copied()
}

/// Sole match of the last column (the upper or lower final).
fn last_game<'a>(columns: &[Vec<Placed<'a>>]) -> Option<Placed<'a>> {
    columns.last()?.first().copied()
}

fn upper_round_label(column: usize, rounds: usize, format: BracketFormat) -> String {
    let from_end = rounds - column;
    match (format, from_end) {
        (BracketFormat::SingleElimination, 1) => "Final".to_string(),
        (BracketFormat::SingleElimination, 2) => "Semi-final".to_string(),
        (BracketFormat::DoubleElimination, 1) => "Upper final".to_string(),
        (BracketFormat::SingleElimination, _) => format!("Round {}", column + 1),
        (BracketFormat::DoubleElimination, _) => format!("Upper round {}", column + 1),
    }
}

fn lower_round_label(column: usize, rounds: usize) -> String {
    if column + 1 == rounds {
        "Lower final".to_string()
    } else {
        format!("Lower round {}", column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::PathCommand;
    use crate::options::{parse_partial, resolve};
    use crate::test_support::{double_elimination, game, game_with, single_elimination};

    fn opts() -> LayoutOptions {
        resolve(
            &parse_partial(
                r#"{"columnWidth":200,"rowHeight":80,"boxHeight":40,"canvasPadding":20,"roundSeparatorWidth":10,"horizontalOffset":5}"#,
            )
            .unwrap(),
        )
    }

    fn layout(matches: &[Match]) -> BracketLayout {
        BracketLayout::compute(&Bracket::from_matches(matches), &opts(), None)
    }

    fn pos(l: &BracketLayout, id: &str) -> Position {
        l.box_for(id).unwrap_or_else(|| panic!("no box for {id}")).position
    }

    #[test]
    fn test_feeder_rows_double() {
        assert_eq!(feeder_rows(0), (0, 1));
        assert_eq!(feeder_rows(1), (2, 3));
        assert_eq!(feeder_rows(5), (10, 11));
    }

    #[test]
    fn test_centered_rows() {
        assert_eq!(centered_row(0, 3), 3.0);
        assert_eq!(centered_row(1, 0), 0.5);
        assert_eq!(centered_row(1, 2), 4.5);
        assert_eq!(centered_row(2, 1), 5.5);
    }

    #[test]
    fn four_player_final_gets_two_elbows() {
        let l = layout(&single_elimination(4));
        assert_eq!(pos(&l, "W1-0"), Position::new(20.0, 20.0));
        assert_eq!(pos(&l, "W1-1"), Position::new(20.0, 100.0));
        assert_eq!(pos(&l, "W2-0"), Position::new(220.0, 60.0));

        let conns: Vec<&Connector> = l.connectors_for("W2-0").collect();
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].side, ConnectorSide::Top);
        assert_eq!(conns[1].side, ConnectorSide::Bottom);
        for c in &conns {
            assert_eq!(c.path.commands.len(), 4);
        }
        assert_eq!(conns[0].path.commands[2], PathCommand::Vertical(40.0));
        assert_eq!(conns[1].path.commands[2], PathCommand::Vertical(120.0));
        assert_eq!(l.connectors.len(), 2, "round 1 is never routed");
    }

    #[test]
    fn parent_is_centered_between_feeders() {
        let bracket = Bracket::from_matches(&single_elimination(16));
        let l = BracketLayout::compute(&bracket, &opts(), None);
        for c in 1..bracket.upper.len() {
            for (i, parent) in bracket.upper[c].iter().enumerate() {
                let (t, b) = feeder_rows(i);
                let top = pos(&l, &bracket.upper[c - 1][t].id);
                let bottom = pos(&l, &bracket.upper[c - 1][b].id);
                assert_eq!(pos(&l, &parent.id).y, (top.y + bottom.y) / 2.0, "column {c} match {i}");
            }
        }
    }

    #[test]
    fn single_elimination_labels() {
        let l = layout(&single_elimination(8));
        let labels: Vec<&str> = l.headers.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Round 1", "Semi-final", "Final"]);
    }

    #[test]
    fn seeding_columns_have_no_top_predecessor() {
        for players in [4, 8, 16, 32] {
            let bracket = Bracket::from_matches(&double_elimination(players, false));
            let l = BracketLayout::compute(&bracket, &opts(), None);
            for (c, games) in bracket.lower.iter().enumerate().skip(1) {
                for g in games {
                    let sides: Vec<ConnectorSide> = l.connectors_for(&g.id).map(|c| c.side).collect();
                    if is_seeding_column(c) {
                        assert_eq!(sides, vec![ConnectorSide::Bottom], "{players} players, {}", g.id);
                        let conn = l.connectors_for(&g.id).next().unwrap();
                        assert_eq!(conn.path.commands.len(), 2, "1:1 feed keeps the row");
                    } else {
                        assert_eq!(sides, vec![ConnectorSide::Top, ConnectorSide::Bottom]);
                    }
                }
            }
        }
    }

    #[test]
    fn lower_half_sits_under_upper_half() {
        let l = layout(&double_elimination(8, false));
        // 4 upper rows of 80.
        assert_eq!(l.upper_bracket_height, 320.0);
        assert_eq!(l.lower_bracket_height, 160.0);
        assert_eq!(pos(&l, "L1-0"), Position::new(20.0, 340.0));
        assert_eq!(pos(&l, "L2-1"), Position::new(220.0, 420.0));
        assert_eq!(pos(&l, "L3-0"), Position::new(420.0, 380.0));
        for b in l.boxes.iter().filter(|b| b.bracket_type == BracketType::Loser) {
            assert!(b.position.y >= 20.0 + l.upper_bracket_height, "{}", b.match_id);
        }
    }

    #[test]
    fn grand_final_joins_both_finals() {
        let l = layout(&double_elimination(8, false));
        let gf = pos(&l, "GF");
        // Four lower rounds outnumber three upper rounds.
        assert_eq!(gf.x, 20.0 + 4.0 * 200.0);
        assert_eq!(gf.y, pos(&l, "W3-0").y);

        let conns: Vec<&Connector> = l.connectors_for("GF").collect();
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].path.commands.len(), 2, "upper final is level with the grand final");
        assert_eq!(conns[0].path.commands[1], PathCommand::Horizontal(pos(&l, "W3-0").x + 190.0));
        let lower_final = pos(&l, "L4-0");
        assert_eq!(conns[1].path.commands.len(), 4);
        assert_eq!(conns[1].path.commands[2], PathCommand::Vertical(lower_final.y + 20.0));
        assert_eq!(conns[1].path.commands[3], PathCommand::Horizontal(lower_final.x + 190.0));
    }

    #[test]
    fn reset_game_always_follows_first_grand_final() {
        for players in [4, 8, 16, 32] {
            let l = layout(&double_elimination(players, true));
            let gf = pos(&l, "GF");
            let reset = pos(&l, "GF-reset");
            assert_eq!(reset.x, gf.x + 200.0);
            assert_eq!(reset.y, gf.y);

            let conns: Vec<&Connector> = l.connectors_for("GF-reset").collect();
            assert_eq!(conns.len(), 1, "{players} players");
            assert_eq!(conns[0].side, ConnectorSide::Top);
            assert_eq!(
                conns[0].path.commands,
                vec![
                    PathCommand::MoveTo { x: reset.x - 5.0, y: reset.y + 20.0 },
                    PathCommand::Horizontal(gf.x + 190.0),
                ]
            );
        }
    }

    #[test]
    fn tracked_player_lights_their_path() {
        let mut matches = single_elimination(4);
        matches[0] = game_with("W1-0", BracketType::Winner, 1, 0, Some("ann"), Some("bob"));
        matches[1] = game_with("W1-1", BracketType::Winner, 1, 1, Some("cat"), Some("dan"));
        matches[2] = game_with("W2-0", BracketType::Winner, 2, 0, Some("ann"), Some("dan"));

        let l = BracketLayout::compute(&Bracket::from_matches(&matches), &opts(), Some("dan"));
        let lit: Vec<(ConnectorSide, bool)> = l.connectors.iter().map(|c| (c.side, c.highlighted)).collect();
        assert_eq!(lit, vec![(ConnectorSide::Top, false), (ConnectorSide::Bottom, true)]);
        assert_eq!(l.connectors[1].path.color, opts().connector_color_highlight);
        assert_eq!(l.connectors[0].path.color, opts().connector_color);
    }

    #[test]
    fn upper_final_loser_only_lights_the_lower_grand_final_side() {
        let mut matches = double_elimination(4, false);
        let mut set = |id: &str, top: &str, bottom: &str, winner: Option<&str>| {
            let m = matches.iter_mut().find(|m| m.id == id).unwrap();
            *m = Match {
                winner_id: winner.map(Into::into),
                ..game_with(id, m.bracket_type, m.round, m.bracket_position, Some(top), Some(bottom))
            };
        };
        set("W1-0", "a", "b", Some("a"));
        set("W1-1", "c", "d", Some("c"));
        set("W2-0", "a", "c", Some("c"));
        set("L1-0", "b", "d", Some("b"));
        set("L2-0", "b", "a", Some("a"));
        set("GF", "c", "a", None);

        let l = BracketLayout::compute(&Bracket::from_matches(&matches), &opts(), Some("a"));
        let lit: Vec<(ConnectorSide, bool)> = l.connectors_for("GF").map(|c| (c.side, c.highlighted)).collect();
        assert_eq!(lit, vec![(ConnectorSide::Top, false), (ConnectorSide::Bottom, true)]);
        let lit: Vec<(ConnectorSide, bool)> = l.connectors_for("L2-0").map(|c| (c.side, c.highlighted)).collect();
        assert_eq!(lit, vec![(ConnectorSide::Bottom, false)]);
    }

    #[test]
    fn empty_columns_get_no_header() {
        let matches = vec![
            game("W1-0", BracketType::Winner, 1, 0),
            game("W3-0", BracketType::Winner, 3, 0),
        ];
        let l = layout(&matches);
        let columns: Vec<u32> = l.headers.iter().map(|h| h.column).collect();
        assert_eq!(columns, vec![0, 2]);
    }

    #[test]
    fn malformed_tree_degrades_without_connectors() {
        // Lower round 3 with nothing in round 2, and an orphaned upper match.
        let matches = vec![
            game("W1-0", BracketType::Winner, 1, 0),
            game("W2-5", BracketType::Winner, 2, 5),
            game("L1-0", BracketType::Loser, 1, 0),
            game("L3-0", BracketType::Loser, 3, 0),
            game("GF", BracketType::GrandFinal, 1, 0),
        ];
        let l = layout(&matches);
        assert_eq!(l.boxes.len(), 5);
        assert_eq!(l.connectors_for("W2-5").count(), 0);
        assert_eq!(l.connectors_for("L3-0").count(), 0);
        assert_eq!(l.connectors_for("GF").count(), 2);
    }

    #[test]
    fn empty_bracket_is_just_padding() {
        let l = BracketLayout::compute(&Bracket::default(), &opts(), None);
        assert!(l.boxes.is_empty());
        assert!(l.connectors.is_empty());
        assert_eq!(l.width, 40.0);
        assert_eq!(l.height, 40.0);
    }

    #[test]
    fn canvas_covers_every_box() {
        let o = opts();
        let l = layout(&double_elimination(16, true));
        for b in &l.boxes {
            assert!(b.position.x + o.width <= l.width);
            assert!(b.position.y + o.box_height <= l.height);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let bracket = Bracket::from_matches(&double_elimination(16, true));
        assert_eq!(
            BracketLayout::compute(&bracket, &opts(), Some("x")),
            BracketLayout::compute(&bracket, &opts(), Some("x"))
        );
    }
}
