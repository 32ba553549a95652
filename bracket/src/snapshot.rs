use crate::wire::{SnapshotDocument, WireMatch, WireParticipant};
use crate::{BracketType, Match, MatchStatus, Participant, Tournament};
use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;
use std::path::Path;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

const DEMO_BRACKET_JSON: &str = include_str!("../demo_bracket.json");

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error, String),
    Parse(serde_json::Error, String),
    InvalidBracketType { match_id: String, value: String },
    RoundOutOfRange { match_id: String, round: u32, limit: usize },
    Empty(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e, path) => write!(f, "Could not read {path}: {e}"),
            SnapshotError::Parse(e, source) => write!(f, "Invalid snapshot json in {source}: {e}"),
            SnapshotError::InvalidBracketType { match_id, value } => {
                write!(f, "Match {match_id} has unknown bracket type '{value}'")
            }
            SnapshotError::RoundOutOfRange { match_id, round, limit } => {
                write!(f, "Match {match_id} is in round {round}, but a snapshot of {limit} matches has at most {limit} rounds")
            }
            SnapshotError::Empty(source) => write!(f, "No matches found in {source}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e, _) => Some(e),
            SnapshotError::Parse(e, _) => Some(e),
            _ => None,
        }
    }
}

/// Load a tournament snapshot.
///
/// With no path configured the bundled demo bracket is used so the viewer
/// always has something to draw.
pub fn load(path: Option<&Path>) -> SnapshotResult<Tournament> {
    match path {
        Some(path) => load_tournament(path),
        None => {
            debug!("no snapshot path configured, using the demo bracket");
            load_embedded_demo()
        }
    }
}

pub fn load_tournament(path: &Path) -> SnapshotResult<Tournament> {
    let source = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io(e, source.clone()))?;
    debug!("read {} bytes of snapshot from {source}", content.len());
    parse_from(&content, &source)
}

pub fn parse_tournament(json: &str) -> SnapshotResult<Tournament> {
    parse_from(json, "<input>")
}

/// 8-player true double elimination, grand final reset included.
pub fn load_embedded_demo() -> SnapshotResult<Tournament> {
    parse_from(DEMO_BRACKET_JSON, "<demo bracket>")
}

fn parse_from(json: &str, source: &str) -> SnapshotResult<Tournament> {
    let raw: SnapshotDocument =
        serde_json::from_str(json).map_err(|e| SnapshotError::Parse(e, source.to_string()))?;
    let info = raw.tournament.unwrap_or_default();
    let wire_matches = raw.matches.unwrap_or_default();
    if wire_matches.is_empty() {
        return Err(SnapshotError::Empty(source.to_string()));
    }

    // Every round holds at least one match, so no side has more rounds than matches.
    let max_round = wire_matches.len();
    let matches = wire_matches
        .iter()
        .map(|raw| map_match(raw, max_round))
        .collect::<SnapshotResult<Vec<_>>>()?;

    Ok(Tournament {
        id: info.id.unwrap_or_default(),
        name: info.name.unwrap_or_else(|| "Pool Tournament".into()),
        venue: info.venue,
        updated_at: info.updated_at.as_deref().and_then(parse_timestamp),
        matches,
    })
}

fn map_match(raw: &WireMatch, max_round: usize) -> SnapshotResult<Match> {
    let bracket_type =
        parse_bracket_type(&raw.bracket_type).ok_or_else(|| SnapshotError::InvalidBracketType {
            match_id: raw.id.clone(),
            value: raw.bracket_type.clone(),
        })?;
    if raw.round as usize > max_round {
        return Err(SnapshotError::RoundOutOfRange {
            match_id: raw.id.clone(),
            round: raw.round,
            limit: max_round,
        });
    }
    let slot = |idx: usize| raw.participants.get(idx).cloned().flatten().map(map_participant);
    let score = match raw.scores.as_deref() {
        Some([top, bottom, ..]) => Some((*top, *bottom)),
        _ => None,
    };

    Ok(Match {
        id: raw.id.clone(),
        round: raw.round.max(1),
        bracket_position: raw.bracket_position,
        bracket_type,
        top: slot(0),
        bottom: slot(1),
        winner_id: raw.winner_id.clone(),
        status: parse_status(raw.state.as_deref().unwrap_or_default()),
        score,
    })
}

fn map_participant(raw: WireParticipant) -> Participant {
    Participant {
        name: raw.name.unwrap_or_else(|| raw.id.clone()),
        id: raw.id,
        seed: raw.seed,
    }
}

pub fn parse_bracket_type(value: &str) -> Option<BracketType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "winner" | "winners" | "upper" => Some(BracketType::Winner),
        "loser" | "losers" | "lower" => Some(BracketType::Loser),
        "grand_final" | "grandfinal" | "final" => Some(BracketType::GrandFinal),
        _ => None,
    }
}

/// Unknown states fall back to scheduled.
pub fn parse_status(value: &str) -> MatchStatus {
    match value.trim().to_ascii_lowercase().as_str() {
        "in_progress" | "playing" | "live" => MatchStatus::InProgress,
        "completed" | "finished" | "done" => MatchStatus::Completed,
        "walkover" | "wo" | "bye" => MatchStatus::Walkover,
        _ => MatchStatus::Scheduled,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BracketFormat;
    use crate::layout::BracketLayout;
    use crate::options::LayoutOptions;

    const SMALL: &str = r#"{
        "tournament": {"id": "t1", "name": "Tuesday 9-Ball", "venue": "Corner Pocket", "updatedAt": "2026-03-10T19:30:00Z"},
        "matches": [
            {"id": "m1", "round": 1, "bracketPosition": 0, "bracketType": "winner",
             "participants": [{"id": "p1", "name": "Efren", "seed": 1}, {"id": "p2", "name": "Shane", "seed": 4}],
             "winnerId": "p1", "state": "completed", "scores": [7, 5]},
            {"id": "m2", "round": 1, "bracketPosition": 1, "bracketType": "winner",
             "participants": [{"id": "p3"}, null], "state": "in_progress", "extra": true},
            {"id": "m3", "round": 2, "bracketPosition": 0, "bracketType": "winner",
             "participants": [{"id": "p1", "name": "Efren"}, null]}
        ]
    }"#;

    #[test]
    fn parses_small_snapshot() {
        let t = parse_tournament(SMALL).expect("snapshot should parse");
        assert_eq!(t.name, "Tuesday 9-Ball");
        assert_eq!(t.venue.as_deref(), Some("Corner Pocket"));
        assert!(t.updated_at.is_some());
        assert_eq!(t.matches.len(), 3);

        let m1 = t.find_match("m1").unwrap();
        assert_eq!(m1.score, Some((7, 5)));
        assert_eq!(m1.status, MatchStatus::Completed);
        assert_eq!(m1.winner().map(|p| p.name.as_str()), Some("Efren"));
        assert_eq!(m1.bottom.as_ref().and_then(|p| p.seed), Some(4));

        let m2 = t.find_match("m2").unwrap();
        assert_eq!(m2.status, MatchStatus::InProgress);
        assert_eq!(m2.top.as_ref().map(|p| p.name.as_str()), Some("p3"), "name falls back to id");
        assert!(m2.bottom.is_none());

        let m3 = t.find_match("m3").unwrap();
        assert_eq!(m3.status, MatchStatus::Scheduled);
        assert_eq!(t.bracket().format(), BracketFormat::SingleElimination);
    }

    #[test]
    fn unknown_bracket_type_is_an_error() {
        let json = r#"{"matches": [{"id": "x", "round": 1, "bracketPosition": 0, "bracketType": "consolation"}]}"#;
        let err = parse_tournament(json).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidBracketType { .. }));
        assert_eq!(err.to_string(), "Match x has unknown bracket type 'consolation'");
    }

    #[test]
    fn round_beyond_match_count_is_an_error() {
        let json = r#"{"matches": [{"id": "x", "round": 1000000, "bracketPosition": 0, "bracketType": "winner"}]}"#;
        let err = parse_tournament(json).unwrap_err();
        assert!(matches!(err, SnapshotError::RoundOutOfRange { round: 1000000, limit: 1, .. }));
        assert!(err.to_string().contains("Match x"));

        let json = r#"{"matches": [{"id": "x", "round": 4294967295, "bracketPosition": 0, "bracketType": "loser"}]}"#;
        assert!(matches!(parse_tournament(json), Err(SnapshotError::RoundOutOfRange { .. })));
    }

    #[test]
    fn empty_snapshot_is_an_error() {
        assert!(matches!(parse_tournament(r#"{"matches": []}"#), Err(SnapshotError::Empty(_))));
        assert!(matches!(parse_tournament("{}"), Err(SnapshotError::Empty(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_tournament("{\"matches\": ["), Err(SnapshotError::Parse(..))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_tournament(Path::new("/nonexistent/cuetui/bracket.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(..)));
        assert!(err.to_string().contains("/nonexistent/cuetui/bracket.json"));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("in_progress"), MatchStatus::InProgress);
        assert_eq!(parse_status("COMPLETED"), MatchStatus::Completed);
        assert_eq!(parse_status("walkover"), MatchStatus::Walkover);
        assert_eq!(parse_status("postponed"), MatchStatus::Scheduled);
        assert_eq!(parse_status(""), MatchStatus::Scheduled);
    }

    #[test]
    fn test_parse_bracket_type() {
        assert_eq!(parse_bracket_type("winner"), Some(BracketType::Winner));
        assert_eq!(parse_bracket_type("loser"), Some(BracketType::Loser));
        assert_eq!(parse_bracket_type("grand_final"), Some(BracketType::GrandFinal));
        assert_eq!(parse_bracket_type("Upper"), Some(BracketType::Winner));
        assert_eq!(parse_bracket_type("swiss"), None);
    }

    #[test]
    fn demo_bracket_parses_and_lays_out() {
        let t = load(None).expect("demo bracket should parse");
        let bracket = t.bracket();
        assert_eq!(bracket.format(), BracketFormat::DoubleElimination);
        assert_eq!(bracket.upper.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 2, 1]);
        assert_eq!(bracket.lower.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1, 1]);
        assert!(bracket.has_reset_game());

        let layout = BracketLayout::compute(&bracket, &LayoutOptions::default(), None);
        assert_eq!(layout.boxes.len(), t.matches.len());
    }
}
