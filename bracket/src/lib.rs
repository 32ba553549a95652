pub mod connector;
pub mod highlight;
pub mod layout;
pub mod options;
pub mod position;
pub mod snapshot;
pub mod svg;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the snapshot wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub venue: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub matches: Vec<Match>,
}

impl Tournament {
    /// Find a match by ID.
    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Look up a participant by ID across every match slot.
    pub fn find_participant(&self, participant_id: &str) -> Option<&Participant> {
        self.matches
            .iter()
            .flat_map(|m| [m.top.as_ref(), m.bottom.as_ref()])
            .flatten()
            .find(|p| p.id == participant_id)
    }

    /// Group the flat match list into upper/lower/final columns for layout.
    pub fn bracket(&self) -> Bracket {
        Bracket::from_matches(&self.matches)
    }
}

/// Which side of a bracket a match belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    #[default]
    Winner,
    Loser,
    GrandFinal,
}

impl BracketType {
    pub fn label(&self) -> &'static str {
        match self {
            BracketType::Winner => "Upper bracket",
            BracketType::Loser => "Lower bracket",
            BracketType::GrandFinal => "Finals",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Walkover,
}

impl MatchStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Walkover)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub seed: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct Match {
    pub id: String,
    /// 1-based round within its bracket side.
    pub round: u32,
    /// 0-based index within the round.
    pub bracket_position: u32,
    pub bracket_type: BracketType,
    pub top: Option<Participant>,
    pub bottom: Option<Participant>,
    pub winner_id: Option<String>,
    pub status: MatchStatus,
    pub score: Option<(u16, u16)>, // (top, bottom) racks won
}

impl Match {
    pub fn has_participant(&self, participant_id: &str) -> bool {
        [self.top.as_ref(), self.bottom.as_ref()]
            .into_iter()
            .flatten()
            .any(|p| p.id == participant_id)
    }

    pub fn winner(&self) -> Option<&Participant> {
        let winner_id = self.winner_id.as_deref()?;
        [self.top.as_ref(), self.bottom.as_ref()]
            .into_iter()
            .flatten()
            .find(|p| p.id == winner_id)
    }
}

// ---------------------------------------------------------------------------
// Bracket: the match tree grouped into layout columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketFormat {
    SingleElimination,
    DoubleElimination,
}

/// Match tree grouped by side and round. `upper[c]` / `lower[c]` hold the
/// matches of round `c + 1` ordered by bracket position; a round missing from
/// the source data is kept as an empty column so indices stay aligned.
#[derive(Debug, Clone, Default)]
pub struct Bracket {
    pub upper: Vec<Vec<Match>>,
    pub lower: Vec<Vec<Match>>,
    /// Grand final first, then the reset game when one exists.
    pub finals: Vec<Match>,
}

impl Bracket {
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut upper: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
        let mut lower: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
        let mut finals = Vec::new();

        for m in matches {
            match m.bracket_type {
                BracketType::Winner => upper.entry(m.round).or_default().push(m.clone()),
                BracketType::Loser => lower.entry(m.round).or_default().push(m.clone()),
                BracketType::GrandFinal => finals.push(m.clone()),
            }
        }
        finals.sort_by_key(|m| (m.round, m.bracket_position));

        Self {
            upper: into_columns(upper),
            lower: into_columns(lower),
            finals,
        }
    }

    pub fn format(&self) -> BracketFormat {
        if self.lower.is_empty() && self.finals.is_empty() {
            BracketFormat::SingleElimination
        } else {
            BracketFormat::DoubleElimination
        }
    }

    pub fn has_reset_game(&self) -> bool {
        self.finals.len() > 1
    }

    /// Columns for one side of the bracket, finals treated as one column each.
    pub fn columns(&self, bracket_type: BracketType) -> Vec<&[Match]> {
        match bracket_type {
            BracketType::Winner => self.upper.iter().map(Vec::as_slice).collect(),
            BracketType::Loser => self.lower.iter().map(Vec::as_slice).collect(),
            BracketType::GrandFinal => self.finals.iter().map(std::slice::from_ref).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty() && self.lower.is_empty() && self.finals.is_empty()
    }
}

fn into_columns(by_round: BTreeMap<u32, Vec<Match>>) -> Vec<Vec<Match>> {
    let Some(&last_round) = by_round.keys().next_back() else {
        return Vec::new();
    };
    let mut columns = vec![Vec::new(); last_round.max(1) as usize];
    for (round, mut games) in by_round {
        games.sort_by_key(|m| m.bracket_position);
        let idx = round.saturating_sub(1) as usize;
        columns[idx] = games;
    }
    columns
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn groups_matches_into_sorted_columns() {
        let matches = vec![
            game("b", BracketType::Winner, 1, 1),
            game("final", BracketType::Winner, 2, 0),
            game("a", BracketType::Winner, 1, 0),
        ];
        let bracket = Bracket::from_matches(&matches);
        assert_eq!(bracket.upper.len(), 2);
        let ids: Vec<&str> = bracket.upper[0].iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(bracket.format(), BracketFormat::SingleElimination);
    }

    #[test]
    fn missing_round_keeps_column_alignment() {
        let matches = vec![game("r1", BracketType::Winner, 1, 0), game("r3", BracketType::Winner, 3, 0)];
        let bracket = Bracket::from_matches(&matches);
        assert_eq!(bracket.upper.len(), 3);
        assert!(bracket.upper[1].is_empty());
        assert_eq!(bracket.upper[2][0].id, "r3");
    }

    #[test]
    fn double_elimination_shape() {
        let bracket = Bracket::from_matches(&double_elimination(8, true));
        assert_eq!(bracket.format(), BracketFormat::DoubleElimination);
        assert_eq!(bracket.upper.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 2, 1]);
        assert_eq!(bracket.lower.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1, 1]);
        assert!(bracket.has_reset_game());
        assert_eq!(bracket.finals[0].id, "GF");
        assert_eq!(bracket.columns(BracketType::GrandFinal).len(), 2);
    }

    #[test]
    fn winner_resolves_from_slots() {
        let mut m = game_with("m", BracketType::Winner, 1, 0, Some("ann"), Some("bob"));
        m.winner_id = Some("bob".into());
        assert_eq!(m.winner().map(|p| p.name.as_str()), Some("BOB"));
        assert!(m.has_participant("ann"));
        assert!(!m.has_participant("cat"));
    }

    #[test]
    fn find_participant_searches_all_matches() {
        let t = Tournament {
            matches: vec![game_with("m", BracketType::Loser, 2, 0, None, Some("dee"))],
            ..Default::default()
        };
        assert_eq!(t.find_participant("dee").map(|p| p.name.as_str()), Some("DEE"));
        assert!(t.find_participant("zed").is_none());
    }
}
