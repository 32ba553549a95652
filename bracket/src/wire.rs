/// Snapshot wire types: serde shapes for the tournament export the data layer
/// writes. They map to the domain types in snapshot.rs.
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub tournament: Option<TournamentInfo>,
    pub matches: Option<Vec<WireMatch>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TournamentInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub venue: Option<String>,
    /// RFC 3339 timestamp of the export.
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireMatch {
    pub id: String,
    pub round: u32,
    pub bracket_position: u32,
    /// "winner", "loser" or "grand_final".
    pub bracket_type: String,
    /// Top slot first. Either slot may be null while the feeder is undecided.
    #[serde(default)]
    pub participants: Vec<Option<WireParticipant>>,
    pub winner_id: Option<String>,
    /// "scheduled", "in_progress", "completed", "walkover".
    pub state: Option<String>,
    pub scores: Option<Vec<u16>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireParticipant {
    pub id: String,
    pub name: Option<String>,
    pub seed: Option<u16>,
}
