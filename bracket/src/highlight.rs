use crate::Match;
use crate::connector::HighlightFlags;

/// A match together with the matches that feed its two slots.
#[derive(Debug, Clone, Copy)]
pub struct BracketSnippet<'a> {
    pub current: &'a Match,
    pub previous_top: Option<&'a Match>,
    pub previous_bottom: Option<&'a Match>,
}

/// A connector is on the tracked player's path when the player advanced out of
/// the predecessor into the current match. Until the predecessor has a recorded
/// winner, appearing in both matches is enough.
pub fn is_player_path_highlighted(snippet: &BracketSnippet, tracked: Option<&str>) -> HighlightFlags {
    let Some(player_id) = tracked else {
        return HighlightFlags::default();
    };
    if !snippet.current.has_participant(player_id) {
        return HighlightFlags::default();
    }

    let continues = |previous: Option<&Match>| {
        previous.is_some_and(|m| match m.winner_id.as_deref() {
            Some(winner_id) => winner_id == player_id,
            None => m.has_participant(player_id),
        })
    };
    HighlightFlags {
        top: continues(snippet.previous_top),
        bottom: continues(snippet.previous_bottom),
    }
}
