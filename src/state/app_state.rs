use crate::app::MenuItem;
use chrono::{DateTime, Local};
use cue_bracket::{Bracket, BracketType, Match, MatchStatus, Tournament};

// ---------------------------------------------------------------------------
// Bracket / tournament state
// ---------------------------------------------------------------------------

/// Which part of the bracket the cursor is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Upper,
    Lower,
    Finals,
}

impl Section {
    pub fn bracket_type(self) -> BracketType {
        match self {
            Section::Upper => BracketType::Winner,
            Section::Lower => BracketType::Loser,
            Section::Finals => BracketType::GrandFinal,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Section::Upper => Section::Lower,
            Section::Lower => Section::Finals,
            Section::Finals => Section::Upper,
        }
    }
}

#[derive(Debug, Default)]
pub struct BracketState {
    pub tournament: Option<Tournament>,
    /// Match tree derived from `tournament`, rebuilt on every load.
    pub bracket: Bracket,
    pub section: Section,
    /// Column within the selected section.
    pub column: usize,
    /// Match index within the selected column.
    pub game: usize,
    /// Participant whose path through the bracket is highlighted.
    pub tracked: Option<String>,
    pub scroll_x: u16,
    pub scroll_y: u16,
    /// Set when the cursor moves; the next draw scrolls the selection into view.
    pub follow_selection: bool,
}

impl BracketState {
    /// Store a newly loaded tournament and jump to the most relevant match.
    pub fn load(&mut self, tournament: Tournament) {
        self.bracket = tournament.bracket();
        let (section, column, game) = detect_active_match(&self.bracket);
        self.section = section;
        self.column = column;
        self.game = game;
        self.scroll_x = 0;
        self.scroll_y = 0;
        self.follow_selection = true;
        self.tournament = Some(tournament);
    }

    /// Swap in a re-read snapshot, keeping the cursor on the same match.
    pub fn reload(&mut self, tournament: Tournament) {
        let selected_id = self.selected_match_id();
        self.bracket = tournament.bracket();
        self.tournament = Some(tournament);

        if let Some(id) = selected_id
            && let Some(found) = self.locate(&id)
        {
            (self.section, self.column, self.game) = found;
            return;
        }
        self.clamp_selection();
    }

    pub fn columns(&self) -> Vec<&[Match]> {
        self.bracket.columns(self.section.bracket_type())
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.columns().get(self.column)?.get(self.game)
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.selected_match().map(|m| m.id.clone())
    }

    pub fn navigate_column_next(&mut self) {
        let columns = self.columns().len();
        if self.column + 1 < columns {
            self.column += 1;
            self.clamp_selection();
            self.follow_selection = true;
        }
    }

    pub fn navigate_column_prev(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            self.clamp_selection();
            self.follow_selection = true;
        }
    }

    pub fn navigate_game_down(&mut self) {
        let max = self.games_in_column().saturating_sub(1);
        if self.game < max {
            self.game += 1;
            self.follow_selection = true;
        }
    }

    pub fn navigate_game_up(&mut self) {
        if self.game > 0 {
            self.game -= 1;
            self.follow_selection = true;
        }
    }

    /// Move to the next section that has any matches.
    pub fn cycle_section(&mut self) {
        let mut next = self.section.next();
        while next != self.section {
            if !self.bracket.columns(next.bracket_type()).is_empty() {
                self.section = next;
                self.column = 0;
                self.game = 0;
                self.follow_selection = true;
                return;
            }
            next = next.next();
        }
    }

    /// Track the top (`slot == 0`) or bottom participant of the selected
    /// match. Selecting the already-tracked participant stops tracking.
    pub fn track_slot(&mut self, slot: usize) {
        let Some(game) = self.selected_match() else {
            return;
        };
        let participant = if slot == 0 { game.top.as_ref() } else { game.bottom.as_ref() };
        let Some(id) = participant.map(|p| p.id.clone()) else {
            return;
        };
        if self.tracked.as_deref() == Some(id.as_str()) {
            self.tracked = None;
        } else {
            self.tracked = Some(id);
        }
    }

    pub fn clear_tracking(&mut self) {
        self.tracked = None;
    }

    pub fn tracked_name(&self) -> Option<&str> {
        let id = self.tracked.as_deref()?;
        self.tournament
            .as_ref()?
            .find_participant(id)
            .map(|p| p.name.as_str())
    }

    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        self.follow_selection = false;
        self.scroll_x = self.scroll_x.saturating_add_signed(dx.clamp(-1000, 1000) as i16);
        self.scroll_y = self.scroll_y.saturating_add_signed(dy.clamp(-1000, 1000) as i16);
    }

    /// Adjust scroll so the cell rectangle `(x, y, w, h)` fits in the viewport.
    pub fn ensure_visible(&mut self, cell: (u16, u16, u16, u16), viewport: (u16, u16)) {
        let (x, y, w, h) = cell;
        let (vw, vh) = viewport;
        if x < self.scroll_x {
            self.scroll_x = x;
        } else if x.saturating_add(w) > self.scroll_x.saturating_add(vw) {
            self.scroll_x = x.saturating_add(w).saturating_sub(vw).min(x);
        }
        if y < self.scroll_y {
            self.scroll_y = y;
        } else if y.saturating_add(h) > self.scroll_y.saturating_add(vh) {
            self.scroll_y = y.saturating_add(h).saturating_sub(vh).min(y);
        }
    }

    fn games_in_column(&self) -> usize {
        self.columns().get(self.column).map(|c| c.len()).unwrap_or(0)
    }

    fn clamp_selection(&mut self) {
        let columns = self.columns().len();
        if columns == 0 {
            self.section = Section::Upper;
            self.column = 0;
            self.game = 0;
            return;
        }
        self.column = self.column.min(columns - 1);
        self.game = self.game.min(self.games_in_column().saturating_sub(1));
    }

    fn locate(&self, match_id: &str) -> Option<(Section, usize, usize)> {
        find_match(&self.bracket, |m| m.id == match_id)
    }
}

/// Pick the match to select on load: the first live match, or failing that
/// the first scheduled match with both players known.
fn detect_active_match(bracket: &Bracket) -> (Section, usize, usize) {
    find_match(bracket, |m| m.status == MatchStatus::InProgress)
        .or_else(|| {
            find_match(bracket, |m| {
                m.status == MatchStatus::Scheduled && m.top.is_some() && m.bottom.is_some()
            })
        })
        .unwrap_or_default()
}

fn find_match(bracket: &Bracket, pred: impl Fn(&Match) -> bool) -> Option<(Section, usize, usize)> {
    [Section::Upper, Section::Lower, Section::Finals]
        .into_iter()
        .find_map(|section| {
            bracket
                .columns(section.bracket_type())
                .iter()
                .enumerate()
                .find_map(|(c, games)| games.iter().position(&pred).map(|g| (section, c, g)))
        })
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub last_loaded: Option<DateTime<Local>>,
    pub bracket: BracketState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_bracket::snapshot::load_embedded_demo;

    fn demo_state() -> BracketState {
        let mut state = BracketState::default();
        state.load(load_embedded_demo().unwrap());
        state
    }

    #[test]
    fn load_selects_the_live_match() {
        let state = demo_state();
        // The reset game is the only match in progress in the demo bracket.
        assert_eq!(state.section, Section::Finals);
        assert_eq!(state.selected_match_id().as_deref(), Some("GF-2"));
    }

    #[test]
    fn column_navigation_clamps_game_index() {
        let mut state = demo_state();
        state.section = Section::Upper;
        state.column = 0;
        state.game = 3;
        state.navigate_column_next();
        assert_eq!((state.column, state.game), (1, 1));
        state.navigate_column_next();
        state.navigate_column_next();
        assert_eq!((state.column, state.game), (2, 0));
        state.navigate_column_prev();
        assert_eq!(state.column, 1);
    }

    #[test]
    fn game_navigation_stays_in_column() {
        let mut state = demo_state();
        state.section = Section::Lower;
        state.column = 0;
        state.game = 0;
        state.navigate_game_up();
        assert_eq!(state.game, 0);
        state.navigate_game_down();
        state.navigate_game_down();
        assert_eq!(state.game, 1);
    }

    #[test]
    fn cycle_section_skips_empty_sections() {
        let mut state = BracketState::default();
        let mut t = load_embedded_demo().unwrap();
        t.matches.retain(|m| m.bracket_type == BracketType::Winner);
        state.load(t);
        state.cycle_section();
        assert_eq!(state.section, Section::Upper);

        let mut state = demo_state();
        state.section = Section::Upper;
        state.cycle_section();
        assert_eq!(state.section, Section::Lower);
        state.cycle_section();
        assert_eq!(state.section, Section::Finals);
        state.cycle_section();
        assert_eq!(state.section, Section::Upper);
    }

    #[test]
    fn tracking_toggles_per_slot() {
        let mut state = demo_state();
        state.section = Section::Upper;
        state.column = 0;
        state.game = 0;
        state.track_slot(0);
        assert_eq!(state.tracked.as_deref(), Some("p1"));
        assert_eq!(state.tracked_name(), Some("Mara Kessler"));
        state.track_slot(1);
        assert_eq!(state.tracked.as_deref(), Some("p8"));
        state.track_slot(1);
        assert!(state.tracked.is_none());
    }

    #[test]
    fn reload_keeps_selection_and_tracking() {
        let mut state = demo_state();
        state.section = Section::Lower;
        state.column = 1;
        state.game = 1;
        state.tracked = Some("p2".into());
        state.reload(load_embedded_demo().unwrap());
        assert_eq!(state.selected_match_id().as_deref(), Some("L2-1"));
        assert_eq!(state.tracked.as_deref(), Some("p2"));
    }

    #[test]
    fn reload_clamps_when_match_disappears() {
        let mut state = demo_state();
        state.section = Section::Upper;
        state.column = 2;
        state.game = 0;
        let mut t = load_embedded_demo().unwrap();
        t.matches.retain(|m| m.id != "W3-0");
        state.reload(t);
        assert_eq!((state.section, state.column, state.game), (Section::Upper, 1, 0));
    }

    #[test]
    fn ensure_visible_scrolls_both_axes() {
        let mut state = BracketState::default();
        state.ensure_visible((100, 40, 24, 3), (80, 20));
        assert_eq!((state.scroll_x, state.scroll_y), (44, 23));
        state.ensure_visible((10, 5, 24, 3), (80, 20));
        assert_eq!((state.scroll_x, state.scroll_y), (10, 5));
        state.ensure_visible((20, 10, 24, 3), (80, 20));
        assert_eq!((state.scroll_x, state.scroll_y), (10, 5));
    }

    #[test]
    fn navigation_requests_follow_and_scrolling_cancels_it() {
        let mut state = demo_state();
        state.follow_selection = false;
        state.section = Section::Upper;
        state.column = 0;
        state.game = 0;
        state.navigate_game_up();
        assert!(!state.follow_selection);
        state.navigate_game_down();
        assert!(state.follow_selection);
        state.scroll_by(4, 0);
        assert!(!state.follow_selection);
    }

    #[test]
    fn scroll_saturates_at_zero() {
        let mut state = BracketState::default();
        state.scroll_by(-5, 3);
        assert_eq!((state.scroll_x, state.scroll_y), (0, 3));
    }
}
