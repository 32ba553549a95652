use crate::components::bracket::terminal_preset;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use chrono::Local;
use cue_bracket::Tournament;
use cue_bracket::layout::BracketLayout;
use cue_bracket::options::{LayoutOptions, resolve};
use log::{debug, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Matches,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    /// Terminal preset with the user's style file layered on top.
    pub layout_options: LayoutOptions,
}

impl App {
    pub fn new() -> Self {
        Self::with_settings(AppSettings::load())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let layout_options = resolve(&terminal_preset().merged_with(&settings.style));
        let mut state = AppState::new();
        state.bracket.tracked = settings.track.clone();

        let app = Self { settings, state, layout_options };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Loader response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_bracket_loaded(&mut self, tournament: Tournament) {
        debug!("loaded {} with {} matches", tournament.name, tournament.matches.len());
        self.state.last_error = None;
        self.state.last_loaded = Some(Local::now());
        self.state.bracket.load(tournament);
        self.drop_unknown_tracking();
    }

    pub fn on_bracket_reloaded(&mut self, tournament: Tournament) {
        self.state.last_error = None;
        self.state.last_loaded = Some(Local::now());
        self.state.bracket.reload(tournament);
        self.drop_unknown_tracking();
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    fn drop_unknown_tracking(&mut self) {
        let bracket = &mut self.state.bracket;
        let Some(id) = bracket.tracked.as_deref() else {
            return;
        };
        let known = bracket
            .tournament
            .as_ref()
            .is_some_and(|t| t.find_participant(id).is_some());
        if !known {
            warn!("tracked participant {id} is not in this tournament");
            bracket.tracked = None;
        }
    }

    /// Layout of the loaded bracket with the current tracking applied.
    pub fn compute_layout(&self) -> Option<BracketLayout> {
        self.state.bracket.tournament.as_ref()?;
        Some(BracketLayout::compute(
            &self.state.bracket.bracket,
            &self.layout_options,
            self.state.bracket.tracked.as_deref(),
        ))
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Bracket navigation, delegated to BracketState
    // -----------------------------------------------------------------------

    pub fn bracket_next_column(&mut self) {
        self.state.bracket.navigate_column_next();
    }

    pub fn bracket_prev_column(&mut self) {
        self.state.bracket.navigate_column_prev();
    }

    pub fn bracket_game_down(&mut self) {
        self.state.bracket.navigate_game_down();
    }

    pub fn bracket_game_up(&mut self) {
        self.state.bracket.navigate_game_up();
    }

    pub fn bracket_cycle_section(&mut self) {
        self.state.bracket.cycle_section();
    }

    pub fn track_top(&mut self) {
        self.state.bracket.track_slot(0);
    }

    pub fn track_bottom(&mut self) {
        self.state.bracket.track_slot(1);
    }

    pub fn clear_tracking(&mut self) {
        self.state.bracket.clear_tracking();
    }

    pub fn scroll(&mut self, dx: i32, dy: i32) {
        self.state.bracket.scroll_by(dx, dy);
    }
}
