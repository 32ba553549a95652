use crate::state::loader::LoadingState;
use crossterm::event::KeyEvent;
use cue_bracket::Tournament;

#[derive(Debug, Clone)]
pub enum LoadRequest {
    LoadBracket,
    /// Re-read the snapshot; selection and tracking survive the swap.
    Reload,
}

#[derive(Debug)]
pub enum LoadResponse {
    LoadingStateChanged { loading_state: LoadingState },
    BracketLoaded { tournament: Tournament },
    BracketReloaded { tournament: Tournament },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
