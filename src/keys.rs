use crate::app::{App, MenuItem};
use crate::state::messages::LoadRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Cells moved per arrow-key press.
const SCROLL_STEP: i32 = 4;

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Selection, shared by the canvas and the match list
        (MenuItem::Bracket | MenuItem::Matches, Char('l'), _) => guard.bracket_next_column(),
        (MenuItem::Bracket | MenuItem::Matches, Char('h'), _) => guard.bracket_prev_column(),
        (MenuItem::Bracket | MenuItem::Matches, Char('j'), _) => guard.bracket_game_down(),
        (MenuItem::Bracket | MenuItem::Matches, Char('k'), _) => guard.bracket_game_up(),
        (MenuItem::Bracket | MenuItem::Matches, KeyCode::Tab, _) => guard.bracket_cycle_section(),

        // Path tracking
        (MenuItem::Bracket | MenuItem::Matches, Char('t'), _) => guard.track_top(),
        (MenuItem::Bracket | MenuItem::Matches, Char('b'), _) => guard.track_bottom(),
        (MenuItem::Bracket | MenuItem::Matches, KeyCode::Esc, _) => guard.clear_tracking(),

        // Free scrolling of the canvas
        (MenuItem::Bracket, KeyCode::Left, _) => guard.scroll(-SCROLL_STEP, 0),
        (MenuItem::Bracket, KeyCode::Right, _) => guard.scroll(SCROLL_STEP, 0),
        (MenuItem::Bracket, KeyCode::Up, _) => guard.scroll(0, -SCROLL_STEP),
        (MenuItem::Bracket, KeyCode::Down, _) => guard.scroll(0, SCROLL_STEP),

        // Reload
        (_, Char('r'), _) => {
            drop(guard);
            let _ = load_requests.send(LoadRequest::Reload).await;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
