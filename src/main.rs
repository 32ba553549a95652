mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::loader::{LoaderWorker, LoadingState};
use crate::state::messages::{LoadRequest, LoadResponse, UiEvent};
use crate::state::refresher::PeriodicRefresher;
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use cue_bracket::layout::BracketLayout;
use cue_bracket::options::resolve;
use cue_bracket::snapshot;
use cue_bracket::svg::{render_svg, svg_preset, write_output_svg};
use log::error;
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args()? {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = App::new();
    let bracket_path = app.settings.bracket_path.clone();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (load_req_tx, load_req_rx) = mpsc::channel::<LoadRequest>(100);
    let (load_resp_tx, load_resp_rx) = mpsc::channel::<LoadResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Snapshot loader thread
    let loader = LoaderWorker::new(bracket_path, load_req_rx, load_resp_tx);
    let loader_task = tokio::spawn(loader.run());

    // Periodic snapshot reload thread (every 30s)
    let periodic_reloader = PeriodicRefresher::new(load_req_tx.clone());
    let periodic_task = tokio::spawn(periodic_reloader.run());

    // Trigger bracket load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, load_req_tx, load_resp_rx).await;

    input_handler.abort();
    loader_task.abort();
    periodic_task.abort();

    Ok(())
}

/// Returns `true` when the arguments were handled and the TUI should not start.
fn handle_cli_args() -> anyhow::Result<bool> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(false);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(true)
        }
        "-V" | "--version" => {
            println!("cuetui {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        "--svg" => {
            export_svg(args.next().map(PathBuf::from))?;
            Ok(true)
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// Render the configured bracket as SVG without starting the TUI.
fn export_svg(output: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = AppSettings::load();
    // No logger is installed outside the TUI.
    for warning in &settings.warnings {
        eprintln!("warning: {warning}");
    }
    let tournament = snapshot::load(settings.bracket_path.as_deref()).context("loading tournament snapshot")?;
    let opts = resolve(&svg_preset().merged_with(&settings.style));
    let layout = BracketLayout::compute(&tournament.bracket(), &opts, settings.track.as_deref());
    let svg = render_svg(&tournament, &layout, &opts);
    write_output_svg(&svg, output.as_deref())
        .with_context(|| format!("writing svg to {}", output.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "stdout".into())))?;
    Ok(())
}

fn usage_text() -> &'static str {
    "cuetui - pool tournament bracket viewer

Usage:
  cuetui
  cuetui --svg [OUTPUT]
  cuetui --help
  cuetui --version

Environment:
  CUETUI_BRACKET_JSON   Path to a tournament JSON snapshot (default: bundled demo)
  CUETUI_STYLE_JSON     Path to a JSON file of layout style overrides
  CUETUI_TRACK          Participant id whose path is highlighted on start
  CUETUI_LOG            Log level (error, warn, info, debug, trace)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    load_requests: mpsc::Sender<LoadRequest>,
    mut load_responses: mpsc::Receiver<LoadResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &load_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = load_responses.recv() => {
                let should_redraw = handle_load_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = load_requests.send(LoadRequest::LoadBracket).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, load_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_load_response(
    response: LoadResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        LoadResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        LoadResponse::BracketLoaded { tournament } => {
            let mut guard = app.lock().await;
            guard.on_bracket_loaded(tournament);
        }
        LoadResponse::BracketReloaded { tournament } => {
            let mut guard = app.lock().await;
            guard.on_bracket_reloaded(tournament);
        }
        LoadResponse::Error { message } => {
            error!("Snapshot error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
