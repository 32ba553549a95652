use cue_bracket::options::{self, PartialLayoutOptions};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_BRACKET_JSON: &str = "CUETUI_BRACKET_JSON";
pub const ENV_STYLE_JSON: &str = "CUETUI_STYLE_JSON";
pub const ENV_LOG: &str = "CUETUI_LOG";
pub const ENV_TRACK: &str = "CUETUI_TRACK";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Tournament snapshot to read; `None` shows the bundled demo bracket.
    pub bracket_path: Option<PathBuf>,
    /// User style overrides layered over the terminal preset.
    pub style: PartialLayoutOptions,
    /// Participant id to track on startup.
    pub track: Option<String>,
    /// Problems found while reading the environment.
    pub warnings: Vec<String>,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Invalid values are logged, kept in
    /// `warnings` and otherwise ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut warnings = Vec::new();

        let log_level = match non_empty(ENV_LOG).map(|raw| (LevelFilter::from_str(raw.trim()), raw)) {
            Some((Ok(level), _)) => Some(level),
            Some((Err(_), raw)) => {
                warnings.push(format!("ignoring {ENV_LOG}={raw}: not a log level"));
                None
            }
            None => None,
        };

        let style = match non_empty(ENV_STYLE_JSON) {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(content) => options::parse_partial(&content).unwrap_or_else(|e| {
                    warnings.push(format!("invalid style json at {path}: {e}"));
                    PartialLayoutOptions::default()
                }),
                Err(e) => {
                    warnings.push(format!("could not read style file {path}: {e}"));
                    PartialLayoutOptions::default()
                }
            },
            None => PartialLayoutOptions::default(),
        };

        for warning in &warnings {
            log::warn!("{warning}");
        }

        Self {
            full_screen: false,
            log_level,
            bracket_path: non_empty(ENV_BRACKET_JSON).map(PathBuf::from),
            style,
            track: non_empty(ENV_TRACK),
            warnings,
        }
    }
}
