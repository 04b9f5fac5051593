//! Runtime settings of the `ontc` binary.
//!
//! Values are layered: built-in defaults, then an optional `ontc.toml` (or the
//! file named by `ONTC_CONFIG`), then `ONTC_*` environment variables such as
//! `ONTC_LOG=debug`.

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::exec::DEFAULT_MAX_PRECEDENCE_DEPTH;

pub const CONFIG_FILE: &str = "ontc";
pub const CONFIG_VARIABLE: &str = "ONTC_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Filter directive for the tracing subscriber.
    pub log: String,
    /// Prompt printed by the interactive shell.
    pub prompt: String,
    /// How many precedence levels may sit below `main`. Zero still runs `main`.
    pub max_precedence_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: String::from("warn"),
            prompt: String::from("> "),
            max_precedence_depth: DEFAULT_MAX_PRECEDENCE_DEPTH,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_VARIABLE).unwrap_or_else(|_| CONFIG_FILE.to_string());
        Self::from_file(&file)
    }
    /// Loads settings with `file` as the optional file layer.
    pub fn from_file(file: &str) -> Result<Self> {
        let defaults = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("log", defaults.log)?
            .set_default("prompt", defaults.prompt)?
            .set_default("max_precedence_depth", defaults.max_precedence_depth as i64)?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("ONTC"))
            .build()?
            .try_deserialize()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }
}
