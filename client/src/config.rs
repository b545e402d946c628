use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings for a [`BattleDriver`](crate::BattleDriver)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Our username, to tell our side apart before the first request
    pub username: Option<String>,
    /// Send `/forfeit` when the parser fails
    pub forfeit_on_error: bool,
    /// Trace every event handed to the parser
    pub log_events: bool,
}

impl DriverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid driver config")
    }
}
