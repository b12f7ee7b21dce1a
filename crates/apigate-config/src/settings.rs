//! Global settings shared across profiles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Default tracing level for apigate crates (`trace` .. `error`, or `off`).
    #[serde(default)]
    pub log_level: Option<String>,

    /// `compact` (default) or `full`.
    #[serde(default)]
    pub log_format: Option<String>,
}

impl GlobalSettings {
    pub const LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error", "off"];
    pub const LOG_FORMATS: &'static [&'static str] = &["compact", "full"];
}
