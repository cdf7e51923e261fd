use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "followpack.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub service_url: String,
    pub session_identity: Option<String>,
    pub search_limit: usize,
    pub request_timeout_secs: u64,
    pub nip05_scheme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8787".into(),
            session_identity: None,
            search_limit: 20,
            request_timeout_secs: 10,
            nip05_scheme: "https".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Defaults, then `path` (when readable), then process environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!("ignoring unreadable settings file: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("service_url").and_then(toml::Value::as_str) {
        settings.service_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("session").and_then(toml::Value::as_str) {
        settings.session_identity = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("search_limit").and_then(toml::Value::as_integer) {
        if let Ok(limit) = usize::try_from(v) {
            settings.search_limit = limit;
        }
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(secs) = u64::try_from(v) {
            settings.request_timeout_secs = secs;
        }
    }
    if let Some(v) = file_cfg.get("nip05_scheme").and_then(toml::Value::as_str) {
        settings.nip05_scheme = v.to_string();
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("FOLLOWPACK_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = var("FOLLOWPACK_SESSION") {
        settings.session_identity = Some(v);
    }
    if let Some(v) = var("APP__SESSION") {
        settings.session_identity = Some(v);
    }

    if let Some(v) = var("APP__SEARCH_LIMIT") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.search_limit = parsed,
            Err(err) => warn!("ignoring unparsable APP__SEARCH_LIMIT '{v}': {err}"),
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => warn!("ignoring unparsable APP__REQUEST_TIMEOUT_SECS '{v}': {err}"),
        }
    }

    if let Some(v) = var("APP__NIP05_SCHEME") {
        settings.nip05_scheme = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
