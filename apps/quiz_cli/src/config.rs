use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::session::DEFAULT_TOTAL_QUESTIONS;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "quiz.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub total_questions: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".into(),
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    backend_url: Option<String>,
    total_questions: Option<usize>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = file_cfg.total_questions {
        settings.total_questions = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    Ok(())
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("QUIZ_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = lookup("QUIZ_TOTAL_QUESTIONS") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.total_questions = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric QUIZ_TOTAL_QUESTIONS"),
        }
    }

    if let Some(v) = lookup("QUIZ_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric QUIZ_REQUEST_TIMEOUT_SECS"),
        }
    }
}

/// Checks the final settings and normalizes the backend URL.
pub fn validate(mut settings: Settings) -> anyhow::Result<Settings> {
    if settings.total_questions == 0 {
        bail!("total_questions must be at least 1");
    }
    if settings.request_timeout_secs == Some(0) {
        bail!("request_timeout_secs must be greater than zero when set");
    }

    let raw_url = settings.backend_url.trim();
    let parsed =
        Url::parse(raw_url).with_context(|| format!("invalid backend url '{raw_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("backend url must use http or https, got '{}'", parsed.scheme());
    }
    settings.backend_url = raw_url.trim_end_matches('/').to_string();
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
