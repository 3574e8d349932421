use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;
use url::Url;

use crate::pagination::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub page_size: usize,
    pub token_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".into(),
            page_size: DEFAULT_PAGE_SIZE,
            token_path: default_token_path(),
        }
    }
}

impl ClientSettings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        Url::parse(self.api_base_url.trim())
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))
    }
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("resource-desk")
        .join("session.toml")
}

/// Defaults, then `client.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring malformed settings file");
        return;
    };
    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("page_size").and_then(toml::Value::as_integer) {
        if v > 0 {
            settings.page_size = v as usize;
        }
    }
    if let Some(v) = file_cfg.get("token_path").and_then(toml::Value::as_str) {
        settings.token_path = PathBuf::from(v);
    }
}

fn apply_env(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<usize>() {
            if parsed > 0 {
                settings.page_size = parsed;
            }
        }
    }

    if let Some(v) = var("APP__TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }
}
