//! Configuration file support

use anyhow::Context as _;
use karir_ai::{
    CompletionOptions, DEFAULT_CONTEXT_LIMIT, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TITLE, persona,
    providers::{get_api_key, openrouter::API_KEY_ENV},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for karir
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat-completions endpoint (OpenRouter or a credential-injecting proxy)
    pub endpoint: Option<String>,
    /// Model identifier
    pub model: Option<String>,
    /// API key (prefer the environment variable)
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// `HTTP-Referer` attribution header
    pub referer: Option<String>,
    /// `X-Title` attribution header
    pub title: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Prior messages forwarded per request
    pub context_limit: Option<usize>,
    /// Conversation storage file
    pub storage_path: Option<String>,
    /// Key the conversation is stored under
    pub storage_key: Option<String>,
    /// Custom persona file
    pub system_prompt_file: Option<String>,
    /// Whether to send a persona at all (true by default)
    pub persona: Option<bool>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("karir")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("KARIR_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`; missing or unreadable files give defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the example config to `path` unless a file is already there
    pub fn init_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, example_config())
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        Self::init_at(&path)?;
        Ok(path)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(API_KEY_ENV)
    }

    /// API key from config, then from the environment
    pub fn api_key(&self) -> Option<String> {
        get_api_key(self.api_key.as_deref(), self.api_key_env())
    }

    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path.as_deref().map(expand_home)
    }

    /// Persona text: disabled, read from `system_prompt_file`, or built in
    pub fn system_prompt(&self) -> anyhow::Result<Option<String>> {
        if self.persona == Some(false) {
            return Ok(None);
        }

        match self.system_prompt_file {
            Some(ref file) => {
                let path = expand_home(file);
                let prompt = fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read system prompt file {}", path.display())
                })?;
                Ok(Some(prompt.trim().to_string()))
            }
            None => Ok(Some(persona::CAREER_ASSISTANT.to_string())),
        }
    }

    pub fn completion_options(&self) -> anyhow::Result<CompletionOptions> {
        Ok(CompletionOptions {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: Some(self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            temperature: Some(self.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            context_limit: self.context_limit.unwrap_or(DEFAULT_CONTEXT_LIMIT),
            system_prompt: self.system_prompt()?,
        })
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# karir configuration file
# Place at ~/.config/karir/config.toml (Linux) or set KARIR_CONFIG_PATH

# Chat-completions endpoint. Point this at a server-side proxy to keep the
# API key off this machine; requests then go without an Authorization header.
endpoint = "https://openrouter.ai/api/v1/chat/completions"

# Model to use
model = "deepseek/deepseek-r1-0528-qwen3-8b:free"

# Sampling
max_tokens = 1000
temperature = 0.7

# How many prior messages are sent with each question
context_limit = 10

# OpenRouter attribution headers (optional)
# referer = "https://karirkita.example"
title = "KarirKita Career Assistant"

# API key (optional). Prefer the environment variable instead.
# api_key_env = "OPENROUTER_API_KEY"
# api_key = "sk-or-..."

# Conversation storage (defaults to the platform data directory)
# storage_path = "~/.local/share/karir/storage.json"
# storage_key = "karirkita_chat_history"

# Replace the built-in career-assistant persona, or disable it
# system_prompt_file = "~/.config/karir/persona.txt"
# persona = true
"#
}
