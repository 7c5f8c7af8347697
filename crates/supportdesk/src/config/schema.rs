use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::secrets::SecretSource;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub reply: ReplyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            database: DatabaseConfig::default(),
            export: ExportConfig::default(),
            reply: ReplyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Falls back to `~/.supportdesk/data/emails.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(crate::db::default_database_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from("processed_emails.csv")
}

/// Which reply generator to build at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyProvider {
    /// OpenAI when a credential resolves, otherwise the offline template.
    #[default]
    Auto,
    OpenAi,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyConfig {
    #[serde(default)]
    pub provider: ReplyProvider,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_key_file: Option<String>,

    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            provider: ReplyProvider::default(),
            model: default_model(),
            api_base: default_api_base(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
        }
    }
}

impl ReplyConfig {
    pub fn secret_source(&self) -> SecretSource<'_> {
        SecretSource {
            direct: self.api_key.as_deref(),
            file: self.api_key_file.as_deref(),
            env_var: self.api_key_env_var.as_deref(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.6
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_api_key_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}
