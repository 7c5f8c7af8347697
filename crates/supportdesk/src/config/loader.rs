use std::path::Path;

use crate::config::schema::{AppConfig, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AppConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let reply = &config.reply;
    if reply.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "reply.timeoutSecs must be greater than zero".to_string(),
        });
    }
    if !(0.0..=2.0).contains(&reply.temperature) {
        return Err(ConfigError::Validation {
            message: format!("reply.temperature out of range: {}", reply.temperature),
        });
    }
    if reply.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "reply.model must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ReplyProvider;
    use std::path::PathBuf;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.reply.provider, ReplyProvider::Auto);
        assert_eq!(config.reply.api_key_env_var.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(config.export.path, PathBuf::from("processed_emails.csv"));
    }

    #[test]
    fn test_full_config() {
        let config = load_config_from_str(
            r#"{
                "version": "1.0",
                "database": { "path": "/tmp/desk/emails.db" },
                "export": { "path": "out.csv" },
                "reply": {
                    "provider": "template",
                    "model": "gpt-4o",
                    "apiBase": "http://localhost:8080/v1",
                    "maxTokens": 300,
                    "temperature": 0.2,
                    "timeoutSecs": 5,
                    "apiKeyEnvVar": "DESK_KEY"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.database.resolved_path(),
            Some(PathBuf::from("/tmp/desk/emails.db"))
        );
        assert_eq!(config.reply.provider, ReplyProvider::Template);
        assert_eq!(config.reply.max_tokens, 300);
        assert_eq!(config.reply.timeout_secs, 5);
        assert_eq!(config.reply.api_key_env_var.as_deref(), Some("DESK_KEY"));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let err = load_config_from_str(r#"{"version": "2.0"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err =
            load_config_from_str(r#"{"version": "1.0", "reply": {"provider": "llama"}}"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = load_config_from_str(r#"{"version": "1.0", "keywords": ["x"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_config_from_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/supportdesk.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
