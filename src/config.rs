use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

use crate::error::ConfigurationError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PORT: u16 = 3000;

/// Raw settings as read from a config file or the environment.
///
/// Every value is optional here; [`Settings::validate`] decides whether the
/// process has enough to draft and send an email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub email_host: Option<String>,
    pub email_port: Option<String>,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub email_from: Option<String>,
    pub port: Option<u16>,
}

/// Validated configuration handed to the drafter and dispatcher.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl Settings {
    pub fn model(&self) -> String {
        present(self.gemini_model.as_ref()).map_or_else(|| DEFAULT_MODEL.to_string(), str::to_string)
    }

    pub fn listen_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Checks that every required key is set, naming all of the missing ones.
    pub fn validate(&self) -> Result<Config, ConfigurationError> {
        let required = [
            ("GEMINI_API_KEY", &self.gemini_api_key),
            ("EMAIL_HOST", &self.email_host),
            ("EMAIL_PORT", &self.email_port),
            ("EMAIL_USER", &self.email_user),
            ("EMAIL_PASS", &self.email_pass),
            ("EMAIL_FROM", &self.email_from),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| present(value.as_ref()).is_none())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(ConfigurationError::Missing(missing));
        }

        // All present past this point
        let get = |value: &Option<String>| present(value.as_ref()).unwrap_or_default().to_string();

        let raw_port = get(&self.email_port);
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigurationError::InvalidPort(raw_port.clone()))?;

        Ok(Config {
            gemini: GeminiConfig {
                api_key: get(&self.gemini_api_key),
                model: self.model(),
            },
            smtp: SmtpConfig {
                host: get(&self.email_host),
                port,
                username: get(&self.email_user),
                password: get(&self.email_pass),
                from: get(&self.email_from),
            },
        })
    }
}

fn load_from_env() -> Result<Settings, Box<dyn std::error::Error>> {
    envy::from_env::<Settings>().map_err(Into::into)
}

pub fn load_settings() -> Result<Settings, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("EMAIL_DRAFTER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        let contents = fs::read_to_string(&config_path)?;
        return serde_yaml::from_str(&contents).map_err(Into::into);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        let contents = fs::read_to_string("config.yaml")?;
        return serde_yaml::from_str(&contents).map_err(Into::into);
    }

    // Fallback to environment variables
    tracing::info!("No config file found, loading configuration from environment variables");
    load_from_env().map_err(|e| {
        format!("Failed to read configuration from environment variables: {e}").into()
    })
}
