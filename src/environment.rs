// src/environment.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::config::{default_state_dir, ClientConfig};

/// One environment's worth of service endpoints, as declared in
/// `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub job_api: String,
    pub company_api: String,
    pub application_api: String,
    pub user_api: String,
    pub chat_api: String,
    #[serde(default = "serde_default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

fn serde_default_state_dir() -> PathBuf {
    default_state_dir()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl EnvironmentConfig {
    /// Load configuration for the active environment.
    ///
    /// `config.yaml` in the working directory wins when present; otherwise
    /// the local-development defaults apply. Individual service URLs can be
    /// overridden through `*_API_URL` environment variables either way.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = match Self::load_from_file(&environment)? {
            Some(config) => config,
            None => Self::defaults(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBPORT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(environment: &str) -> Result<Option<Self>> {
        let config_path = PathBuf::from("config.yaml");
        if !config_path.exists() {
            return Ok(None);
        }

        let config_content =
            std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;

        let config_file: ConfigFile =
            serde_yaml::from_str(&config_content).context("Failed to parse config.yaml")?;

        let env_config = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(Some(env_config))
    }

    fn defaults() -> Self {
        let base = "http://localhost:5000";
        Self {
            job_api: format!("{base}/api/jobs"),
            company_api: format!("{base}/api/companies"),
            application_api: format!("{base}/api/applications"),
            user_api: format!("{base}/api/users"),
            chat_api: format!("{base}/api/chat"),
            state_dir: default_state_dir(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    fn apply_env_overrides(&mut self) {
        let overrides = [
            ("JOB_API_URL", &mut self.job_api),
            ("COMPANY_API_URL", &mut self.company_api),
            ("APPLICATION_API_URL", &mut self.application_api),
            ("USER_API_URL", &mut self.user_api),
            ("CHAT_API_URL", &mut self.chat_api),
        ];
        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *slot = value;
                }
            }
        }
    }

    /// Turn the loaded environment into a validated runtime config.
    pub fn into_client_config(self) -> Result<ClientConfig> {
        ClientConfig {
            job_api: self.job_api,
            company_api: self.company_api,
            application_api: self.application_api,
            user_api: self.user_api,
            chat_api: self.chat_api,
            state_dir: self.state_dir,
            timeout_seconds: self.timeout_seconds,
        }
        .validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = EnvironmentConfig::defaults().into_client_config().unwrap();
        assert_eq!(config.job_api, "http://localhost:5000/api/jobs");
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_config_file_parses() {
        let yaml = r#"
local:
  job_api: http://localhost:5000/api/jobs
  company_api: http://localhost:5000/api/companies
  application_api: http://localhost:5000/api/applications
  user_api: http://localhost:5000/api/users
  chat_api: http://localhost:5001/api/chat
production:
  job_api: https://api.example.com/api/jobs
  company_api: https://api.example.com/api/companies
  application_api: https://api.example.com/api/applications
  user_api: https://api.example.com/api/users
  chat_api: https://chat.example.com/api/chat
  timeout_seconds: 10
"#;
        let parsed: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.local.chat_api, "http://localhost:5001/api/chat");
        assert_eq!(parsed.production.timeout_seconds, 10);
        assert_eq!(parsed.local.timeout_seconds, 30);
    }
}
