// src/config.rs
use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

/// Runtime configuration for the client: one base URL per backend service
/// plus the local state directory for the persisted session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub job_api: String,
    pub company_api: String,
    pub application_api: String,
    pub user_api: String,
    pub chat_api: String,
    pub state_dir: PathBuf,
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            job_api: format!("{base}/api/jobs"),
            company_api: format!("{base}/api/companies"),
            application_api: format!("{base}/api/applications"),
            user_api: format!("{base}/api/users"),
            chat_api: format!("{base}/api/chat"),
            state_dir: default_state_dir(),
            timeout_seconds: 30,
        }
    }

    pub fn with_job_api(mut self, url: String) -> Self {
        self.job_api = url;
        self
    }

    pub fn with_company_api(mut self, url: String) -> Self {
        self.company_api = url;
        self
    }

    pub fn with_application_api(mut self, url: String) -> Self {
        self.application_api = url;
        self
    }

    pub fn with_user_api(mut self, url: String) -> Self {
        self.user_api = url;
        self
    }

    pub fn with_chat_api(mut self, url: String) -> Self {
        self.chat_api = url;
        self
    }

    pub fn with_state_dir(mut self, dir: PathBuf) -> Self {
        self.state_dir = dir;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Check every base URL parses and strip trailing slashes so endpoint
    /// paths can be appended verbatim.
    pub fn validated(mut self) -> Result<Self> {
        for (name, url) in [
            ("job_api", &mut self.job_api),
            ("company_api", &mut self.company_api),
            ("application_api", &mut self.application_api),
            ("user_api", &mut self.user_api),
            ("chat_api", &mut self.chat_api),
        ] {
            Url::parse(url).with_context(|| format!("Invalid {name} base URL: {url}"))?;
            *url = url.trim_end_matches('/').to_string();
        }
        Ok(self)
    }

    /// Location of the persisted session file.
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

pub(crate) fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jobport")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_service_urls() {
        let config = ClientConfig::new("http://localhost:5000/");
        assert_eq!(config.job_api, "http://localhost:5000/api/jobs");
        assert_eq!(config.user_api, "http://localhost:5000/api/users");
    }

    #[test]
    fn test_validated_strips_trailing_slash() {
        let config = ClientConfig::new("http://localhost:5000")
            .with_job_api("http://localhost:6000/api/jobs/".to_string())
            .validated()
            .unwrap();
        assert_eq!(config.job_api, "http://localhost:6000/api/jobs");
    }

    #[test]
    fn test_validated_rejects_garbage() {
        let config =
            ClientConfig::new("http://localhost:5000").with_chat_api("not a url".to_string());
        assert!(config.validated().is_err());
    }
}
