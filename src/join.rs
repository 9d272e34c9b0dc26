// src/join.rs
//! Company browsing and the OTP-gated company-join flow.
//!
//! Joining a company is a strict multi-step sequence: request a one-time
//! code for an email address, verify the code to obtain a join token, then
//! complete the join with that token. Each step is only legal from its
//! predecessor's stage; out-of-order calls fail locally without touching
//! the network.

use anyhow::Result;
use std::fmt;
use tracing::{info, warn};

use crate::fetch::ApiClient;
use crate::types::job::Company;
use crate::types::response::{
    ApiMessage, CompaniesResponse, CompanyResponse, JoinTokenResponse, OtpResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    WrongStage,
    MalformedCode,
    Rejected,
}

impl JoinError {
    pub fn message(&self) -> &'static str {
        match self {
            JoinError::WrongStage => "Join step attempted out of order",
            JoinError::MalformedCode => "Verification code must be exactly 6 digits",
            JoinError::Rejected => "The server rejected the join request",
        }
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for JoinError {}

/// Client for the company endpoint.
pub struct CompanyService {
    api: ApiClient,
}

impl CompanyService {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout_seconds)?,
        })
    }

    pub fn with_token(base_url: String, timeout_seconds: u64, token: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::with_token(base_url, timeout_seconds, Some(token))?,
        })
    }

    pub async fn list(&self) -> Result<Vec<Company>> {
        let body: CompaniesResponse = self.api.get_json("/get", &[]).await?;
        Ok(body.companies)
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<Company>> {
        let params = [("keyword", keyword.to_string())];
        let body: CompaniesResponse = self.api.get_json("/get", &params).await?;
        Ok(body.companies)
    }

    pub async fn get(&self, id: &str) -> Result<Company> {
        let body: CompanyResponse = self.api.get_json(&format!("/{id}"), &[]).await?;
        Ok(body.company)
    }

    pub(crate) async fn request_code(&self, company_id: &str, email: &str) -> Result<OtpResponse> {
        let payload = serde_json::json!({ "companyId": company_id, "email": email });
        self.api.post_json("/join/request", &payload).await
    }

    pub(crate) async fn verify_code(
        &self,
        company_id: &str,
        email: &str,
        code: &str,
    ) -> Result<JoinTokenResponse> {
        let payload =
            serde_json::json!({ "companyId": company_id, "email": email, "otp": code });
        self.api.post_json("/join/verify", &payload).await
    }

    pub(crate) async fn complete_join(&self, join_token: &str, title: &str) -> Result<ApiMessage> {
        let payload = serde_json::json!({ "joinToken": join_token, "title": title });
        self.api.post_json("/join/complete", &payload).await
    }
}

/// Where the join flow currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinStage {
    Details,
    CodeSent { company_id: String, email: String },
    Verified { join_token: String },
    Joined,
}

/// A verification code is exactly six ASCII digits. Checked before any
/// request goes out; a malformed code never reaches the backend.
pub fn code_is_valid(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug)]
pub struct JoinFlow {
    stage: JoinStage,
}

impl Default for JoinFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinFlow {
    pub fn new() -> Self {
        Self {
            stage: JoinStage::Details,
        }
    }

    pub fn stage(&self) -> &JoinStage {
        &self.stage
    }

    /// Step 1: ask the backend to send a one-time code to `email`.
    pub async fn request_code(
        &mut self,
        service: &CompanyService,
        company_id: &str,
        email: &str,
    ) -> Result<()> {
        if !matches!(self.stage(), JoinStage::Details) {
            return Err(JoinError::WrongStage.into());
        }
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            anyhow::bail!("A valid email address is required to request a code");
        }

        let response = service.request_code(company_id, email).await?;
        if !response.success {
            warn!(
                "Join code request rejected: {}",
                response.message.as_deref().unwrap_or("no reason given")
            );
            return Err(JoinError::Rejected.into());
        }

        info!("Verification code sent to {}", email);
        self.stage = JoinStage::CodeSent {
            company_id: company_id.to_string(),
            email: email.to_string(),
        };
        Ok(())
    }

    /// Step 2: trade the emailed code for a join token.
    pub async fn verify(&mut self, service: &CompanyService, code: &str) -> Result<()> {
        let (company_id, email) = match self.stage() {
            JoinStage::CodeSent { company_id, email } => (company_id.clone(), email.clone()),
            _ => return Err(JoinError::WrongStage.into()),
        };

        let code = code.trim();
        if !code_is_valid(code) {
            warn!("Rejected malformed verification code");
            return Err(JoinError::MalformedCode.into());
        }

        let response = service.verify_code(&company_id, &email, code).await?;
        match response.join_token {
            Some(join_token) if response.success => {
                info!("Code verified for {}", email);
                self.stage = JoinStage::Verified { join_token };
                Ok(())
            }
            _ => {
                warn!(
                    "Code verification rejected: {}",
                    response.message.as_deref().unwrap_or("no reason given")
                );
                Err(JoinError::Rejected.into())
            }
        }
    }

    /// Step 3: finish the join with the verified token and a job title.
    pub async fn complete(&mut self, service: &CompanyService, title: &str) -> Result<()> {
        let join_token = match self.stage() {
            JoinStage::Verified { join_token } => join_token.clone(),
            _ => return Err(JoinError::WrongStage.into()),
        };

        let response = service.complete_join(&join_token, title).await?;
        if !response.success {
            return Err(JoinError::Rejected.into());
        }

        info!("Company join completed");
        self.stage = JoinStage::Joined;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> CompanyService {
        // Never receives a request in these tests; local gates fire first.
        CompanyService::new("http://localhost:9".to_string(), 1).unwrap()
    }

    #[test]
    fn test_code_validation() {
        assert!(code_is_valid("123456"));
        assert!(code_is_valid("000000"));
        assert!(!code_is_valid("12345"));
        assert!(!code_is_valid("1234567"));
        assert!(!code_is_valid("12a456"));
        assert!(!code_is_valid(""));
    }

    #[tokio::test]
    async fn test_verify_before_request_fails_locally() {
        let mut flow = JoinFlow::new();
        let err = flow
            .verify(&offline_service(), "123456")
            .await
            .unwrap_err();
        assert_eq!(err.downcast::<JoinError>().unwrap(), JoinError::WrongStage);
        assert_eq!(*flow.stage(), JoinStage::Details);
    }

    #[tokio::test]
    async fn test_complete_before_verify_fails_locally() {
        let mut flow = JoinFlow::new();
        let err = flow
            .complete(&offline_service(), "Engineering Manager")
            .await
            .unwrap_err();
        assert_eq!(err.downcast::<JoinError>().unwrap(), JoinError::WrongStage);
    }

    #[tokio::test]
    async fn test_malformed_code_rejected_without_network() {
        let mut flow = JoinFlow::new();
        flow.stage = JoinStage::CodeSent {
            company_id: "c-1".to_string(),
            email: "pat@example.com".to_string(),
        };

        let err = flow.verify(&offline_service(), "12x").await.unwrap_err();
        assert_eq!(
            err.downcast::<JoinError>().unwrap(),
            JoinError::MalformedCode
        );
        // The flow stays where it was so the user can retype the code.
        assert!(matches!(flow.stage(), JoinStage::CodeSent { .. }));
    }

    #[tokio::test]
    async fn test_blank_email_rejected_without_network() {
        let mut flow = JoinFlow::new();
        assert!(flow
            .request_code(&offline_service(), "c-1", "   ")
            .await
            .is_err());
        assert_eq!(*flow.stage(), JoinStage::Details);
    }
}
