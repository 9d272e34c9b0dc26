// src/types/response.rs
//! Response envelopes returned by the backend services.

use serde::{Deserialize, Serialize};

use crate::types::job::{Application, Company, JobListing, User};

#[derive(Debug, Deserialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobListing>,
}

#[derive(Debug, Deserialize)]
pub struct JobResponse {
    pub job: JobListing,
}

#[derive(Debug, Deserialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyResponse {
    pub company: Company,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationsResponse {
    pub applications: Vec<Application>,
}

/// Generic success/message envelope used by mutation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OtpResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTokenResponse {
    pub success: bool,
    #[serde(default)]
    pub join_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}
