// src/applications.rs
//! Candidate applications and recruiter-side applicant management.

use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use crate::fetch::ApiClient;
use crate::types::job::{Application, ApplicationStatus};
use crate::types::response::{ApiMessage, ApplicationsResponse};

/// Client for the application endpoint.
pub struct ApplicationService {
    api: ApiClient,
}

impl ApplicationService {
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

    /// Submit an application to a listing.
    pub async fn apply(
        &self,
        job_id: &str,
        resume_url: Option<&str>,
        note: Option<&str>,
    ) -> Result<ApiMessage> {
        let payload = serde_json::json!({
            "jobId": job_id,
            "resumeUrl": resume_url,
            "note": note,
        });
        let response: ApiMessage = self.api.post_json("", &payload).await?;
        if response.success {
            info!("Applied to listing {}", job_id);
        }
        Ok(response)
    }

    /// The signed-in candidate's applications.
    pub async fn mine(&self) -> Result<Vec<Application>> {
        let body: ApplicationsResponse = self.api.get_json("/mine", &[]).await?;
        Ok(body.applications)
    }

    /// Applicants for one of the recruiter's listings.
    pub async fn for_job(&self, job_id: &str) -> Result<Vec<Application>> {
        let body: ApplicationsResponse =
            self.api.get_json(&format!("/job/{job_id}"), &[]).await?;
        Ok(body.applications)
    }

    /// Every application across the recruiter's listings, for the dashboard.
    pub async fn received(&self) -> Result<Vec<Application>> {
        let body: ApplicationsResponse = self.api.get_json("/received", &[]).await?;
        Ok(body.applications)
    }

    /// Move an application through the review pipeline.
    pub async fn set_status(&self, id: &str, status: ApplicationStatus) -> Result<ApiMessage> {
        let payload = serde_json::json!({ "status": status });
        self.api
            .put_json(&format!("/{id}/status"), &payload)
            .await
    }
}

/// Write an applicant list as CSV, one row per application.
pub fn export_csv<W: Write>(applications: &[Application], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["id", "name", "email", "status", "applied_at"])
        .context("Failed to write CSV header")?;

    for application in applications {
        csv_writer
            .write_record([
                application.id.as_str(),
                application.applicant.name.as_str(),
                application.applicant.email.as_str(),
                application.status.as_str(),
                &application.applied_at.to_rfc3339(),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", application.id))?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::Applicant;
    use chrono::{TimeZone, Utc};

    fn application(id: &str, name: &str, status: ApplicationStatus) -> Application {
        Application {
            id: id.to_string(),
            job_id: "job-1".to_string(),
            applicant: Applicant {
                id: format!("user-{id}"),
                name: name.to_string(),
                email: format!("{name}@example.com").to_lowercase(),
            },
            resume_url: None,
            status,
            applied_at: Utc.with_ymd_and_hms(2026, 7, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_export_csv() {
        let applications = vec![
            application("a-1", "Ada", ApplicationStatus::Shortlisted),
            application("a-2", "Grace", ApplicationStatus::Pending),
        ];

        let mut buffer = Vec::new();
        export_csv(&applications, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,name,email,status,applied_at");
        assert!(lines[1].starts_with("a-1,Ada,ada@example.com,shortlisted,"));
        assert!(lines[2].starts_with("a-2,Grace,grace@example.com,pending,"));
    }

    #[test]
    fn test_export_csv_empty_list_has_header_only() {
        let mut buffer = Vec::new();
        export_csv(&[], &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
