// src/dashboard.rs
//! Recruiter dashboard aggregation.
//!
//! The backend hands over raw listings and applications; every count and
//! trend shown on the dashboard tabs is derived client-side by the pure
//! functions below, so the numbers on screen always agree with the rows
//! they were computed from.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::types::job::{Application, ApplicationStatus, JobListing};

/// Weeks of history shown in the trend charts.
pub const TREND_WEEKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Overview,
    Jobs,
    Applicants,
}

impl DashboardTab {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "overview" => Some(DashboardTab::Overview),
            "jobs" => Some(DashboardTab::Jobs),
            "applicants" => Some(DashboardTab::Applicants),
            _ => None,
        }
    }
}

/// Per-status application totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub hired: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.shortlisted + self.rejected + self.hired
    }
}

pub fn status_counts(applications: &[Application]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for application in applications {
        match application.status {
            ApplicationStatus::Pending => counts.pending += 1,
            ApplicationStatus::Shortlisted => counts.shortlisted += 1,
            ApplicationStatus::Rejected => counts.rejected += 1,
            ApplicationStatus::Hired => counts.hired += 1,
        }
    }
    counts
}

/// Bucket items into trailing 7-day windows ending at `now`, oldest bucket
/// first. Items older than the window, or timestamped in the future, are
/// not counted.
pub fn weekly_trend<T>(
    items: &[T],
    weeks: usize,
    now: DateTime<Utc>,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<usize> {
    let mut buckets = vec![0usize; weeks];
    for item in items {
        let age_days = (now - timestamp(item)).num_days();
        if age_days < 0 {
            continue;
        }
        let weeks_back = (age_days / 7) as usize;
        if weeks_back < weeks {
            buckets[weeks - 1 - weeks_back] += 1;
        }
    }
    buckets
}

/// Listings ranked by applicant volume, busiest first. Listings with no
/// applications are included so slow postings are visible too.
pub fn top_jobs_by_applicants(
    jobs: &[JobListing],
    applications: &[Application],
    limit: usize,
) -> Vec<(String, usize)> {
    let mut per_job: HashMap<&str, usize> = HashMap::new();
    for application in applications {
        *per_job.entry(application.job_id.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = jobs
        .iter()
        .map(|job| {
            (
                job.title.clone(),
                per_job.get(job.id.as_str()).copied().unwrap_or(0),
            )
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Everything the dashboard tabs render, assembled in one pass.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub total_jobs: usize,
    pub total_applications: usize,
    pub status: StatusCounts,
    pub postings_trend: Vec<usize>,
    pub applications_trend: Vec<usize>,
    pub top_jobs: Vec<(String, usize)>,
}

impl DashboardData {
    pub fn assemble(
        jobs: &[JobListing],
        applications: &[Application],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            total_jobs: jobs.len(),
            total_applications: applications.len(),
            status: status_counts(applications),
            postings_trend: weekly_trend(jobs, TREND_WEEKS, now, |job| job.created_at),
            applications_trend: weekly_trend(applications, TREND_WEEKS, now, |application| {
                application.applied_at
            }),
            top_jobs: top_jobs_by_applicants(jobs, applications, 5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::{Applicant, CompanyRef};
    use chrono::Duration;

    fn job(id: &str, title: &str, days_ago: i64, now: DateTime<Utc>) -> JobListing {
        JobListing {
            id: id.to_string(),
            title: title.to_string(),
            company: CompanyRef {
                name: "Acme".to_string(),
                logo_url: None,
            },
            location: "Remote".to_string(),
            salary: String::new(),
            job_type: vec![],
            experience: String::new(),
            description: String::new(),
            created_at: now - Duration::days(days_ago),
        }
    }

    fn application(
        id: &str,
        job_id: &str,
        status: ApplicationStatus,
        days_ago: i64,
        now: DateTime<Utc>,
    ) -> Application {
        Application {
            id: id.to_string(),
            job_id: job_id.to_string(),
            applicant: Applicant {
                id: format!("user-{id}"),
                name: "Pat".to_string(),
                email: "pat@example.com".to_string(),
            },
            resume_url: None,
            status,
            applied_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_status_counts() {
        let now = Utc::now();
        let applications = vec![
            application("a", "j1", ApplicationStatus::Pending, 1, now),
            application("b", "j1", ApplicationStatus::Pending, 2, now),
            application("c", "j2", ApplicationStatus::Hired, 3, now),
        ];
        let counts = status_counts(&applications);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.hired, 1);
        assert_eq!(counts.rejected, 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_weekly_trend_buckets() {
        let now = Utc::now();
        let jobs = vec![
            job("a", "A", 0, now),  // this week
            job("b", "B", 6, now),  // this week
            job("c", "C", 8, now),  // last week
            job("d", "D", 70, now), // outside the window
        ];
        let trend = weekly_trend(&jobs, 4, now, |j| j.created_at);
        assert_eq!(trend, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_weekly_trend_skips_future_timestamps() {
        let now = Utc::now();
        let jobs = vec![job("a", "A", -3, now)];
        let trend = weekly_trend(&jobs, 4, now, |j| j.created_at);
        assert_eq!(trend, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_top_jobs_ranking() {
        let now = Utc::now();
        let jobs = vec![
            job("j1", "Backend", 1, now),
            job("j2", "Frontend", 1, now),
            job("j3", "Data", 1, now),
        ];
        let applications = vec![
            application("a", "j2", ApplicationStatus::Pending, 1, now),
            application("b", "j2", ApplicationStatus::Pending, 1, now),
            application("c", "j1", ApplicationStatus::Pending, 1, now),
        ];

        let ranked = top_jobs_by_applicants(&jobs, &applications, 2);
        assert_eq!(
            ranked,
            vec![("Frontend".to_string(), 2), ("Backend".to_string(), 1)]
        );
    }

    #[test]
    fn test_assemble() {
        let now = Utc::now();
        let jobs = vec![job("j1", "Backend", 2, now)];
        let applications = vec![
            application("a", "j1", ApplicationStatus::Shortlisted, 1, now),
            application("b", "j1", ApplicationStatus::Pending, 20, now),
        ];

        let data = DashboardData::assemble(&jobs, &applications, now);
        assert_eq!(data.total_jobs, 1);
        assert_eq!(data.total_applications, 2);
        assert_eq!(data.status.shortlisted, 1);
        assert_eq!(data.postings_trend.len(), TREND_WEEKS);
        assert_eq!(data.postings_trend[TREND_WEEKS - 1], 1);
        assert_eq!(data.applications_trend[TREND_WEEKS - 1], 1);
        assert_eq!(data.applications_trend[TREND_WEEKS - 3], 1);
        assert_eq!(data.top_jobs, vec![("Backend".to_string(), 2)]);
    }
}
