//! Client library for a job-board REST backend.
//!
//! The core is the listing pipeline: [`query::QueryState`] holds the search
//! terms and filter selections, [`fetch::JobService`] pulls the matching
//! result set, [`refine`] applies the predicates the backend cannot
//! evaluate, and [`page`] slices the refined set into pages. [`board::JobBoard`]
//! ties the stages together for a view to render. Around the pipeline sit
//! the session context, the company-join flow, applications, the recruiter
//! dashboard and the assistant chat.

use anyhow::Result;

pub mod applications;
pub mod board;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod environment;
pub mod fetch;
pub mod join;
pub mod page;
pub mod query;
pub mod refine;
pub mod session;
pub mod types;
pub mod utils;

pub use board::{FetchStatus, JobBoard};
pub use config::ClientConfig;
pub use query::QueryState;
pub use types::job::JobListing;

/// Convenience wrapper: run one search round-trip and hand back the board
/// with the first page ready to render.
pub async fn search_jobs(config: &ClientConfig, query: QueryState) -> Result<JobBoard> {
    let service = fetch::JobService::new(config.job_api.clone(), config.timeout_seconds)?;
    let mut board = JobBoard::with_query(query);
    board.refresh(&service).await;
    Ok(board)
}
