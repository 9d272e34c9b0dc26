// src/cli.rs
//! The `jobport` command-line surface.
//!
//! One subcommand per user operation. Search and latest render the listing
//! pipeline the way the board sees it: a page of cards, the pagination
//! footer, and on fetch failure the captured message with an empty list.
//! Operations that require an account load the persisted session first.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::applications::{export_csv, ApplicationService};
use crate::board::JobBoard;
use crate::chat::{ChatClient, ChatRole, ChatWidget};
use crate::config::ClientConfig;
use crate::dashboard::{DashboardData, DashboardTab};
use crate::environment::EnvironmentConfig;
use crate::fetch::JobService;
use crate::join::{CompanyService, JoinError, JoinFlow};
use crate::query::{FilterKey, FilterValue, PageSize};
use crate::session::{Session, SessionStore, SignupRequest, UserService};
use crate::types::job::{Application, Company, JobDraft, JobListing, Role};
use crate::utils::{format_tags, posted_age, truncate};

#[derive(Parser)]
#[command(name = "jobport")]
#[command(about = "Job board client: search listings, manage postings and applications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search job listings
    Search {
        /// Free-text keyword
        #[arg(short, long, default_value = "")]
        keyword: String,
        /// Location filter
        #[arg(short, long, default_value = "")]
        location: String,
        /// Job type (Full-time, Part-time, Contract, Internship, Temporary)
        #[arg(long)]
        job_type: Option<String>,
        /// Time-posted bucket: 24h, week or month
        #[arg(long)]
        time_range: Option<String>,
        /// Experience level understood by the backend
        #[arg(long)]
        experience_level: Option<String>,
        /// Salary range understood by the backend
        #[arg(long)]
        salary_range: Option<String>,
        /// Remote positions only
        #[arg(long)]
        remote: bool,
        /// Entry-level positions only
        #[arg(long)]
        entry_level: bool,
        /// Required skill; repeat for several
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// Client-side bucket: Beginner, Intermediate or Advanced
        #[arg(long)]
        skill_level: Option<String>,
        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Listings per page (10, 20 or 50)
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Show the most recent listings
    Latest {
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Listing id to leave out
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Show one listing in full
    Show { id: String },
    /// Sign in and persist the session
    Login { email: String, password: String },
    /// Drop the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    Signup {
        name: String,
        email: String,
        password: String,
        /// candidate or recruiter
        #[arg(long, default_value = "candidate")]
        role: String,
    },
    /// Browse companies
    Companies {
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Join a company via emailed verification code
    JoinCompany { company_id: String, email: String },
    /// Post a new listing (recruiter)
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        salary: String,
        /// Job type tag; repeat for several
        #[arg(long = "job-type")]
        job_types: Vec<String>,
        #[arg(long, default_value = "")]
        experience: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Apply to a listing
    Apply {
        job_id: String,
        #[arg(long)]
        resume_url: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List applicants for one of your listings (recruiter)
    Applicants {
        job_id: String,
        /// Write the applicant list to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List your applications
    Applications,
    /// Recruiter dashboard
    Dashboard {
        /// overview, jobs or applicants
        #[arg(long, default_value = "overview")]
        tab: String,
    },
    /// Ask the assistant a question
    Chat { message: Vec<String> },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = EnvironmentConfig::load()?.into_client_config()?;
    let store = SessionStore::new(config.session_path());
    let session = store.load().await?;

    match cli.command {
        Command::Search {
            keyword,
            location,
            job_type,
            time_range,
            experience_level,
            salary_range,
            remote,
            entry_level,
            skills,
            skill_level,
            page,
            page_size,
        } => {
            let mut board = JobBoard::new();
            board.set_keyword(&keyword);
            board.set_location(&location);
            if let Some(value) = job_type {
                board.set_filter(FilterKey::JobType, FilterValue::Choice(value));
            }
            if let Some(value) = time_range {
                board.set_filter(FilterKey::TimeRange, FilterValue::Choice(value));
            }
            if let Some(value) = experience_level {
                board.set_filter(FilterKey::ExperienceLevel, FilterValue::Choice(value));
            }
            if let Some(value) = salary_range {
                board.set_filter(FilterKey::SalaryRange, FilterValue::Choice(value));
            }
            if remote {
                board.set_filter(FilterKey::Remote, FilterValue::Flag(true));
            }
            if entry_level {
                board.set_filter(FilterKey::EntryLevel, FilterValue::Flag(true));
            }
            for skill in skills {
                board.toggle_skill(&skill);
            }
            if let Some(value) = skill_level {
                board.set_filter(FilterKey::SkillLevel, FilterValue::Choice(value));
            }
            match PageSize::parse(page_size) {
                Some(size) => board.set_page_size(size),
                None => warn!(page_size, "ignoring page size outside the allowed set"),
            }
            board.set_page(page);

            let service = job_service(&config, session.as_ref())?;
            board.refresh(&service).await;
            render_board(&board);
        }

        Command::Latest { limit, exclude } => {
            let service = job_service(&config, session.as_ref())?;
            match service.latest(limit, exclude.as_deref()).await {
                Ok(listings) => {
                    if listings.is_empty() {
                        println!("No recent listings.");
                    }
                    for listing in &listings {
                        render_card(listing);
                    }
                }
                Err(e) => println!("Could not load listings: {e}"),
            }
        }

        Command::Show { id } => {
            let service = job_service(&config, session.as_ref())?;
            let listing = service.get(&id).await?;
            render_detail(&listing);
        }

        Command::Login { email, password } => {
            let users = UserService::new(config.user_api.clone(), config.timeout_seconds)?;
            let (token, user) = users.login(&email, &password).await?;

            let mut session = Session::new();
            let email = user.email.clone();
            session.login(token, user);
            store.save(&session).await?;
            println!("Signed in as {email}.");
        }

        Command::Logout => {
            if let Some(session) = &session {
                if let Some(token) = session.token() {
                    let users = UserService::with_token(
                        config.user_api.clone(),
                        config.timeout_seconds,
                        token,
                    )?;
                    if let Err(e) = users.logout().await {
                        warn!("Server-side logout failed: {e:#}");
                    }
                }
            }
            store.clear().await?;
            println!("Signed out.");
        }

        Command::Whoami => match &session {
            Some(session) => {
                let user = session.require_user()?;
                println!("{} ({:?})", user.email, user.role);
                if !user.profile.name.is_empty() {
                    println!("  {}", user.profile.name);
                }
                if !user.profile.skills.is_empty() {
                    println!("  skills: {}", user.profile.skills.join(", "));
                }
            }
            None => println!("Not signed in."),
        },

        Command::Signup {
            name,
            email,
            password,
            role,
        } => {
            let role = match role.to_lowercase().as_str() {
                "recruiter" => Role::Recruiter,
                "candidate" => Role::Candidate,
                other => {
                    warn!(role = %other, "unknown role, defaulting to candidate");
                    Role::Candidate
                }
            };
            let users = UserService::new(config.user_api.clone(), config.timeout_seconds)?;
            let request = SignupRequest {
                name,
                email,
                password,
                role,
            };
            let (token, user) = users.signup(&request).await?;

            let mut session = Session::new();
            let email = user.email.clone();
            session.login(token, user);
            store.save(&session).await?;
            println!("Account created. Signed in as {email}.");
        }

        Command::Companies { keyword } => {
            let companies = company_service(&config, session.as_ref())?;
            let results = match keyword.as_deref() {
                Some(keyword) => companies.search(keyword).await?,
                None => companies.list().await?,
            };
            if results.is_empty() {
                println!("No companies found.");
            }
            for company in &results {
                render_company(company);
            }
        }

        Command::JoinCompany { company_id, email } => {
            let signed_in = session.as_ref().context("Sign in before joining a company")?;
            signed_in.require_user()?;

            let companies = company_service(&config, session.as_ref())?;
            let mut flow = JoinFlow::new();
            flow.request_code(&companies, &company_id, &email).await?;
            println!("A 6-digit verification code was sent to {email}.");

            loop {
                let code = prompt("Code")?;
                match flow.verify(&companies, &code).await {
                    Ok(()) => break,
                    Err(e) if e.downcast_ref::<JoinError>() == Some(&JoinError::MalformedCode) => {
                        println!("{}", JoinError::MalformedCode.message());
                    }
                    Err(e) => return Err(e),
                }
            }

            let title = prompt("Your job title")?;
            flow.complete(&companies, &title).await?;
            println!("You have joined the company.");
        }

        Command::Post {
            title,
            location,
            salary,
            job_types,
            experience,
            description,
        } => {
            let session = session.context("Sign in before posting a listing")?;
            session.require_recruiter()?;

            let draft = JobDraft {
                title,
                location,
                salary,
                job_type: job_types,
                experience,
                description,
            };
            let service = job_service(&config, Some(&session))?;
            let listing = service.post(&draft).await?;
            println!("Posted listing {} ({}).", listing.id, listing.title);
        }

        Command::Apply {
            job_id,
            resume_url,
            note,
        } => {
            let session = session.context("Sign in before applying")?;
            session.require_user()?;

            let service = application_service(&config, Some(&session))?;
            let response = service
                .apply(&job_id, resume_url.as_deref(), note.as_deref())
                .await?;
            if response.success {
                println!("Application submitted.");
            } else {
                println!(
                    "Application rejected: {}",
                    response
                        .message
                        .unwrap_or_else(|| "no reason given".to_string())
                );
            }
        }

        Command::Applicants { job_id, export } => {
            let session = session.context("Sign in to view applicants")?;
            session.require_recruiter()?;

            let service = application_service(&config, Some(&session))?;
            let applications = service.for_job(&job_id).await?;

            if applications.is_empty() {
                println!("No applicants yet.");
            }
            for application in &applications {
                render_application(application);
            }

            if let Some(path) = export {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                export_csv(&applications, file)?;
                println!("Exported {} applicants to {}.", applications.len(), path.display());
            }
        }

        Command::Applications => {
            let session = session.context("Sign in to view your applications")?;
            session.require_user()?;

            let service = application_service(&config, Some(&session))?;
            let applications = service.mine().await?;
            if applications.is_empty() {
                println!("You have not applied to anything yet.");
            }
            for application in &applications {
                println!(
                    "{}  {}  ({})",
                    application.job_id,
                    application.status.as_str(),
                    posted_age(application.applied_at, Utc::now())
                );
            }
        }

        Command::Dashboard { tab } => {
            let session = session.context("Sign in to view the dashboard")?;
            session.require_recruiter()?;

            let tab = match DashboardTab::from_name(&tab) {
                Some(tab) => tab,
                None => {
                    warn!(tab = %tab, "unknown dashboard tab, showing overview");
                    DashboardTab::Overview
                }
            };

            let jobs = job_service(&config, Some(&session))?;
            let applications = application_service(&config, Some(&session))?;

            let my_jobs = jobs.mine().await?;
            let received = applications.received().await?;
            let data = DashboardData::assemble(&my_jobs, &received, Utc::now());
            render_dashboard(&data, tab);
        }

        Command::Chat { message } => {
            let client = chat_client(&config, session.as_ref())?;
            let mut widget = ChatWidget::new();
            widget.toggle();
            widget.send(&client, &message.join(" ")).await;

            for entry in widget.messages() {
                let speaker = match entry.role {
                    ChatRole::User => "you",
                    ChatRole::Assistant => "assistant",
                    ChatRole::System => "notice",
                };
                println!("[{speaker}] {}", entry.content);
            }
        }
    }

    Ok(())
}

fn token_of(session: Option<&Session>) -> Option<&str> {
    session.and_then(|s| s.token())
}

fn job_service(config: &ClientConfig, session: Option<&Session>) -> Result<JobService> {
    match token_of(session) {
        Some(token) => {
            JobService::with_token(config.job_api.clone(), config.timeout_seconds, token)
        }
        None => JobService::new(config.job_api.clone(), config.timeout_seconds),
    }
}

fn company_service(config: &ClientConfig, session: Option<&Session>) -> Result<CompanyService> {
    match token_of(session) {
        Some(token) => {
            CompanyService::with_token(config.company_api.clone(), config.timeout_seconds, token)
        }
        None => CompanyService::new(config.company_api.clone(), config.timeout_seconds),
    }
}

fn application_service(
    config: &ClientConfig,
    session: Option<&Session>,
) -> Result<ApplicationService> {
    match token_of(session) {
        Some(token) => ApplicationService::with_token(
            config.application_api.clone(),
            config.timeout_seconds,
            token,
        ),
        None => ApplicationService::new(config.application_api.clone(), config.timeout_seconds),
    }
}

fn chat_client(config: &ClientConfig, session: Option<&Session>) -> Result<ChatClient> {
    match token_of(session) {
        Some(token) => {
            ChatClient::with_token(config.chat_api.clone(), config.timeout_seconds, token)
        }
        None => ChatClient::new(config.chat_api.clone(), config.timeout_seconds),
    }
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    print!("{label}: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn render_board(board: &JobBoard) {
    if let Some(message) = board.error_message() {
        println!("Could not load listings: {message}");
        return;
    }

    let items = board.current_page_items();
    if items.is_empty() {
        println!("No listings matched your search.");
        return;
    }

    for listing in items {
        render_card(listing);
    }

    let pagination = board.pagination();
    let mut footer = format!(
        "page {} of {} ({} jobs)",
        pagination.current_page, pagination.total_pages, pagination.total_items
    );
    if board.has_prev() {
        footer.push_str("  [prev]");
    }
    if board.has_next() {
        footer.push_str("  [next]");
    }
    println!("{footer}");
}

fn render_card(listing: &JobListing) {
    println!("{}  —  {}", listing.title, listing.company.name);
    let salary = if listing.salary.is_empty() {
        "salary not listed"
    } else {
        listing.salary.as_str()
    };
    println!(
        "  {} | {} | {}",
        listing.location,
        salary,
        posted_age(listing.created_at, Utc::now())
    );
    if !listing.job_type.is_empty() {
        println!("  {}", format_tags(&listing.job_type));
    }
    if !listing.description.is_empty() {
        println!("  {}", truncate(&listing.description, 120));
    }
    println!("  id: {}", listing.id);
    println!();
}

fn render_detail(listing: &JobListing) {
    println!("{}", listing.title);
    println!("{}", listing.company.name);
    println!("{}", listing.location);
    if !listing.salary.is_empty() {
        println!("Salary: {}", listing.salary);
    }
    if !listing.job_type.is_empty() {
        println!("Type: {}", format_tags(&listing.job_type));
    }
    if !listing.experience.is_empty() {
        println!("Experience: {}", listing.experience);
    }
    println!("Posted: {}", posted_age(listing.created_at, Utc::now()));
    if !listing.description.is_empty() {
        println!("\n{}", listing.description);
    }
}

fn render_company(company: &Company) {
    println!("{}  (id: {})", company.name, company.id);
    if let Some(location) = &company.location {
        println!("  {location}");
    }
    if let Some(website) = &company.website {
        println!("  {website}");
    }
    if let Some(description) = &company.description {
        println!("  {}", truncate(description, 120));
    }
    println!();
}

fn render_application(application: &Application) {
    println!(
        "{}  {} <{}>  {}  ({})",
        application.id,
        application.applicant.name,
        application.applicant.email,
        application.status.as_str(),
        posted_age(application.applied_at, Utc::now())
    );
}

fn render_dashboard(data: &DashboardData, tab: DashboardTab) {
    match tab {
        DashboardTab::Overview => {
            println!("Listings:      {}", data.total_jobs);
            println!("Applications:  {}", data.total_applications);
            println!(
                "  pending {} | shortlisted {} | rejected {} | hired {}",
                data.status.pending,
                data.status.shortlisted,
                data.status.rejected,
                data.status.hired
            );
            println!("Postings/week:     {}", trend_line(&data.postings_trend));
            println!("Applications/week: {}", trend_line(&data.applications_trend));
        }
        DashboardTab::Jobs => {
            println!("Postings/week: {}", trend_line(&data.postings_trend));
            println!("Busiest listings:");
            for (title, count) in &data.top_jobs {
                println!("  {count:>4}  {title}");
            }
        }
        DashboardTab::Applicants => {
            println!("Applications/week: {}", trend_line(&data.applications_trend));
            println!(
                "pending {} | shortlisted {} | rejected {} | hired {}",
                data.status.pending,
                data.status.shortlisted,
                data.status.rejected,
                data.status.hired
            );
        }
    }
}

fn trend_line(buckets: &[usize]) -> String {
    buckets
        .iter()
        .map(|count| count.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
