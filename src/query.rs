// src/query.rs
//! Query state for the job-listing pipeline.
//!
//! Holds the free-text search terms, the discrete filter selections and the
//! pagination cursor. Every mutation that changes what the result set looks
//! like snaps the cursor back to page 1; only the backend-relevant subset of
//! the state is serialized into query-string parameters.

use tracing::warn;

/// Job-type values the backend accepts. Anything else is rejected
/// client-side: logged and ignored, never surfaced to the user.
pub const JOB_TYPE_OPTIONS: [&str; 5] = [
    "Full-time",
    "Part-time",
    "Contract",
    "Internship",
    "Temporary",
];

/// Time-posted buckets understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Past24Hours,
    PastWeek,
    PastMonth,
}

impl TimeRange {
    pub fn wire(&self) -> &'static str {
        match self {
            TimeRange::Past24Hours => "24h",
            TimeRange::PastWeek => "week",
            TimeRange::PastMonth => "month",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "24h" => Some(TimeRange::Past24Hours),
            "week" => Some(TimeRange::PastWeek),
            "month" => Some(TimeRange::PastMonth),
            _ => None,
        }
    }
}

/// Skill-level bucket inferred from a listing's experience field.
/// Client-side only; never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Beginner" => Some(SkillLevel::Beginner),
            "Intermediate" => Some(SkillLevel::Intermediate),
            "Advanced" => Some(SkillLevel::Advanced),
            _ => None,
        }
    }

    /// Bucket parsed years of experience: 0-2 beginner, 3-5 intermediate,
    /// 6 and up advanced.
    pub fn from_years(years: u32) -> Self {
        match years {
            0..=2 => SkillLevel::Beginner,
            3..=5 => SkillLevel::Intermediate,
            _ => SkillLevel::Advanced,
        }
    }
}

/// Allowed page sizes for the listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const OPTIONS: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn as_usize(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }

    pub fn parse(n: usize) -> Option<Self> {
        match n {
            10 => Some(PageSize::Ten),
            20 => Some(PageSize::Twenty),
            50 => Some(PageSize::Fifty),
            _ => None,
        }
    }
}

/// Keys of the discrete filter schema. Each key accepts exactly one
/// [`FilterValue`] kind, so setters can be checked exhaustively instead of
/// going through an untyped map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    JobType,
    TimeRange,
    ExperienceLevel,
    SalaryRange,
    Remote,
    EntryLevel,
    Skills,
    SkillLevel,
}

/// Tagged union of filter values: single choice, boolean toggle, or
/// multi-select list.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Choice(String),
    Flag(bool),
    Multi(Vec<String>),
}

/// The full search/filter/pagination state for one listing view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    keyword: String,
    location: String,
    job_type: Option<String>,
    time_range: Option<TimeRange>,
    experience_level: Option<String>,
    salary_range: Option<String>,
    remote: bool,
    entry_level: bool,
    skills: Vec<String>,
    skill_level: Option<SkillLevel>,
    page: usize,
    page_size: PageSize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            location: String::new(),
            job_type: None,
            time_range: None,
            experience_level: None,
            salary_range: None,
            remote: false,
            entry_level: false,
            skills: Vec::new(),
            skill_level: None,
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.keyword = keyword.trim().to_string();
        self.reset_page();
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = location.trim().to_string();
        self.reset_page();
    }

    /// Apply a discrete filter selection. Selecting the value that is
    /// already active toggles the filter off. A value of the wrong kind for
    /// the key, or a job type outside the allowed set, is logged and
    /// ignored.
    pub fn set_filter(&mut self, key: FilterKey, value: FilterValue) {
        match (key, value) {
            (FilterKey::JobType, FilterValue::Choice(v)) => {
                if !JOB_TYPE_OPTIONS.contains(&v.as_str()) {
                    warn!(value = %v, "ignoring job type outside the allowed set");
                    return;
                }
                toggle_choice(&mut self.job_type, v);
            }
            (FilterKey::TimeRange, FilterValue::Choice(v)) => match TimeRange::from_wire(&v) {
                Some(range) => {
                    if self.time_range == Some(range) {
                        self.time_range = None;
                    } else {
                        self.time_range = Some(range);
                    }
                }
                None => {
                    warn!(value = %v, "ignoring unknown time range");
                    return;
                }
            },
            (FilterKey::ExperienceLevel, FilterValue::Choice(v)) => {
                toggle_choice(&mut self.experience_level, v);
            }
            (FilterKey::SalaryRange, FilterValue::Choice(v)) => {
                toggle_choice(&mut self.salary_range, v);
            }
            (FilterKey::Remote, FilterValue::Flag(v)) => {
                self.remote = if self.remote == v { false } else { v };
            }
            (FilterKey::EntryLevel, FilterValue::Flag(v)) => {
                self.entry_level = if self.entry_level == v { false } else { v };
            }
            (FilterKey::Skills, FilterValue::Multi(v)) => {
                if self.skills == v {
                    self.skills.clear();
                } else {
                    self.skills = v;
                }
            }
            (FilterKey::SkillLevel, FilterValue::Choice(v)) => match SkillLevel::from_label(&v) {
                Some(level) => {
                    if self.skill_level == Some(level) {
                        self.skill_level = None;
                    } else {
                        self.skill_level = Some(level);
                    }
                }
                None => {
                    warn!(value = %v, "ignoring unknown skill level");
                    return;
                }
            },
            (key, value) => {
                warn!(?key, ?value, "filter value kind does not match key; ignored");
                return;
            }
        }
        self.reset_page();
    }

    /// Toggle one skill in the required-skills list.
    pub fn toggle_skill(&mut self, skill: &str) {
        let skill = skill.trim();
        if skill.is_empty() {
            return;
        }
        if let Some(pos) = self.skills.iter().position(|s| s == skill) {
            self.skills.remove(pos);
        } else {
            self.skills.push(skill.to_string());
        }
        self.reset_page();
    }

    /// Move the cursor. The only mutation that does not reset pagination.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Changing the page geometry restarts from the first page.
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.reset_page();
    }

    /// Reset every field to its default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn job_type(&self) -> Option<&str> {
        self.job_type.as_deref()
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn skill_level(&self) -> Option<SkillLevel> {
        self.skill_level
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Serialize the backend-relevant subset of the state as query-string
    /// pairs. Empty and unset fields are omitted; the skill-level filter is
    /// applied client-side and never sent.
    pub fn server_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.keyword.is_empty() {
            params.push(("keyword", self.keyword.clone()));
        }
        if !self.location.is_empty() {
            params.push(("location", self.location.clone()));
        }
        if let Some(job_type) = &self.job_type {
            params.push(("jobType", job_type.clone()));
        }
        if let Some(range) = self.time_range {
            params.push(("timeRange", range.wire().to_string()));
        }
        if let Some(level) = &self.experience_level {
            params.push(("experienceLevel", level.clone()));
        }
        if let Some(range) = &self.salary_range {
            params.push(("salaryRange", range.clone()));
        }
        if self.remote {
            params.push(("remote", "true".to_string()));
        }
        if self.entry_level {
            params.push(("entryLevel", "true".to_string()));
        }
        if !self.skills.is_empty() {
            params.push(("skills", self.skills.join(",")));
        }
        params
    }

    /// Stable key over the backend-relevant fields. Two states with the same
    /// fingerprint fetch the same result set, so only a fingerprint change
    /// warrants a new request.
    pub fn server_fingerprint(&self) -> String {
        self.server_params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn toggle_choice(slot: &mut Option<String>, value: String) {
    if slot.as_deref() == Some(value.as_str()) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_reset_page() {
        let mut query = QueryState::new();
        query.set_page(4);
        query.set_keyword("engineer");
        assert_eq!(query.page(), 1);

        query.set_page(4);
        query.set_filter(FilterKey::Remote, FilterValue::Flag(true));
        assert_eq!(query.page(), 1);

        query.set_page(4);
        query.toggle_skill("Rust");
        assert_eq!(query.page(), 1);

        query.set_page(4);
        query.set_page_size(PageSize::Twenty);
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_set_page_keeps_other_state() {
        let mut query = QueryState::new();
        query.set_keyword("engineer");
        query.set_page(3);
        assert_eq!(query.page(), 3);
        assert_eq!(query.keyword(), "engineer");
        query.set_page(0);
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_choice_filter_toggles_off_on_repeat() {
        let mut query = QueryState::new();
        query.set_filter(
            FilterKey::JobType,
            FilterValue::Choice("Contract".to_string()),
        );
        assert_eq!(query.job_type(), Some("Contract"));

        query.set_filter(
            FilterKey::JobType,
            FilterValue::Choice("Contract".to_string()),
        );
        assert_eq!(query.job_type(), None);
    }

    #[test]
    fn test_invalid_job_type_is_ignored() {
        let mut query = QueryState::new();
        query.set_page(2);
        query.set_filter(
            FilterKey::JobType,
            FilterValue::Choice("Freelance-ish".to_string()),
        );
        assert_eq!(query.job_type(), None);
        // Rejected values must not disturb pagination either.
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_kind_mismatch_is_ignored() {
        let mut query = QueryState::new();
        query.set_filter(FilterKey::Remote, FilterValue::Choice("yes".to_string()));
        assert!(query.server_params().is_empty());
    }

    #[test]
    fn test_skill_toggle_round_trip() {
        let mut query = QueryState::new();
        query.toggle_skill("JavaScript");
        assert_eq!(query.skills(), ["JavaScript".to_string()]);
        query.toggle_skill("JavaScript");
        assert!(query.skills().is_empty());
    }

    #[test]
    fn test_flag_toggles_off_on_repeat() {
        let mut query = QueryState::new();
        query.set_filter(FilterKey::Remote, FilterValue::Flag(true));
        let params = query.server_params();
        assert!(params.contains(&("remote", "true".to_string())));
        query.set_filter(FilterKey::Remote, FilterValue::Flag(true));
        assert!(query.server_params().is_empty());
    }

    #[test]
    fn test_server_params_omit_empty_fields() {
        let mut query = QueryState::new();
        query.set_keyword("engineer");
        query.set_location("");
        let params = query.server_params();
        assert_eq!(params, vec![("keyword", "engineer".to_string())]);
    }

    #[test]
    fn test_server_params_join_skills() {
        let mut query = QueryState::new();
        query.toggle_skill("Rust");
        query.toggle_skill("SQL");
        let params = query.server_params();
        assert_eq!(params, vec![("skills", "Rust,SQL".to_string())]);
    }

    #[test]
    fn test_skill_level_not_in_server_params() {
        let mut query = QueryState::new();
        query.set_filter(
            FilterKey::SkillLevel,
            FilterValue::Choice("Advanced".to_string()),
        );
        assert_eq!(query.skill_level(), Some(SkillLevel::Advanced));
        assert!(query.server_params().is_empty());
        assert_eq!(query.server_fingerprint(), "");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut query = QueryState::new();
        query.set_keyword("engineer");
        query.toggle_skill("Rust");
        query.set_filter(FilterKey::EntryLevel, FilterValue::Flag(true));
        query.set_page(7);
        query.clear();
        assert_eq!(query, QueryState::default());
    }

    #[test]
    fn test_skill_level_bucketing() {
        assert_eq!(SkillLevel::from_years(0), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_years(2), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_years(3), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_years(5), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_years(6), SkillLevel::Advanced);
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!(PageSize::parse(10), Some(PageSize::Ten));
        assert_eq!(PageSize::parse(50), Some(PageSize::Fifty));
        assert_eq!(PageSize::parse(25), None);
    }
}
