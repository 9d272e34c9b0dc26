// src/utils.rs
use chrono::{DateTime, Utc};
use regex::Regex;

/// Extract a years-of-experience figure from the free-text experience field.
///
/// The backend is inconsistent here: the field may be a bare number ("3"),
/// a range ("3-5 years") or prose ("Senior, 7+ yrs"). The first integer in
/// the text wins; text with no digits yields `None` rather than a silent
/// zero, so prose like "fresher welcome" never buckets as numeric
/// experience.
pub fn parse_experience_years(text: &str) -> Option<u32> {
    let re = Regex::new(r"\d+").ok()?;
    re.find(text)?.as_str().parse().ok()
}

/// Human-readable age of a listing, newest bucket first: "today", "3d ago",
/// "2w ago", "5mo ago".
pub fn posted_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days();
    if days <= 0 {
        "today".to_string()
    } else if days < 7 {
        format!("{days}d ago")
    } else if days < 30 {
        format!("{}w ago", days / 7)
    } else {
        format!("{}mo ago", days / 30)
    }
}

/// Truncate text for a listing card, appending an ellipsis when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Render enum-like tags for a card: `[Full-time] [Remote]`.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("[{t}]"))
        .collect::<Vec<_>>()
        .join(" ")
}
