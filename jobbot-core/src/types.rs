use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Telegram user id; also the chat id of the user's private chat.
pub type UserId = i64;

pub const PLACEHOLDER: &str = "N/A";
pub const SALARY_PLACEHOLDER: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub subscribed: bool,
    pub alert_keyword: Option<String>,
    pub alert_location: Option<String>,
    pub min_salary: u64,
    pub premium: bool,
    pub searches_today: u32,
    pub last_search_date: Option<NaiveDate>,
}

impl UserRecord {
    /// Defaults for a user seen for the first time.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            subscribed: false,
            alert_keyword: None,
            alert_location: None,
            min_salary: 0,
            premium: false,
            searches_today: 0,
            last_search_date: None,
        }
    }

    pub fn subscription(&self) -> Option<AlertSubscription> {
        if !self.subscribed {
            return None;
        }
        Some(AlertSubscription {
            user_id: self.user_id,
            keyword: self.alert_keyword.clone()?,
            location: self.alert_location.clone()?,
            min_salary: self.min_salary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSubscription {
    pub user_id: UserId,
    pub keyword: String,
    pub location: String,
    pub min_salary: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub link: String,
    pub description: Option<String>,
}

impl JobListing {
    pub fn has_salary(&self) -> bool {
        !self.salary.is_empty() && self.salary != SALARY_PLACEHOLDER
    }
}

/// Picks the provider value when present and non-blank, else the placeholder.
pub fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => placeholder.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    #[default]
    Any,
}

impl JobType {
    /// Lenient parse of model output; anything unrecognised is `Any`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "full-time" | "fulltime" => JobType::FullTime,
            "part-time" | "parttime" => JobType::PartTime,
            "internship" | "intern" => JobType::Internship,
            _ => JobType::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Internship => "internship",
            JobType::Any => "any",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_LOCATION: &str = "remote";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIntent {
    pub keywords: String,
    pub location: String,
    pub job_type: JobType,
}

impl SearchIntent {
    /// The intent used when extraction is unavailable or unusable: the raw
    /// query as keywords.
    pub fn literal(query: &str) -> Self {
        Self {
            keywords: query.trim().to_string(),
            location: DEFAULT_LOCATION.to_string(),
            job_type: JobType::Any,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    /// 0..=100, `None` when scoring was unavailable.
    pub score: Option<u8>,
    pub reason: String,
}

impl MatchScore {
    pub fn unavailable() -> Self {
        Self {
            score: None,
            reason: String::new(),
        }
    }

    pub fn display_score(&self) -> String {
        match self.score {
            Some(score) => score.to_string(),
            None => PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = UserRecord::new(42);
        assert!(!record.subscribed);
        assert!(!record.premium);
        assert_eq!(record.searches_today, 0);
        assert!(record.last_search_date.is_none());
        assert!(record.subscription().is_none());
    }

    #[test]
    fn test_subscription_requires_criteria() {
        let mut record = UserRecord::new(42);
        record.subscribed = true;
        assert!(record.subscription().is_none());

        record.alert_keyword = Some("rust".to_string());
        record.alert_location = Some("berlin".to_string());
        let sub = record.subscription().unwrap();
        assert_eq!(sub.keyword, "rust");
        assert_eq!(sub.location, "berlin");
    }

    #[test]
    fn test_job_type_parse() {
        assert_eq!(JobType::parse("Full-Time"), JobType::FullTime);
        assert_eq!(JobType::parse("part time"), JobType::PartTime);
        assert_eq!(JobType::parse("internship"), JobType::Internship);
        assert_eq!(JobType::parse("contract"), JobType::Any);
        assert_eq!(JobType::Internship.to_string(), "internship");
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(None, PLACEHOLDER), "N/A");
        assert_eq!(or_placeholder(Some("  ".to_string()), PLACEHOLDER), "N/A");
        assert_eq!(
            or_placeholder(Some(" Acme ".to_string()), PLACEHOLDER),
            "Acme"
        );
    }

    #[test]
    fn test_match_score_display() {
        assert_eq!(MatchScore::unavailable().display_score(), "N/A");
        let score = MatchScore {
            score: Some(87),
            reason: "good fit".to_string(),
        };
        assert_eq!(score.display_score(), "87");
    }
}
