use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Age reported for timestamps we can't read, so they sort last
pub const UNKNOWN_AGE_DAYS: i64 = 9999;

/// Color class attached to a freshness badge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FreshnessClass {
    /// Updated today or yesterday
    #[serde(rename = "fresh-today")]
    Today,
    /// 2-7 days
    #[serde(rename = "fresh-week")]
    Week,
    /// 8-30 days
    #[serde(rename = "fresh-month")]
    Month,
    /// 31-90 days
    #[serde(rename = "fresh-quarter")]
    Quarter,
    /// Older than 90 days
    #[serde(rename = "fresh-old")]
    Old,
    #[serde(rename = "fresh-unknown")]
    Unknown,
}

impl FreshnessClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            FreshnessClass::Today => "fresh-today",
            FreshnessClass::Week => "fresh-week",
            FreshnessClass::Month => "fresh-month",
            FreshnessClass::Quarter => "fresh-quarter",
            FreshnessClass::Old => "fresh-old",
            FreshnessClass::Unknown => "fresh-unknown",
        }
    }
}

/// How recently a repository was updated, bucketed for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Freshness {
    /// Human-readable age, e.g. "3 days ago"
    pub freshness: String,
    pub badge: String,
    pub color: FreshnessClass,
    pub days_old: i64,
}

impl Freshness {
    /// Classify an ISO-8601 timestamp relative to `now`.
    ///
    /// Never fails: anything unparseable becomes the unknown bucket.
    pub fn classify(updated_at: &str, now: DateTime<Utc>) -> Self {
        match parse_timestamp(updated_at) {
            Some(updated) => Self::from_age_days((now - updated).num_days()),
            None => Self::unknown(),
        }
    }

    /// Same as `classify`, treating a missing timestamp as unknown
    pub fn classify_opt(updated_at: Option<&str>, now: DateTime<Utc>) -> Self {
        updated_at
            .map(|ts| Self::classify(ts, now))
            .unwrap_or_else(Self::unknown)
    }

    /// Bucket an age in whole days. Negative ages (clock skew) count as today.
    pub fn from_age_days(days: i64) -> Self {
        let days = days.max(0);

        match days {
            0 => Self::bucket("today", "🔥 Today".to_string(), FreshnessClass::Today, days),
            1 => Self::bucket(
                "yesterday",
                "🔥 Yesterday".to_string(),
                FreshnessClass::Today,
                days,
            ),
            2..=7 => Self::bucket(
                format!("{} days ago", days),
                format!("✅ {}d ago", days),
                FreshnessClass::Week,
                days,
            ),
            8..=30 => Self::bucket(
                format!("{} days ago", days),
                format!("📅 {}d ago", days),
                FreshnessClass::Month,
                days,
            ),
            31..=90 => {
                let months = days / 30;
                let plural = if months > 1 { "s" } else { "" };
                Self::bucket(
                    format!("{} month{} ago", months, plural),
                    format!("📅 {}mo ago", months),
                    FreshnessClass::Quarter,
                    days,
                )
            }
            _ => {
                let months = days / 30;
                Self::bucket(
                    format!("{} months ago", months),
                    format!("⚠️ {}mo ago", months),
                    FreshnessClass::Old,
                    days,
                )
            }
        }
    }

    pub fn unknown() -> Self {
        Self::bucket(
            "unknown",
            "❓ Unknown".to_string(),
            FreshnessClass::Unknown,
            UNKNOWN_AGE_DAYS,
        )
    }

    fn bucket(freshness: impl Into<String>, badge: String, color: FreshnessClass, days_old: i64) -> Self {
        Self {
            freshness: freshness.into(),
            badge,
            color,
            days_old,
        }
    }
}

/// Parse RFC 3339 (what GitHub sends) or a naive ISO-8601 date-time as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
