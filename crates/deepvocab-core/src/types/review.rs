//! Review progress, check-in and learn-batch records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Highest Ebbinghaus stage; reaching it means the word is mastered.
pub const MASTERED_STAGE: u8 = 9;

/// Learning status derived from the stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Learning,
    Mastered,
}

impl ReviewStatus {
    /// Status for a stage: mastered iff the stage reached [`MASTERED_STAGE`].
    pub fn for_stage(stage: u8) -> Self {
        if stage >= MASTERED_STAGE {
            ReviewStatus::Mastered
        } else {
            ReviewStatus::Learning
        }
    }
}

/// Outcome of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Remembered,
    Forgotten,
}

/// Review progress for one word, keyed by the lowercased word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Normalized word. Serialized as `verb` for backup compatibility.
    #[serde(rename = "verb", alias = "word")]
    pub word: String,
    pub stage: u8,
    pub last_review: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub status: ReviewStatus,
    #[serde(default)]
    pub review_count: u32,
}

impl ReviewState {
    /// Whether the word should be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status != ReviewStatus::Mastered && self.next_review <= now
    }
}

/// A day on which the user was active (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: String,
}

impl CheckIn {
    pub fn new(date: impl Into<String>) -> Self {
        Self { date: date.into() }
    }
}

/// Membership of a word in the user's "to learn" queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub verb: String,
}

impl BatchEntry {
    pub fn new(verb: impl Into<String>) -> Self {
        Self { verb: verb.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_for_stage() {
        assert_eq!(ReviewStatus::for_stage(0), ReviewStatus::Learning);
        assert_eq!(ReviewStatus::for_stage(8), ReviewStatus::Learning);
        assert_eq!(ReviewStatus::for_stage(9), ReviewStatus::Mastered);
    }

    #[test]
    fn test_outcome_parsing() {
        assert_eq!(
            "remembered".parse::<ReviewOutcome>().unwrap(),
            ReviewOutcome::Remembered
        );
        assert!("maybe".parse::<ReviewOutcome>().is_err());
    }

    #[test]
    fn test_is_due_skips_mastered() {
        let now = Utc::now();
        let mut state = ReviewState {
            word: "run".to_string(),
            stage: 3,
            last_review: now - Duration::days(1),
            next_review: now - Duration::minutes(1),
            status: ReviewStatus::Learning,
            review_count: 3,
        };
        assert!(state.is_due(now));

        state.status = ReviewStatus::Mastered;
        assert!(!state.is_due(now));
    }

    #[test]
    fn test_review_state_serializes_verb_field() {
        let now = Utc::now();
        let state = ReviewState {
            word: "run".to_string(),
            stage: 1,
            last_review: now,
            next_review: now,
            status: ReviewStatus::Learning,
            review_count: 1,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["verb"], "run");
        assert_eq!(json["status"], "learning");
    }
}
