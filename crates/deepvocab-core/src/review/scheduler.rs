//! Ebbinghaus review scheduler.
//!
//! A pure state machine over stages 0..=9. Each stage owns a fixed review
//! interval; reaching the last stage means the word is mastered.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ReviewOutcome, ReviewState, ReviewStatus, MASTERED_STAGE};

/// Review interval in minutes for stages 1..=9.
pub const INTERVALS_MINUTES: [i64; 9] = [5, 30, 720, 1440, 2880, 5760, 10080, 21600, 43200];

/// How far an explicitly mastered word is pushed out.
pub const MASTERED_HORIZON_DAYS: i64 = 365;

/// Computes review transitions. Holds no state and never touches storage.
#[derive(Debug, Clone)]
pub struct EbbinghausScheduler {
    intervals: [i64; 9],
}

impl EbbinghausScheduler {
    pub fn new() -> Self {
        Self {
            intervals: INTERVALS_MINUTES,
        }
    }

    /// Scheduler with a custom interval table (minutes per stage).
    pub fn with_intervals(intervals: [i64; 9]) -> Self {
        Self { intervals }
    }

    /// Interval after reaching `stage` (1..=9). Stage 0 uses the stage-1 interval.
    pub fn interval(&self, stage: u8) -> Duration {
        let idx = (stage.clamp(1, MASTERED_STAGE) - 1) as usize;
        Duration::minutes(self.intervals[idx])
    }

    /// Stage reached from `current` after `outcome`.
    ///
    /// Forgetting restarts at stage 1, not 0.
    pub fn next_stage(&self, current: u8, outcome: ReviewOutcome) -> u8 {
        match outcome {
            ReviewOutcome::Remembered => current.saturating_add(1).min(MASTERED_STAGE),
            ReviewOutcome::Forgotten => 1,
        }
    }

    /// Apply one review to `previous` (`None` for an unseen word).
    ///
    /// The review count always grows by one; `word` must already be
    /// normalized.
    pub fn review(
        &self,
        word: &str,
        previous: Option<&ReviewState>,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> ReviewState {
        let (stage, review_count) = previous
            .map(|p| (p.stage, p.review_count))
            .unwrap_or((0, 0));
        let next = self.next_stage(stage, outcome);

        ReviewState {
            word: word.to_string(),
            stage: next,
            last_review: now,
            next_review: now + self.interval(next),
            status: ReviewStatus::for_stage(next),
            review_count: review_count.saturating_add(1),
        }
    }

    /// Explicit override to the mastered state; resets the review count to 1.
    pub fn mastered(&self, word: &str, now: DateTime<Utc>) -> ReviewState {
        ReviewState {
            word: word.to_string(),
            stage: MASTERED_STAGE,
            last_review: now,
            next_review: now + Duration::days(MASTERED_HORIZON_DAYS),
            status: ReviewStatus::Mastered,
            review_count: 1,
        }
    }
}

impl Default for EbbinghausScheduler {
    fn default() -> Self {
        Self::new()
    }
}
