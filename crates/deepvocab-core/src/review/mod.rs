//! Review progress tracking.
//!
//! [`EbbinghausScheduler`] computes transitions; [`ReviewTracker`] applies
//! them to the store under the normalized word key.

mod scheduler;

pub use scheduler::{EbbinghausScheduler, INTERVALS_MINUTES, MASTERED_HORIZON_DAYS};

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VocabError, VocabResult};
use crate::store::VocabStore;
use crate::types::{normalize_word, ReviewOutcome, ReviewState, ReviewStatus};

/// Progress counters for the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Words reviewed for the first time since local midnight.
    pub new_today: usize,
    /// Learning words whose review is due.
    pub due: usize,
}

/// Applies scheduler transitions to stored review state.
#[derive(Debug, Clone, Default)]
pub struct ReviewTracker {
    scheduler: EbbinghausScheduler,
}

impl ReviewTracker {
    pub fn new(scheduler: EbbinghausScheduler) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &EbbinghausScheduler {
        &self.scheduler
    }

    /// Record one review outcome for `word`.
    pub fn record(
        &self,
        store: &VocabStore,
        word: &str,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> VocabResult<ReviewState> {
        let key = normalized_key(word)?;
        let previous = match store.get::<ReviewState>(&key)? {
            Some(state) => Some(state),
            // Progress stored under a stray casing still counts.
            None if word.trim() != key => store.get::<ReviewState>(word.trim())?,
            None => None,
        };

        let next = self.scheduler.review(&key, previous.as_ref(), outcome, now);
        self.write(store, word, &next)?;
        debug!(word = %key, stage = next.stage, %outcome, "Recorded review");
        Ok(next)
    }

    /// Force `word` into the mastered state.
    pub fn mark_mastered(
        &self,
        store: &VocabStore,
        word: &str,
        now: DateTime<Utc>,
    ) -> VocabResult<ReviewState> {
        let key = normalized_key(word)?;
        let state = self.scheduler.mastered(&key, now);
        self.write(store, word, &state)?;
        debug!(word = %key, "Marked mastered");
        Ok(state)
    }

    /// Forget all progress for `word`. Returns whether anything was removed.
    pub fn reset(&self, store: &VocabStore, word: &str) -> VocabResult<bool> {
        let key = normalized_key(word)?;
        let mut removed = store.delete::<ReviewState>(&key)?;
        let raw = word.trim();
        if raw != key {
            removed |= store.delete::<ReviewState>(raw)?;
        }
        Ok(removed)
    }

    /// Learning words due at `now`, earliest first.
    pub fn due(&self, store: &VocabStore, now: DateTime<Utc>) -> VocabResult<Vec<ReviewState>> {
        let mut due = store.scan(|s: &ReviewState| s.is_due(now))?;
        due.sort_by(|a, b| a.next_review.cmp(&b.next_review));
        Ok(due)
    }

    /// Every tracked word with its state.
    pub fn status_map(&self, store: &VocabStore) -> VocabResult<BTreeMap<String, ReviewState>> {
        Ok(store
            .all::<ReviewState>()?
            .into_iter()
            .map(|s| (normalize_word(&s.word), s))
            .collect())
    }

    /// Counters for the daily goal; `since` is the start of the local day.
    pub fn daily_progress(
        &self,
        store: &VocabStore,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> VocabResult<DailyProgress> {
        let mut progress = DailyProgress {
            new_today: 0,
            due: 0,
        };
        for state in store.all::<ReviewState>()? {
            if state.review_count == 1 && state.last_review >= since {
                progress.new_today += 1;
            }
            if state.status == ReviewStatus::Learning && state.next_review <= now {
                progress.due += 1;
            }
        }
        Ok(progress)
    }

    fn write(&self, store: &VocabStore, raw: &str, state: &ReviewState) -> VocabResult<()> {
        let raw = raw.trim();
        if raw != state.word {
            store.delete::<ReviewState>(raw)?;
        }
        store.put(state)
    }
}

/// Start of the local calendar day containing `now`.
pub fn local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&Local);
    local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or(now)
}

fn normalized_key(word: &str) -> VocabResult<String> {
    let key = normalize_word(word);
    if key.is_empty() {
        return Err(VocabError::missing_field("verb"));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn setup() -> (VocabStore, ReviewTracker) {
        (VocabStore::in_memory().unwrap(), ReviewTracker::default())
    }

    #[test]
    fn test_record_normalizes_word() {
        let (store, tracker) = setup();
        let now = Utc::now();
        tracker.record(&store, "Run", ReviewOutcome::Remembered, now).unwrap();
        tracker.record(&store, "run", ReviewOutcome::Remembered, now).unwrap();

        let state: ReviewState = store.get("run").unwrap().unwrap();
        assert_eq!(state.stage, 2);
        assert_eq!(state.review_count, 2);
        assert_eq!(store.count::<ReviewState>().unwrap(), 1);
    }

    #[test]
    fn test_shadow_casing_is_absorbed_and_deleted() {
        let (store, tracker) = setup();
        let now = Utc::now();
        store
            .put(&ReviewState {
                word: "Christian".to_string(),
                stage: 4,
                last_review: now,
                next_review: now,
                status: ReviewStatus::Learning,
                review_count: 4,
            })
            .unwrap();

        let state = tracker
            .record(&store, "Christian", ReviewOutcome::Remembered, now)
            .unwrap();
        assert_eq!(state.word, "christian");
        assert_eq!(state.stage, 5);
        assert!(store.get::<ReviewState>("Christian").unwrap().is_none());
        assert_eq!(store.count::<ReviewState>().unwrap(), 1);
    }

    #[test]
    fn test_mark_mastered_is_stored_under_normalized_key() {
        let (store, tracker) = setup();
        let now = Utc::now();
        tracker.record(&store, "swim", ReviewOutcome::Remembered, now).unwrap();
        tracker.record(&store, "swim", ReviewOutcome::Remembered, now).unwrap();

        tracker.mark_mastered(&store, "Swim", now).unwrap();
        let state: ReviewState = store.get("swim").unwrap().unwrap();
        assert_eq!(state.stage, 9);
        assert_eq!(state.status, ReviewStatus::Mastered);
        assert_eq!(state.review_count, 1);
    }

    #[test]
    fn test_empty_word_rejected() {
        let (store, tracker) = setup();
        assert!(tracker
            .record(&store, "  ", ReviewOutcome::Remembered, Utc::now())
            .is_err());
    }

    #[test]
    fn test_due_and_reset() {
        let (store, tracker) = setup();
        let earlier = Utc::now() - Duration::hours(1);
        tracker.record(&store, "run", ReviewOutcome::Remembered, earlier).unwrap();
        tracker.mark_mastered(&store, "swim", earlier).unwrap();

        let due = tracker.due(&store, Utc::now()).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].word, "run");

        assert!(tracker.reset(&store, "RUN").unwrap());
        assert!(tracker.due(&store, Utc::now()).unwrap().is_empty());
        assert!(!tracker.reset(&store, "run").unwrap());
    }

    #[test]
    fn test_daily_progress() {
        let (store, tracker) = setup();
        let now = Utc::now();
        let since = now - Duration::hours(2);

        tracker.record(&store, "run", ReviewOutcome::Remembered, now - Duration::hours(1)).unwrap();
        tracker.record(&store, "old", ReviewOutcome::Remembered, now - Duration::days(2)).unwrap();
        tracker.record(&store, "again", ReviewOutcome::Remembered, now).unwrap();
        tracker.record(&store, "again", ReviewOutcome::Forgotten, now).unwrap();

        let progress = tracker.daily_progress(&store, now, since).unwrap();
        assert_eq!(progress.new_today, 1);
        assert_eq!(progress.due, 2);
    }

    #[test]
    fn test_status_map() {
        let (store, tracker) = setup();
        tracker.mark_mastered(&store, "Swim", Utc::now()).unwrap();
        let map = tracker.status_map(&store).unwrap();
        assert_eq!(map["swim"].status, ReviewStatus::Mastered);
    }

    #[test]
    fn test_local_midnight_is_not_after_now() {
        let now = Utc::now();
        let midnight = local_midnight(now);
        assert!(midnight <= now);
        assert!(now - midnight < Duration::hours(25));
    }
}
