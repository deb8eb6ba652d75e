//! Review progress, check-ins and the learn batch.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, Utc};
use tracing::debug;

use super::QueryGateway;
use crate::api::{BatchParams, CheckInParams, ReviewParams, ReviewReply, StatusReply, VerbParams};
use crate::error::{VocabError, VocabResult};
use crate::types::{BatchEntry, CheckIn, ReviewState};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn required_verb(verb: Option<&str>) -> VocabResult<&str> {
    verb.map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| VocabError::missing_field("verb"))
}

/// Validated `YYYY-MM-DD` date, or today's local date when absent.
fn checkin_date(date: Option<&str>) -> VocabResult<String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .map_err(|_| VocabError::validation(format!("invalid date '{}', expected YYYY-MM-DD", date))),
        None => Ok(Local::now().format(DATE_FORMAT).to_string()),
    }
}

impl QueryGateway {
    /// Apply one review outcome and return the new schedule.
    pub async fn record_review(&self, params: ReviewParams) -> VocabResult<ReviewReply> {
        let word = required_verb(Some(&params.verb))?;
        let store = self.ensure_ready().await?;
        let state = self.reviews.record(&store, word, params.result, Utc::now())?;
        Ok(ReviewReply {
            status: "success".to_string(),
            new_stage: state.stage,
            review_status: state.status,
            next_review: Some(state.next_review),
        })
    }

    /// Force a word into the mastered state.
    pub async fn mark_mastered(&self, params: VerbParams) -> VocabResult<ReviewReply> {
        let word = required_verb(params.verb.as_deref())?;
        let store = self.ensure_ready().await?;
        let state = self.reviews.mark_mastered(&store, word, Utc::now())?;
        Ok(ReviewReply {
            status: "success".to_string(),
            new_stage: state.stage,
            review_status: state.status,
            next_review: None,
        })
    }

    /// Learning words due now, earliest first.
    pub async fn due_reviews(&self) -> VocabResult<Vec<ReviewState>> {
        let store = self.read_store().await?;
        self.reviews.due(&store, Utc::now())
    }

    pub async fn review_status(&self) -> VocabResult<BTreeMap<String, ReviewState>> {
        let store = self.read_store().await?;
        self.reviews.status_map(&store)
    }

    /// Forget all progress for one word.
    pub async fn reset_word(&self, params: VerbParams) -> VocabResult<StatusReply> {
        let word = required_verb(params.verb.as_deref())?;
        let store = self.ensure_ready().await?;
        let removed = self.reviews.reset(&store, word)?;
        debug!(word, removed, "Reset review progress");
        Ok(StatusReply::success())
    }

    /// Check-in dates, ascending.
    pub async fn checkins(&self) -> VocabResult<Vec<String>> {
        let store = self.read_store().await?;
        let mut dates: Vec<String> = store.all::<CheckIn>()?.into_iter().map(|c| c.date).collect();
        dates.sort();
        Ok(dates)
    }

    pub async fn add_checkin(&self, params: CheckInParams) -> VocabResult<StatusReply> {
        let date = checkin_date(params.date.as_deref())?;
        let store = self.ensure_ready().await?;
        store.put(&CheckIn::new(date))?;
        Ok(StatusReply::success())
    }

    pub async fn delete_checkin(&self, params: CheckInParams) -> VocabResult<StatusReply> {
        let date = params
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| VocabError::missing_field("date"))?;
        let store = self.ensure_ready().await?;
        store.delete::<CheckIn>(date)?;
        Ok(StatusReply::success())
    }

    /// Words queued for learning, sorted.
    pub async fn learn_batch(&self) -> VocabResult<Vec<String>> {
        let store = self.read_store().await?;
        let mut words: Vec<String> = store
            .all::<BatchEntry>()?
            .into_iter()
            .map(|e| e.verb)
            .collect();
        words.sort();
        Ok(words)
    }

    /// Add a word to the batch, or clear it when `clear` is set.
    pub async fn add_to_batch(&self, params: BatchParams) -> VocabResult<StatusReply> {
        let store = self.ensure_ready().await?;
        if params.clear {
            let removed = store.clear::<BatchEntry>()?;
            debug!(removed, "Cleared learn batch");
            return Ok(StatusReply::success());
        }
        let word = required_verb(params.verb.as_deref())?;
        store.put(&BatchEntry::new(word))?;
        Ok(StatusReply::success())
    }

    pub async fn remove_from_batch(&self, params: VerbParams) -> VocabResult<StatusReply> {
        let word = required_verb(params.verb.as_deref())?;
        let store = self.ensure_ready().await?;
        store.delete::<BatchEntry>(word)?;
        Ok(StatusReply::success())
    }
}
