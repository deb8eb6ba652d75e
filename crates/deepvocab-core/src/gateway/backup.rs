//! Export, import and clear-all.
//!
//! Export leaves out single-mode explanations that are unchanged from the
//! bundled legacy baseline. Import is destructive: every collection is
//! cleared before the snapshot is restored, and a failure part way leaves
//! the store cleared rather than half merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::QueryGateway;
use crate::api::{ClearAllParams, StatusReply};
use crate::config::Settings;
use crate::error::{VocabError, VocabResult};
use crate::types::{
    normalize_word, strip_whitespace, CheckIn, ExplanationRecord, QueryMode, ReviewState,
    ReviewStatus, MASTERED_STAGE,
};

/// Full backup of user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub explanations: Vec<ExplanationRecord>,
    pub progress: Vec<ReviewState>,
    pub checkins: Vec<CheckIn>,
    pub settings: Settings,
    pub excluded: Vec<String>,
}

/// A backup as read back in. Every section is optional and malformed items
/// are skipped one by one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotImport {
    pub explanations: Vec<serde_json::Value>,
    pub progress: Vec<serde_json::Value>,
    pub checkins: Vec<serde_json::Value>,
    pub settings: Option<Settings>,
    pub excluded: Option<Vec<String>>,
}

/// One progress item of an imported backup; missing fields get defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportedProgress {
    pub verb: Option<String>,
    pub stage: Option<u8>,
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: Option<u32>,
}

impl ImportedProgress {
    /// Review state under the normalized word; `None` without a word.
    pub fn into_state(self, now: DateTime<Utc>) -> Option<ReviewState> {
        let word = normalize_word(self.verb.as_deref().unwrap_or_default());
        if word.is_empty() {
            return None;
        }
        let stage = self.stage.unwrap_or(0).min(MASTERED_STAGE);
        Some(ReviewState {
            word,
            stage,
            last_review: self.last_review.unwrap_or(now),
            next_review: self.next_review.unwrap_or(now),
            status: ReviewStatus::for_stage(stage),
            review_count: self.review_count.unwrap_or(0),
        })
    }
}

/// Request body of an import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub data: Option<SnapshotImport>,
}

fn parse_items<T: serde::de::DeserializeOwned>(section: &str, items: Vec<serde_json::Value>) -> Vec<T> {
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if parsed.len() < total {
        warn!(section, skipped = total - parsed.len(), "Skipped malformed backup items");
    }
    parsed
}

fn parse_checkin(item: serde_json::Value) -> Option<CheckIn> {
    match item {
        serde_json::Value::String(date) => Some(CheckIn::new(date)),
        other => serde_json::from_value(other).ok(),
    }
    .filter(|c| !c.date.trim().is_empty())
}

impl QueryGateway {
    /// Snapshot of all user data.
    pub async fn export(&self) -> VocabResult<Snapshot> {
        let store = self.ensure_ready().await?;
        let baseline = self.bundled.legacy.normalized_contents();

        let mut explanations = store.all::<ExplanationRecord>()?;
        let total = explanations.len();
        explanations.retain(|record| {
            if record.mode != QueryMode::Single {
                return true;
            }
            match baseline.get(&normalize_word(&record.query_key)) {
                Some(legacy) => strip_whitespace(record.content.as_deref().unwrap_or_default()) != *legacy,
                None => true,
            }
        });

        let prefs = self.prefs.snapshot()?;
        let snapshot = Snapshot {
            progress: store.all::<ReviewState>()?,
            checkins: store.all::<CheckIn>()?,
            settings: prefs.settings,
            excluded: prefs.excluded.into_iter().collect(),
            explanations,
        };
        info!(
            explanations = snapshot.explanations.len(),
            baseline_skipped = total - snapshot.explanations.len(),
            progress = snapshot.progress.len(),
            "Exported snapshot"
        );
        Ok(snapshot)
    }

    /// Replace all user data with `params.data`.
    pub async fn import(&self, params: ImportParams) -> VocabResult<StatusReply> {
        let data = params
            .data
            .ok_or_else(|| VocabError::missing_field("data"))?;
        let store = self.provider.handle().await?;
        let now = Utc::now();

        let progress: Vec<ReviewState> = parse_items::<ImportedProgress>("progress", data.progress)
            .into_iter()
            .filter_map(|item| item.into_state(now))
            .collect();
        let explanations: Vec<ExplanationRecord> =
            parse_items::<ExplanationRecord>("explanations", data.explanations)
                .into_iter()
                .map(|mut record| {
                    record.query_key = record.mode.normalize(&record.query_key);
                    record
                })
                .filter(|record| !record.query_key.is_empty())
                .collect();
        let checkins: Vec<CheckIn> = data.checkins.into_iter().filter_map(parse_checkin).collect();

        store.clear_all()?;
        store.bulk_put(&progress)?;
        store.bulk_put(&explanations)?;
        store.bulk_put(&checkins)?;

        self.prefs.reset(false)?;
        if let Some(settings) = data.settings {
            self.prefs.replace_settings(settings)?;
        }
        if let Some(excluded) = data.excluded {
            self.prefs.replace_excluded(excluded)?;
        }
        self.rearm().await;

        info!(
            progress = progress.len(),
            explanations = explanations.len(),
            checkins = checkins.len(),
            "Imported snapshot"
        );
        Ok(StatusReply::success())
    }

    /// Clear every collection, the dictionary included.
    pub async fn clear_all(&self, params: ClearAllParams) -> VocabResult<StatusReply> {
        let store = self.provider.handle().await?;
        store.clear_all()?;
        self.prefs.reset(params.reset_settings)?;
        self.rearm().await;
        warn!(reset_settings = params.reset_settings, "Cleared all data");
        Ok(StatusReply::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundled::BundledData;
    use crate::types::{parse_word_list, LegacyDataset};
    use serde_json::json;

    fn gateway() -> QueryGateway {
        QueryGateway::builder()
            .bundled(BundledData::new(
                LegacyDataset::from_json(json!({"run:verb": "to move quickly on foot"})),
                parse_word_list(json!([{"word": "run"}])),
            ))
            .build()
    }

    #[test]
    fn test_imported_progress_defaults() {
        let now = Utc::now();
        let item: ImportedProgress = serde_json::from_value(json!({"verb": "Swim", "stage": 12})).unwrap();
        let state = item.into_state(now).unwrap();
        assert_eq!(state.word, "swim");
        assert_eq!(state.stage, MASTERED_STAGE);
        assert_eq!(state.status, ReviewStatus::Mastered);
        assert_eq!(state.review_count, 0);
        assert_eq!(state.next_review, now);

        assert!(ImportedProgress::default().into_state(now).is_none());
    }

    #[tokio::test]
    async fn test_export_skips_baseline_explanations() {
        let gateway = gateway();
        let store = gateway.ensure_ready().await.unwrap();
        store
            .put(&ExplanationRecord::new(
                QueryMode::Single,
                "swim",
                Some("to move through water".to_string()),
            ))
            .unwrap();

        let snapshot = gateway.export().await.unwrap();
        let keys: Vec<&str> = snapshot.explanations.iter().map(|r| r.query_key.as_str()).collect();
        assert_eq!(keys, vec!["swim"]);

        store
            .put(&ExplanationRecord::new(
                QueryMode::Single,
                "run",
                Some("to  move quickly\non foot".to_string()),
            ))
            .unwrap();
        assert_eq!(gateway.export().await.unwrap().explanations.len(), 1);

        store
            .put(&ExplanationRecord::new(QueryMode::Single, "run", Some("edited".to_string())))
            .unwrap();
        assert_eq!(gateway.export().await.unwrap().explanations.len(), 2);
    }

    #[tokio::test]
    async fn test_import_replaces_everything() {
        let gateway = gateway();
        let store = gateway.ensure_ready().await.unwrap();
        store.put(&CheckIn::new("2020-01-01")).unwrap();

        let data: SnapshotImport = serde_json::from_value(json!({
            "explanations": [
                {"mode": "single", "query_key": "Swim", "content": "to move through water"},
                {"bogus": true}
            ],
            "progress": [{"verb": "Swim", "stage": 2, "review_count": 3}, {"stage": 1}],
            "checkins": ["2024-05-01", {"date": "2024-05-02"}],
            "settings": {"image_provider": "none", "daily_goal": "15"},
            "excluded": ["Be"]
        }))
        .unwrap();

        let reply = gateway.import(ImportParams { data: Some(data) }).await.unwrap();
        assert!(reply.is_success());

        let store = gateway.ensure_ready().await.unwrap();
        assert!(store.get::<CheckIn>("2020-01-01").unwrap().is_none());
        assert_eq!(store.count::<CheckIn>().unwrap(), 2);
        assert_eq!(store.get::<ReviewState>("swim").unwrap().unwrap().review_count, 3);
        assert!(store.get::<ExplanationRecord>("single|swim").unwrap().is_some());
        // reconciliation ran again after the import
        assert!(store.get::<ExplanationRecord>("single|run").unwrap().is_some());

        let settings = gateway.settings().unwrap();
        assert_eq!(settings.daily_goal, 15);
        assert_eq!(gateway.excluded().unwrap(), vec!["be"]);
    }

    #[tokio::test]
    async fn test_import_without_data_is_rejected() {
        let err = gateway().import(ImportParams::default()).await.unwrap_err();
        assert!(matches!(err, VocabError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_clear_all_keeps_settings_unless_asked() {
        let gateway = gateway();
        gateway.ensure_ready().await.unwrap();
        gateway.set_excluded("be", true).unwrap();

        gateway.clear_all(ClearAllParams::default()).await.unwrap();
        assert_eq!(gateway.excluded().unwrap(), vec!["be"]);

        gateway
            .clear_all(ClearAllParams {
                reset_settings: true,
            })
            .await
            .unwrap();
        assert!(gateway.excluded().unwrap().is_empty());

        // the next request reimports the dictionary
        let store = gateway.ensure_ready().await.unwrap();
        assert_eq!(store.count::<crate::types::DictionaryEntry>().unwrap(), 1);
    }
}
