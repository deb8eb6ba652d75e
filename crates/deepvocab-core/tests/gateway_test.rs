//! End-to-end tests of the query gateway with a counting explainer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use deepvocab_core::api::{CheckCacheParams, CheckCacheReply, ReviewParams, VerbParams};
use deepvocab_core::config::ImageProvider;
use deepvocab_core::traits::StaticExplainerFactory;
use deepvocab_core::types::parse_word_list;
use deepvocab_core::{
    BundledData, ExplainParams, ExplainRequest, Explainer, ExplanationRecord, LegacyDataset,
    QueryGateway, QueryMode, ReviewOutcome, ReviewState, ReviewStatus, SettingsPatch, VerbsInput,
    VocabError, VocabResult, VocabStore,
};
use serde_json::json;

/// Explainer that counts calls and can be switched into failure mode.
#[derive(Default)]
struct CountingExplainer {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingExplainer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Explainer for CountingExplainer {
    async fn explain(&self, request: &ExplainRequest) -> VocabResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(VocabError::network("connection refused"));
        }
        Ok(format!("## {} (call {})", request.joined_words(), n))
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

fn bundled() -> BundledData {
    BundledData::new(
        LegacyDataset::from_json(json!({
            "run:verb": "to move quickly on foot",
            "Swim": {"content": "to move through water", "image_dicebear": "https://api.dicebear.com/9.x/icons/svg?seed=legacy"}
        })),
        parse_word_list(json!([
            {"word": "run", "definition": "跑", "pos": "verb", "frequency": 5, "sequence": 1},
            {"word": "May", "definition": "五月", "pos": "noun", "frequency": 300, "sequence": 2},
            {"word": "may", "definition": "可能", "pos": "modal", "frequency": 20, "sequence": 3},
            {"word": "abandon", "definition": "放弃", "pos": "verb", "frequency": 900, "sequence": 4}
        ])),
    )
}

fn gateway_with(explainer: Arc<CountingExplainer>, credential: bool) -> QueryGateway {
    let gateway = QueryGateway::builder()
        .bundled(bundled())
        .explainer_factory(Arc::new(StaticExplainerFactory::new(explainer)))
        .build();
    if credential {
        gateway
            .update_settings(SettingsPatch {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            })
            .unwrap();
    }
    gateway
}

#[tokio::test]
async fn test_single_mode_casing_shares_cache_entry() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), true);

    let first = gateway
        .explain(ExplainParams::new("Abandon", QueryMode::Single))
        .await
        .unwrap();
    let second = gateway
        .explain(ExplainParams::new("abandon", QueryMode::Single))
        .await
        .unwrap();

    assert_eq!(explainer.calls(), 1);
    assert_eq!(first.result, second.result);
    assert!(first.images.contains_key("Abandon"));
}

#[tokio::test]
async fn test_list_mode_order_and_casing_share_cache_entry() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), true);

    gateway
        .explain(ExplainParams::new(vec!["run", "fast"], QueryMode::List))
        .await
        .unwrap();
    gateway
        .explain(ExplainParams::new(vec!["Fast", "Run"], QueryMode::List))
        .await
        .unwrap();
    assert_eq!(explainer.calls(), 1);

    let reply = gateway
        .check_cache(CheckCacheParams {
            verbs: VerbsInput::from("Run, fast"),
            mode: Some(QueryMode::List),
        })
        .await
        .unwrap();
    assert_eq!(reply, CheckCacheReply::Single { cached: true });
}

#[tokio::test]
async fn test_legacy_entry_answers_without_explainer() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), true);

    let answer = gateway
        .explain(ExplainParams::new("RUN", QueryMode::Single))
        .await
        .unwrap();
    assert_eq!(answer.result, "to move quickly on foot");
    assert_eq!(explainer.calls(), 0);
}

#[tokio::test]
async fn test_refresh_failure_serves_stale_content() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), true);

    let fresh = gateway
        .explain(ExplainParams::new("abandon", QueryMode::Single))
        .await
        .unwrap();

    explainer.fail();
    let stale = gateway
        .explain(ExplainParams::new("abandon", QueryMode::Single).refresh())
        .await
        .unwrap();
    assert_eq!(stale.result, fresh.result);
    assert_eq!(explainer.calls(), 2);
}

#[tokio::test]
async fn test_failure_without_cache_falls_back_to_basic_definition() {
    let explainer = Arc::new(CountingExplainer::default());
    explainer.fail();
    let gateway = gateway_with(explainer.clone(), true);

    let answer = gateway
        .explain(ExplainParams::new("abandon", QueryMode::Single))
        .await
        .unwrap();
    assert!(answer.result.starts_with("### abandon (放弃)"));

    let err = gateway
        .explain(ExplainParams::new("xyz123notaword", QueryMode::Single))
        .await
        .unwrap_err();
    assert!(matches!(err, VocabError::Network { .. }));
}

#[tokio::test]
async fn test_no_credential_fallback_chain() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), false);

    let err = gateway
        .explain(ExplainParams::new("xyz123notaword", QueryMode::Single))
        .await
        .unwrap_err();
    assert!(matches!(err, VocabError::NoDefinitionAvailable { .. }));

    let answer = gateway
        .explain(ExplainParams::new("May", QueryMode::Single))
        .await
        .unwrap();
    assert!(answer.result.starts_with("### May (五月)"));
    assert!(answer.result.contains("- **词频**: 300"));
    assert_eq!(explainer.calls(), 0);

    // the synthesized definition is never cached
    let cached = gateway
        .check_cache(CheckCacheParams {
            verbs: VerbsInput::from("May"),
            mode: None,
        })
        .await
        .unwrap();
    assert_eq!(cached, CheckCacheReply::Single { cached: false });

    let list = gateway
        .explain(ExplainParams::new(vec!["run", "swim"], QueryMode::List))
        .await
        .unwrap_err();
    assert!(matches!(list, VocabError::NoDefinitionAvailable { .. }));
}

#[tokio::test]
async fn test_partial_single_mode_reports_missing_words() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer, false);

    let answer = gateway
        .explain(ExplainParams::new("run, xyz123notaword", QueryMode::Single))
        .await
        .unwrap();
    assert_eq!(answer.result, "to move quickly on foot");
    assert_eq!(answer.missing, vec!["xyz123notaword"]);
}

#[tokio::test]
async fn test_images_follow_provider_and_never_call_explainer() {
    let explainer = Arc::new(CountingExplainer::default());
    let gateway = gateway_with(explainer.clone(), true);

    let dicebear = gateway
        .explain(ExplainParams::new("swim", QueryMode::Single).only_images())
        .await
        .unwrap();
    assert!(dicebear.images["swim"].contains("seed=legacy"));

    gateway
        .update_settings(SettingsPatch {
            image_provider: Some(ImageProvider::Pollinations),
            ..Default::default()
        })
        .unwrap();
    let pollinations = gateway
        .explain(ExplainParams::new("swim", QueryMode::Single).only_images())
        .await
        .unwrap();
    assert!(pollinations.images["swim"].contains("pollinations.ai"));

    gateway
        .update_settings(SettingsPatch {
            image_provider: Some(ImageProvider::None),
            ..Default::default()
        })
        .unwrap();
    let none = gateway
        .explain(ExplainParams::new("swim", QueryMode::Single).only_images())
        .await
        .unwrap();
    assert!(none.images.is_empty());
    assert_eq!(explainer.calls(), 0);

    // image updates keep the cached content
    let store = gateway.ensure_ready().await.unwrap();
    let record: ExplanationRecord = store.get("single|swim").unwrap().unwrap();
    assert_eq!(record.content.as_deref(), Some("to move through water"));
    assert!(record.image_url.is_none());
}

#[tokio::test]
async fn test_reconciliation_never_overwrites_existing_entries() {
    let store = VocabStore::in_memory().unwrap();
    store
        .put(&ExplanationRecord::new(QueryMode::Single, "run", Some("X".to_string())))
        .unwrap();
    let gateway = QueryGateway::builder()
        .store(store.clone())
        .bundled(bundled())
        .build();

    gateway.ensure_ready().await.unwrap();
    let run: ExplanationRecord = store.get("single|run").unwrap().unwrap();
    assert_eq!(run.content.as_deref(), Some("X"));
    assert!(store.get::<ExplanationRecord>("single|swim").unwrap().is_some());

    let report = gateway.reconcile().await.unwrap();
    assert!(!report.wrote());
}

#[tokio::test]
async fn test_mastery_is_stored_under_normalized_key() {
    let gateway = QueryGateway::builder().bundled(bundled()).build();
    for _ in 0..3 {
        gateway
            .record_review(ReviewParams {
                verb: "swim".to_string(),
                result: ReviewOutcome::Remembered,
            })
            .await
            .unwrap();
    }

    let reply = gateway
        .mark_mastered(VerbParams {
            verb: Some("Swim".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(reply.new_stage, 9);

    let status = gateway.review_status().await.unwrap();
    let swim: &ReviewState = &status["swim"];
    assert_eq!(swim.status, ReviewStatus::Mastered);
    assert_eq!(swim.review_count, 1);
    assert!(gateway.due_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_word_list_served_in_sequence_order() {
    let gateway = QueryGateway::builder().bundled(bundled()).build();
    let page = gateway.list_words(Some(2)).await.unwrap();
    assert_eq!(page.total, 4);
    let words: Vec<&str> = page.items.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["run", "May"]);
}

#[tokio::test]
async fn test_concurrent_first_requests_reconcile_once() {
    let gateway = Arc::new(QueryGateway::builder().bundled(bundled()).build());

    let requests = (0..6).map(|_| {
        let gateway = Arc::clone(&gateway);
        async move { gateway.list_words(None).await.unwrap().total }
    });
    let totals = futures::future::join_all(requests).await;
    assert!(totals.iter().all(|&total| total == 4));

    let store = gateway.ensure_ready().await.unwrap();
    assert_eq!(store.count::<ExplanationRecord>().unwrap(), 2);
}
