//! deepvocab-core - local-first vocabulary explanation cache.
//!
//! This crate provides the durable store, the reconciliation of bundled
//! reference data, the Ebbinghaus review scheduler and the [`QueryGateway`]
//! that answers every request of the vocabulary app.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deepvocab_core::{ExplainParams, NoExplainer, QueryGateway, QueryMode, VocabConfig};
//!
//! let config = VocabConfig::from_env();
//! let gateway = QueryGateway::open(&config, Arc::new(NoExplainer)).await?;
//!
//! let answer = gateway.explain(ExplainParams::new("run", QueryMode::Single)).await?;
//! println!("{}", answer.result);
//! ```

pub mod api;
pub mod bundled;
pub mod config;
pub mod error;
pub mod gateway;
pub mod images;
pub mod reconcile;
pub mod review;
pub mod store;
pub mod sync;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use api::{ExplainParams, ExplainResult, StatusReply, VerbsInput};
pub use bundled::BundledData;
pub use config::{PreferenceStore, Settings, SettingsPatch, VocabConfig};
pub use error::{VocabError, VocabResult};
pub use gateway::{QueryGateway, Snapshot};
pub use reconcile::{ReconcileReport, ReconciliationEngine};
pub use review::{EbbinghausScheduler, ReviewTracker};
pub use store::{StoreProvider, VocabStore};
pub use traits::{ExplainRequest, Explainer, ExplainerFactory, NoExplainer, RemoteSource};
pub use types::{
    CheckIn, DictionaryEntry, ExplanationRecord, LegacyDataset, QueryMode, ReviewOutcome,
    ReviewState, ReviewStatus,
};
