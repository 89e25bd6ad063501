mod store;


pub use store::{MemorySummaryStore, SqliteSummaryStore, API_KEY_STORAGE_KEY, STORAGE_KEY};

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

/// Log size at which compaction kicks in
pub const COMPACT_THRESHOLD: usize = 6;

/// Number of oldest entries merged by one compaction
pub const COMPACT_BATCH_SIZE: usize = 4;

/// One entry of the summary log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub summary: String,
    pub model: String,
    pub source_range: String,
    pub topic_tags: Vec<String>,
    /// Compaction generation, 1 for entries written by hand
    pub tier: u32,
    pub tier_label: String,
    /// Ids of this entry and every entry merged into it
    pub lineage: Vec<String>,
}

/// User input for a new summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDraft {
    pub summary: String,
    pub model: String,
    pub source_range: Option<String>,
    pub topic_tags: Option<Vec<String>>,
}

/// Persistence for the summary log and the API key slot
pub trait SummaryStore {
    /// Stored summaries, newest first; empty when nothing is stored
    fn load(&self) -> Result<Vec<Summary>>;

    /// Replace the stored summaries
    fn save(&mut self, summaries: &[Summary]) -> Result<()>;

    /// Stored API key, or an empty string
    fn api_key(&self) -> Result<String>;

    /// Store an API key; an empty key clears the slot
    fn save_api_key(&mut self, api_key: &str) -> Result<()>;
}

/// Build a tier 1 summary from a draft without storing it
pub fn create_summary(draft: SummaryDraft) -> Summary {
    let created_at = timestamp();
    let id = summary_id(&created_at);
    Summary {
        lineage: vec![id.clone()],
        id,
        created_at,
        summary: draft.summary,
        model: draft.model,
        source_range: draft.source_range.unwrap_or_default(),
        topic_tags: draft.topic_tags.unwrap_or_default(),
        tier: 1,
        tier_label: tier_label(1),
    }
}

/// Summary log operations over an injected store
pub struct SummaryLog<S: SummaryStore> {
    store: S,
}

impl<S: SummaryStore> SummaryLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current log, newest first
    pub fn list(&self) -> Result<Vec<Summary>> {
        self.store.load()
    }

    /// Prepend a summary and persist the log
    pub fn add(&mut self, summary: Summary) -> Result<Vec<Summary>> {
        let mut summaries = self.store.load()?;
        summaries.insert(0, summary);
        self.store.save(&summaries)?;
        Ok(summaries)
    }

    /// Merge the oldest entries into one higher-tier summary
    ///
    /// Does nothing until the log reaches [`COMPACT_THRESHOLD`] entries.
    pub fn compact(&mut self) -> Result<Vec<Summary>> {
        let summaries = self.store.load()?;
        if summaries.len() < COMPACT_THRESHOLD {
            return Ok(summaries);
        }

        let split_at = summaries.len() - COMPACT_BATCH_SIZE;
        let (rest, batch) = summaries.split_at(split_at);
        let compacted = merge_summaries(batch);

        info!(
            merged = batch.len(),
            tier = compacted.tier,
            "compacted summary log"
        );

        let mut updated = Vec::with_capacity(rest.len() + 1);
        updated.push(compacted);
        updated.extend_from_slice(rest);
        self.store.save(&updated)?;
        Ok(updated)
    }

    pub fn api_key(&self) -> Result<String> {
        self.store.api_key()
    }

    pub fn save_api_key(&mut self, api_key: &str) -> Result<()> {
        self.store.save_api_key(api_key)
    }
}

fn merge_summaries(batch: &[Summary]) -> Summary {
    let created_at = timestamp();
    let id = summary_id(&created_at);

    let mut seen = HashSet::new();
    let topic_tags = batch
        .iter()
        .flat_map(|s| s.topic_tags.iter())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect();

    let tier = batch.iter().map(|s| s.tier).max().unwrap_or(0) + 1;

    let mut lineage = vec![id.clone()];
    lineage.extend(batch.iter().flat_map(|s| s.lineage.iter().cloned()));

    Summary {
        id,
        created_at,
        summary: batch
            .iter()
            .map(|s| s.summary.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        model: batch
            .first()
            .map(|s| s.model.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        source_range: batch
            .iter()
            .map(|s| s.source_range.as_str())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        topic_tags,
        tier,
        tier_label: tier_label(tier),
        lineage,
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn summary_id(created_at: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("summary_{}_{}", created_at, &suffix[..6])
}

fn tier_label(tier: u32) -> String {
    format!("Tier {}", tier)
}
