use super::{Summary, SummaryStore};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

/// Key holding the JSON-encoded summary log
pub const STORAGE_KEY: &str = "ctt.summaries.v1";

/// Key holding the API key
pub const API_KEY_STORAGE_KEY: &str = "ctt.apiKey";

/// SQLite-backed key/value store for the summary log
pub struct SqliteSummaryStore {
    conn: Connection,
}

impl SqliteSummaryStore {
    /// Create a new in-memory store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a store file
    pub fn open(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .context(format!("Failed to read key: {}", key))
    }

    pub(super) fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .context(format!("Failed to write key: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .context(format!("Failed to delete key: {}", key))?;
        Ok(())
    }
}

impl SummaryStore for SqliteSummaryStore {
    fn load(&self) -> Result<Vec<Summary>> {
        match self.get(STORAGE_KEY)? {
            Some(raw) => decode_summaries(&raw),
            None => Ok(vec![]),
        }
    }

    fn save(&mut self, summaries: &[Summary]) -> Result<()> {
        let raw = serde_json::to_string(summaries).context("Failed to encode summaries")?;
        self.set(STORAGE_KEY, &raw)
    }

    fn api_key(&self) -> Result<String> {
        Ok(self.get(API_KEY_STORAGE_KEY)?.unwrap_or_default())
    }

    fn save_api_key(&mut self, api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            self.remove(API_KEY_STORAGE_KEY)
        } else {
            self.set(API_KEY_STORAGE_KEY, api_key)
        }
    }
}

/// In-process store, useful for tests and one-shot sessions
#[derive(Debug, Default)]
pub struct MemorySummaryStore {
    summaries: Vec<Summary>,
    api_key: String,
}

impl MemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SummaryStore for MemorySummaryStore {
    fn load(&self) -> Result<Vec<Summary>> {
        Ok(self.summaries.clone())
    }

    fn save(&mut self, summaries: &[Summary]) -> Result<()> {
        self.summaries = summaries.to_vec();
        Ok(())
    }

    fn api_key(&self) -> Result<String> {
        Ok(self.api_key.clone())
    }

    fn save_api_key(&mut self, api_key: &str) -> Result<()> {
        self.api_key = api_key.to_string();
        Ok(())
    }
}

/// Decode the stored log; anything other than a JSON array reads as empty
fn decode_summaries(raw: &str) -> Result<Vec<Summary>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("Stored summary log is not valid JSON")?;
    if !value.is_array() {
        warn!("stored summary log is not an array, treating as empty");
        return Ok(vec![]);
    }
    serde_json::from_value(value).context("Stored summary log has malformed entries")
}
