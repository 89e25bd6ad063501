use crate::config::ChunkerConfig;
use std::collections::BTreeMap;
use tracing::warn;

/// Context limit used for model identifiers not present in the table
pub const DEFAULT_LIMIT: usize = 32_000;

/// Model used when the caller does not name one
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

const BUILTIN_LIMITS: &[(&str, usize)] = &[
    ("gpt-4.1-mini", 128_000),
    ("gpt-4.1", 128_000),
    ("gpt-4o-mini", 128_000),
    ("gpt-4o", 128_000),
];

/// Lookup table of model identifier -> context size, with a fallback limit
#[derive(Debug, Clone)]
pub struct ModelLimits {
    /// Limit for unrecognized identifiers
    default_limit: usize,
    /// Model -> context limit mapping
    map: BTreeMap<String, usize>,
}

impl ModelLimits {
    /// Create the table with the built-in models and default fallback
    pub fn new() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            map: BUILTIN_LIMITS
                .iter()
                .map(|(name, limit)| (name.to_string(), *limit))
                .collect(),
        }
    }

    /// Built-in table with config entries layered on top
    ///
    /// Non-positive limits are skipped so a bad config can never produce a
    /// zero budget.
    pub fn with_overrides(config: &ChunkerConfig) -> Self {
        let mut limits = Self::new();

        if let Some(default_limit) = config.default_limit {
            if default_limit > 0 {
                limits.default_limit = default_limit as usize;
            } else {
                warn!(default_limit, "ignoring non-positive default limit");
            }
        }

        for (model, &limit) in &config.models {
            if limit > 0 {
                limits.register(model.clone(), limit as usize);
            } else {
                warn!(%model, limit, "ignoring non-positive model limit");
            }
        }

        limits
    }

    /// Register or replace a model's context limit
    pub fn register(&mut self, model: impl Into<String>, limit: usize) {
        self.map.insert(model.into(), limit.max(1));
    }

    /// Context limit for a model, falling back to the default limit
    pub fn limit_for(&self, model: &str) -> usize {
        self.map.get(model).copied().unwrap_or(self.default_limit)
    }

    /// Resolve the per-chunk token budget for a request
    ///
    /// A positive request is clamped to the model limit; anything else
    /// (absent, zero, negative) resolves to the model limit itself.
    pub fn resolve_budget(&self, model: &str, requested: Option<i64>) -> usize {
        let limit = self.limit_for(model);
        match requested {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX).min(limit),
            _ => limit,
        }
    }

    /// Fallback limit for unknown models
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Known models in name order
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.map.iter().map(|(name, limit)| (name.as_str(), *limit))
    }
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self::new()
    }
}
