use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-strategy score contributions. Exposed as configuration so the
/// ranking can be tuned without code changes and pinned in tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Contribution per matched entity for the direct strategy
    pub direct: f64,
    /// Contribution per path for the 1-hop expansion strategy
    pub expansion: f64,
    /// Multi-hop contribution is `multi_hop_base / hop_count`
    pub multi_hop_base: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            direct: 1.0,
            expansion: 0.8,
            multi_hop_base: 0.6,
        }
    }
}

/// Configuration for the extraction pipeline and traversal retriever
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// SQLite database path for the graph store
    pub db_path: String,
    /// Entities/relationships per write transaction
    pub batch_size: usize,
    /// Documents extracted concurrently
    pub extraction_concurrency: usize,
    /// Entities considered per sentence for pairwise relationship inference;
    /// sentences over the cap contribute provenance edges only
    pub sentence_entity_cap: usize,
    /// Default multi-hop traversal depth
    pub max_depth: usize,
    /// Hard ceiling on requested traversal depth
    pub max_depth_limit: usize,
    /// Default number of ranked documents returned
    pub top_k: usize,
    /// Rows fetched per strategy before merging
    pub strategy_row_limit: usize,
    /// Independent timeout applied to each traversal strategy
    pub strategy_timeout_ms: u64,
    /// Enable the LLM-backed semantic extraction pass
    pub enable_semantic_extraction: bool,
    /// Model used for semantic extraction (via OpenRouter)
    pub llm_model: String,
    pub scoring: ScoringConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            db_path: "graphrag.db".to_string(),
            batch_size: 50,
            extraction_concurrency: 4,
            sentence_entity_cap: 20,
            max_depth: 3,
            max_depth_limit: 5,
            top_k: 10,
            strategy_row_limit: 20,
            strategy_timeout_ms: 500,
            enable_semantic_extraction: true,
            llm_model: "openai/gpt-4o-mini".to_string(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl GraphConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }

    /// Clamp a requested depth into [1, max_depth_limit]
    pub fn clamp_depth(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.max_depth)
            .clamp(1, self.max_depth_limit)
    }
}
