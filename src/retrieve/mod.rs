pub mod merge;
pub mod resolver;
pub mod strategies;

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::GraphConfig;
use crate::db::GraphReader;
use crate::error::RetrieveError;
use self::merge::{merge_and_rank, RankedDocument};
use self::resolver::EntityResolver;
use self::strategies::{direct_strategy, expansion_strategy, multi_hop_strategy, StrategyHit};

/// Result of one graph retrieval call
#[derive(Debug, Serialize)]
pub struct GraphQueryOutcome {
    pub query: String,
    /// Entity mentions the query resolved to
    pub mentions: Vec<String>,
    pub documents: Vec<RankedDocument>,
    /// Strategies that timed out or errored on this call
    pub degraded: Vec<String>,
    pub took_ms: u64,
}

/// Traversal retriever running the three strategies concurrently against
/// the graph store and merging their hits into a ranked document list.
pub struct GraphRetriever {
    reader: Arc<dyn GraphReader>,
    resolver: EntityResolver,
    config: GraphConfig,
}

/// Run one strategy on the blocking pool under its own deadline, so a slow
/// or wedged store query cannot hold up the other strategies.
async fn run_guarded<F>(
    name: &str,
    deadline: Duration,
    strategy: F,
) -> Result<Vec<StrategyHit>, RetrieveError>
where
    F: FnOnce() -> Result<Vec<StrategyHit>, RetrieveError> + Send + 'static,
{
    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(strategy)).await {
        Err(_) => Err(RetrieveError::Strategy {
            strategy: name.to_string(),
            message: format!("timed out after {:?}", deadline),
        }),
        Ok(Err(join_error)) => Err(RetrieveError::Strategy {
            strategy: name.to_string(),
            message: join_error.to_string(),
        }),
        Ok(Ok(result)) => result,
    }
}

impl GraphRetriever {
    pub fn new(reader: Arc<dyn GraphReader>, resolver: EntityResolver, config: GraphConfig) -> Self {
        Self {
            reader,
            resolver,
            config,
        }
    }

    /// Resolve the query to mentions and retrieve documents by traversal.
    /// A failing strategy contributes nothing and is reported in `degraded`;
    /// only when every strategy fails does the call error, signalling the
    /// caller to fall back to non-graph retrieval.
    pub async fn query_graph(
        &self,
        query: &str,
        max_depth: Option<usize>,
        top_k: Option<usize>,
    ) -> Result<GraphQueryOutcome, RetrieveError> {
        let started = Instant::now();

        let mentions = self.resolver.resolve(query);
        if mentions.is_empty() {
            tracing::warn!("no entities resolved from query: '{}'", query);
            return Ok(GraphQueryOutcome {
                query: query.to_string(),
                mentions,
                documents: Vec::new(),
                degraded: Vec::new(),
                took_ms: started.elapsed().as_millis() as u64,
            });
        }
        tracing::info!("graph retrieval for mentions: {:?}", mentions);

        let depth = self.config.clamp_depth(max_depth);
        let top_k = top_k.unwrap_or(self.config.top_k);
        let deadline = self.config.strategy_timeout();
        let row_limit = self.config.strategy_row_limit;

        let direct = {
            let reader = self.reader.clone();
            let mentions = mentions.clone();
            let scoring = self.config.scoring.clone();
            run_guarded("direct", deadline, move || {
                direct_strategy(reader.as_ref(), &mentions, &scoring, row_limit)
            })
        };
        let expansion = {
            let reader = self.reader.clone();
            let mentions = mentions.clone();
            let scoring = self.config.scoring.clone();
            run_guarded("expansion", deadline, move || {
                expansion_strategy(reader.as_ref(), &mentions, &scoring, row_limit)
            })
        };
        let multi_hop = {
            let reader = self.reader.clone();
            let mentions = mentions.clone();
            let scoring = self.config.scoring.clone();
            run_guarded("multihop", deadline, move || {
                multi_hop_strategy(reader.as_ref(), &mentions, depth, &scoring, row_limit)
            })
        };

        let results = tokio::join!(direct, expansion, multi_hop);

        let mut hits = Vec::new();
        let mut degraded = Vec::new();
        for (name, result) in [
            ("direct", results.0),
            ("expansion", results.1),
            ("multihop", results.2),
        ] {
            match result {
                Ok(strategy_hits) => hits.extend(strategy_hits),
                Err(e) => {
                    tracing::warn!("strategy {} degraded: {}", name, e);
                    degraded.push(name.to_string());
                }
            }
        }

        if degraded.len() == 3 {
            return Err(RetrieveError::Unavailable);
        }

        let documents = merge_and_rank(hits, top_k);
        let took_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "retrieved {} documents in {}ms ({} strategies degraded)",
            documents.len(),
            took_ms,
            degraded.len()
        );

        Ok(GraphQueryOutcome {
            query: query.to_string(),
            mentions,
            documents,
            degraded,
            took_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DirectRow, ExpansionRow, MultiHopRow};
    use crate::error::StoreError;
    use crate::graph::entity::{DocumentId, EntityId};
    use crate::graph::relationship::RelationType;

    struct FailingReader;

    impl GraphReader for FailingReader {
        fn direct_matches(&self, _: &str, _: usize) -> Result<Vec<DirectRow>, StoreError> {
            Err(StoreError::Database(rusqlite::Error::InvalidQuery))
        }

        fn expansion_matches(
            &self,
            _: &str,
            _: &[RelationType],
            _: usize,
        ) -> Result<Vec<ExpansionRow>, StoreError> {
            Err(StoreError::Database(rusqlite::Error::InvalidQuery))
        }

        fn multi_hop_paths(
            &self,
            _: &str,
            _: usize,
            _: usize,
        ) -> Result<Vec<MultiHopRow>, StoreError> {
            Err(StoreError::Database(rusqlite::Error::InvalidQuery))
        }

        fn entity_texts(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct PartialReader;

    impl GraphReader for PartialReader {
        fn direct_matches(&self, _: &str, _: usize) -> Result<Vec<DirectRow>, StoreError> {
            Ok(vec![DirectRow {
                doc_id: DocumentId::new("d1"),
                entity_id: EntityId::new("visa_type_aaa"),
                entity_text: "Skilled Worker visa".to_string(),
            }])
        }

        fn expansion_matches(
            &self,
            _: &str,
            _: &[RelationType],
            _: usize,
        ) -> Result<Vec<ExpansionRow>, StoreError> {
            Err(StoreError::Database(rusqlite::Error::InvalidQuery))
        }

        fn multi_hop_paths(
            &self,
            _: &str,
            _: usize,
            _: usize,
        ) -> Result<Vec<MultiHopRow>, StoreError> {
            Ok(Vec::new())
        }

        fn entity_texts(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct SlowReader;

    impl GraphReader for SlowReader {
        fn direct_matches(&self, _: &str, _: usize) -> Result<Vec<DirectRow>, StoreError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Vec::new())
        }

        fn expansion_matches(
            &self,
            _: &str,
            _: &[RelationType],
            _: usize,
        ) -> Result<Vec<ExpansionRow>, StoreError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Vec::new())
        }

        fn multi_hop_paths(
            &self,
            _: &str,
            _: usize,
            _: usize,
        ) -> Result<Vec<MultiHopRow>, StoreError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(Vec::new())
        }

        fn entity_texts(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn retriever(reader: Arc<dyn GraphReader>, config: GraphConfig) -> GraphRetriever {
        let resolver = EntityResolver::new(vec!["skilled worker".to_string()], None);
        GraphRetriever::new(reader, resolver, config)
    }

    #[tokio::test]
    async fn test_unresolvable_query_returns_empty_outcome() {
        let retriever = retriever(Arc::new(FailingReader), GraphConfig::default());
        let outcome = retriever
            .query_graph("how long does processing take", None, None)
            .await
            .unwrap();
        assert!(outcome.mentions.is_empty());
        assert!(outcome.documents.is_empty());
        assert!(outcome.degraded.is_empty());
    }

    #[tokio::test]
    async fn test_all_strategies_failing_is_unavailable() {
        let retriever = retriever(Arc::new(FailingReader), GraphConfig::default());
        let err = retriever
            .query_graph("skilled worker requirements", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieveError::Unavailable));
    }

    #[tokio::test]
    async fn test_partial_failure_degrades() {
        let retriever = retriever(Arc::new(PartialReader), GraphConfig::default());
        let outcome = retriever
            .query_graph("skilled worker requirements", None, None)
            .await
            .unwrap();
        assert_eq!(outcome.degraded, vec!["expansion".to_string()]);
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].doc_id.as_str(), "d1");
    }

    #[tokio::test]
    async fn test_slow_strategies_time_out() {
        let config = GraphConfig {
            strategy_timeout_ms: 20,
            ..GraphConfig::default()
        };
        let retriever = retriever(Arc::new(SlowReader), config);
        let err = retriever
            .query_graph("skilled worker requirements", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieveError::Unavailable));
    }
}
