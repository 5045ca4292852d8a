use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::GraphConfig;
use crate::db::{Database, EntityDetails, GraphStatistics, HealthReport};
use crate::error::{ExtractError, RetrieveError, StoreError};
use crate::extract::recognizer::{NoopRecognizer, Recognizer};
use crate::extract::semantic::SemanticExtractor;
use crate::extract::{ExtractionJob, ExtractionPipeline, ExtractionReport};
use crate::graph::entity::{EntityId, SourceDocument};
use crate::llm::OpenRouterExtractor;
use crate::retrieve::resolver::EntityResolver;
use crate::retrieve::{GraphQueryOutcome, GraphRetriever};

/// Boundary facade over the whole graph subsystem: extraction, retrieval
/// and monitoring behind one handle, so callers never touch the store or
/// the pipeline directly.
pub struct GraphRagService {
    db: Database,
    recognizer: Arc<dyn Recognizer>,
    semantic: Option<Arc<dyn SemanticExtractor>>,
    config: GraphConfig,
}

impl GraphRagService {
    /// Open the graph at the configured path. The semantic pass is wired to
    /// OpenRouter when enabled; without an API key it degrades to a no-op.
    pub fn new(config: GraphConfig) -> Result<Self> {
        let db = Database::from_path(&config.db_path)
            .with_context(|| format!("opening graph store at {}", config.db_path))?;

        let semantic: Option<Arc<dyn SemanticExtractor>> = if config.enable_semantic_extraction {
            let extractor = OpenRouterExtractor::from_env(config.llm_model.clone())
                .context("initializing semantic extractor")?;
            Some(Arc::new(extractor))
        } else {
            None
        };

        Ok(Self {
            db,
            recognizer: Arc::new(NoopRecognizer),
            semantic,
            config,
        })
    }

    /// Assemble a service from explicit parts, used by tests to plug in
    /// stub recognizers and extractors
    pub fn with_parts(
        db: Database,
        recognizer: Arc<dyn Recognizer>,
        semantic: Option<Arc<dyn SemanticExtractor>>,
        config: GraphConfig,
    ) -> Self {
        Self {
            db,
            recognizer,
            semantic,
            config,
        }
    }

    fn pipeline(&self) -> ExtractionPipeline {
        ExtractionPipeline::new(
            self.db.clone(),
            self.recognizer.clone(),
            self.semantic.clone(),
            self.config.clone(),
        )
    }

    /// Run extraction to completion
    pub async fn extract(
        &self,
        documents: Vec<SourceDocument>,
    ) -> Result<ExtractionReport, ExtractError> {
        self.pipeline().run(documents).await
    }

    /// Start extraction in the background and return a job handle
    pub fn trigger_extraction(&self, documents: Vec<SourceDocument>) -> ExtractionJob {
        self.pipeline().spawn(documents)
    }

    /// Retrieve documents for a query by graph traversal. The resolver is
    /// rebuilt per call so entities from earlier extractions in the same
    /// process are visible.
    pub async fn query_graph(
        &self,
        query: &str,
        max_depth: Option<usize>,
        top_k: Option<usize>,
    ) -> Result<GraphQueryOutcome, RetrieveError> {
        let reader = Arc::new(self.db.clone());
        let resolver = EntityResolver::from_reader(reader.as_ref(), Some(self.recognizer.clone()));
        let retriever = GraphRetriever::new(reader, resolver, self.config.clone());
        retriever.query_graph(query, max_depth, top_k).await
    }

    pub fn get_stats(&self) -> Result<GraphStatistics, StoreError> {
        self.db.statistics()
    }

    pub fn get_entity(&self, id: &str) -> Result<Option<EntityDetails>, StoreError> {
        self.db.get_entity(&EntityId::new(id))
    }

    pub fn health_check(&self) -> HealthReport {
        self.db.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::HealthStatus;
    use tempfile::tempdir;

    fn service(db: &Database) -> GraphRagService {
        let config = GraphConfig {
            enable_semantic_extraction: false,
            ..GraphConfig::default()
        };
        GraphRagService::with_parts(db.clone(), Arc::new(NoopRecognizer), None, config)
    }

    #[tokio::test]
    async fn test_extract_then_query_round_trip() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let service = service(&db);

        let report = service
            .extract(vec![SourceDocument::new(
                "d1",
                "The Skilled Worker visa requires a bank statement.",
            )])
            .await
            .unwrap();
        assert!(report.entities >= 2);

        let outcome = service
            .query_graph("Skilled Worker requirements", None, None)
            .await
            .unwrap();
        assert!(!outcome.mentions.is_empty());
        assert_eq!(outcome.documents[0].doc_id.as_str(), "d1");
    }

    #[tokio::test]
    async fn test_stats_and_health_after_extraction() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let service = service(&db);

        service
            .extract(vec![SourceDocument::new("d1", "Bring your passport.")])
            .await
            .unwrap();

        let stats = service.get_stats().unwrap();
        assert!(stats.total_nodes >= 1);

        let health = service.health_check();
        assert_eq!(health.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_get_entity_details() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let service = service(&db);

        service
            .extract(vec![SourceDocument::new("d1", "Bring your passport.")])
            .await
            .unwrap();

        let summaries = db.entity_summaries().unwrap();
        let details = service
            .get_entity(summaries[0].id.as_str())
            .unwrap()
            .unwrap();
        assert_eq!(details.entity.text, "passport");

        assert!(service.get_entity("nope").unwrap().is_none());
    }
}
