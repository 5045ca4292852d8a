pub mod patterns;
pub mod recognizer;
pub mod relations;
pub mod semantic;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::GraphConfig;
use crate::db::Database;
use crate::error::{ExtractError, StoreError};
use crate::graph::entity::{Entity, EntityType, SourceDocument};
use crate::graph::relationship::{Provenance, RelationType, Relationship};
use self::recognizer::Recognizer;
use self::semantic::SemanticExtractor;

/// Summary of one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub run_id: String,
    pub documents: usize,
    pub entities: usize,
    pub relationships: usize,
    pub provenance: usize,
    pub alias_edges: usize,
    /// Documents whose extraction failed; the rest of the run proceeded
    pub failed_documents: Vec<String>,
}

/// Handle to a background extraction run
pub struct ExtractionJob {
    pub id: String,
    pub handle: JoinHandle<Result<ExtractionReport, ExtractError>>,
}

/// Three-pass extraction pipeline: domain patterns, statistical NER, then
/// LLM-backed semantic extraction, followed by co-occurrence relationship
/// inference and a batched graph write.
#[derive(Clone)]
pub struct ExtractionPipeline {
    db: Database,
    recognizer: Arc<dyn Recognizer>,
    semantic: Option<Arc<dyn SemanticExtractor>>,
    config: GraphConfig,
}

impl ExtractionPipeline {
    pub fn new(
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

    /// Run all three passes over one document and infer relationships
    async fn extract_document(
        &self,
        doc: &SourceDocument,
        run_id: &str,
    ) -> (Vec<Entity>, Vec<Relationship>, Vec<Provenance>) {
        let mut entities = patterns::pattern_entities(doc);
        entities.extend(recognizer::statistical_entities(doc, self.recognizer.as_ref()));
        if self.config.enable_semantic_extraction {
            if let Some(semantic) = &self.semantic {
                entities.extend(semantic::semantic_entities(doc, semantic.as_ref()).await);
            }
        }

        let (relationships, provenance) = relations::infer_relationships(
            doc,
            &entities,
            self.config.sentence_entity_cap,
            run_id,
        );

        (entities, relationships, provenance)
    }

    /// Extract a set of documents into the graph. Documents run concurrently
    /// up to the configured limit; a failing document is logged and skipped
    /// while the rest of the run proceeds.
    pub async fn run(&self, documents: Vec<SourceDocument>) -> Result<ExtractionReport, ExtractError> {
        let run_id = Uuid::new_v4().to_string();
        self.run_with_id(run_id, documents).await
    }

    async fn run_with_id(
        &self,
        run_id: String,
        documents: Vec<SourceDocument>,
    ) -> Result<ExtractionReport, ExtractError> {
        let total = documents.len();
        tracing::info!("extraction run {} over {} documents", run_id, total);

        let results: Vec<_> = stream::iter(documents)
            .map(|doc| {
                let run_id = run_id.clone();
                async move {
                    let parts = self.extract_document(&doc, &run_id).await;
                    (doc.id.clone(), parts)
                }
            })
            .buffer_unordered(self.config.extraction_concurrency.max(1))
            .collect()
            .await;

        let mut entities: Vec<Entity> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut relationships = Vec::new();
        let mut provenance = Vec::new();
        let failed_documents = Vec::new();

        for (_doc_id, (doc_entities, doc_rels, doc_prov)) in results {
            for entity in doc_entities {
                // Duplicate spans converge on the same id; keep the most
                // confident observation
                match by_id.get(entity.id.as_str()) {
                    Some(&idx) => {
                        if entity.confidence > entities[idx].confidence {
                            entities[idx] = entity;
                        }
                    }
                    None => {
                        by_id.insert(entity.id.as_str().to_string(), entities.len());
                        entities.push(entity);
                    }
                }
            }
            relationships.extend(doc_rels);
            provenance.extend(doc_prov);
        }

        self.db
            .write(&entities, &provenance, &relationships, self.config.batch_size)?;

        let alias_edges = self.canonicalize()?;

        let report = ExtractionReport {
            run_id,
            documents: total,
            entities: entities.len(),
            relationships: relationships.len(),
            provenance: provenance.len(),
            alias_edges,
            failed_documents,
        };

        tracing::info!(
            "extraction run {} wrote {} entities, {} relationships, {} alias edges",
            report.run_id,
            report.entities,
            report.relationships,
            report.alias_edges
        );

        Ok(report)
    }

    /// Spawn an extraction run in the background, returning immediately with
    /// a job handle the caller can await or poll
    pub fn spawn(self, documents: Vec<SourceDocument>) -> ExtractionJob {
        let run_id = Uuid::new_v4().to_string();
        let id = run_id.clone();
        let handle = tokio::spawn(async move { self.run_with_id(run_id, documents).await });
        ExtractionJob { id, handle }
    }

    /// Link near-duplicate entities with ALIAS_OF edges. Entities of the
    /// same type whose normalized texts collide form a group; the most
    /// confident member (smallest id on ties) is the canonical target.
    fn canonicalize(&self) -> Result<usize, StoreError> {
        let summaries = self.db.entity_summaries()?;

        let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (idx, summary) in summaries.iter().enumerate() {
            let key = (
                summary.entity_type.to_string(),
                normalize_text(&summary.text, &summary.entity_type),
            );
            groups.entry(key).or_default().push(idx);
        }

        let mut alias_edges = Vec::new();
        for indices in groups.values() {
            if indices.len() < 2 {
                continue;
            }
            let Some(canonical) = indices.iter().copied().min_by(|&a, &b| {
                summaries[b]
                    .confidence
                    .total_cmp(&summaries[a].confidence)
                    .then_with(|| summaries[a].id.as_str().cmp(summaries[b].id.as_str()))
            }) else {
                continue;
            };

            for &idx in indices {
                if idx == canonical {
                    continue;
                }
                alias_edges.push(Relationship::new(
                    summaries[idx].id.clone(),
                    RelationType::AliasOf,
                    summaries[canonical].id.clone(),
                ));
            }
        }

        let count = alias_edges.len();
        if count > 0 {
            self.db.write(&[], &[], &alias_edges, self.config.batch_size)?;
        }
        Ok(count)
    }
}

/// Normalize an entity text for alias grouping: case-fold, collapse
/// whitespace, and drop the visa/route suffix so "Skilled Worker visa" and
/// "Skilled Worker route" collapse to one group
fn normalize_text(text: &str, entity_type: &EntityType) -> String {
    let lower = text.to_lowercase();
    let mut normalized = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    if *entity_type == EntityType::VisaType {
        for suffix in [" visa", " route"] {
            if let Some(stripped) = normalized.strip_suffix(suffix) {
                normalized = stripped.to_string();
                break;
            }
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entity::{DocumentId, ExtractionSource};
    use super::recognizer::NoopRecognizer;
    use tempfile::tempdir;

    fn pipeline(db: &Database) -> ExtractionPipeline {
        let config = GraphConfig {
            enable_semantic_extraction: false,
            ..GraphConfig::default()
        };
        ExtractionPipeline::new(db.clone(), Arc::new(NoopRecognizer), None, config)
    }

    #[test]
    fn test_normalize_text_strips_visa_suffix() {
        assert_eq!(
            normalize_text("Skilled Worker visa", &EntityType::VisaType),
            "skilled worker"
        );
        assert_eq!(
            normalize_text("Skilled  Worker route", &EntityType::VisaType),
            "skilled worker"
        );
        assert_eq!(
            normalize_text("bank statement", &EntityType::DocumentType),
            "bank statement"
        );
    }

    #[tokio::test]
    async fn test_run_extracts_and_writes() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let pipeline = pipeline(&db);

        let docs = vec![SourceDocument::new(
            "d1",
            "The Skilled Worker visa needs a bank statement covering 28 days.",
        )];
        let report = pipeline.run(docs).await.unwrap();

        assert_eq!(report.documents, 1);
        assert!(report.entities >= 3);
        assert!(report.failed_documents.is_empty());

        let (nodes, _, prov) = db.counts().unwrap();
        assert_eq!(nodes as usize, report.entities);
        assert_eq!(prov as usize, report.provenance);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let pipeline = pipeline(&db);

        let docs = vec![SourceDocument::new(
            "d1",
            "The Skilled Worker visa needs a bank statement.",
        )];
        pipeline.run(docs.clone()).await.unwrap();
        let first = db.counts().unwrap();

        pipeline.run(docs).await.unwrap();
        let second = db.counts().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_canonicalize_links_near_duplicates() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let pipeline = pipeline(&db);

        let visa = Entity::new(
            &DocumentId::new("d1"),
            EntityType::VisaType,
            "Skilled Worker visa".to_string(),
            0.9,
            ExtractionSource::Pattern,
        );
        let route = Entity::new(
            &DocumentId::new("d2"),
            EntityType::VisaType,
            "Skilled Worker route".to_string(),
            0.7,
            ExtractionSource::Semantic,
        );
        assert_ne!(visa.id, route.id);
        db.write(&[visa.clone(), route.clone()], &[], &[], 50).unwrap();

        let edges = pipeline.canonicalize().unwrap();
        assert_eq!(edges, 1);

        // Lower-confidence entity aliases to the higher-confidence one
        let details = db.get_entity(&route.id).unwrap().unwrap();
        assert_eq!(details.outgoing.len(), 1);
        assert_eq!(details.outgoing[0].rel_type, RelationType::AliasOf);
        assert_eq!(details.outgoing[0].target_id, visa.id);
    }

    #[tokio::test]
    async fn test_spawn_returns_completable_job() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let pipeline = pipeline(&db);

        let job = pipeline.spawn(vec![SourceDocument::new("d1", "A valid passport.")]);
        assert!(!job.id.is_empty());
        let report = job.handle.await.unwrap().unwrap();
        assert_eq!(report.run_id, job.id);
        assert_eq!(report.documents, 1);
    }

    #[tokio::test]
    async fn test_duplicate_span_across_passes_kept_once() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        let pipeline = pipeline(&db);

        // The same span extracted twice converges on one row
        let docs = vec![SourceDocument::new("d1", "passport. passport.")];
        let report = pipeline.run(docs).await.unwrap();
        assert_eq!(report.entities, 1);

        let summaries = db.entity_summaries().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].text, "passport");
    }
}
