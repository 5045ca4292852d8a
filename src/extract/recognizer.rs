use crate::error::ExtractError;
use crate::graph::entity::{Entity, EntityType, ExtractionSource, SourceDocument};

/// Confidence assigned to recognizer output. Statistical models are reliable
/// on common entity classes but noisier than the domain patterns.
pub const RECOGNIZER_CONFIDENCE: f32 = 0.8;

/// A labeled span produced by a statistical named-entity recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSpan {
    pub start: usize,
    pub end: usize,
    /// Model label, e.g. ORG, GPE, PERSON
    pub label: String,
    pub text: String,
}

/// Seam for plugging in a statistical NER backend. The pipeline only needs
/// labeled spans; which model produces them is the implementor's business.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>, ExtractError>;
}

/// Recognizer that finds nothing. Used when no statistical backend is
/// configured; the pattern and semantic passes still run.
pub struct NoopRecognizer;

impl Recognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<RecognizedSpan>, ExtractError> {
        Ok(Vec::new())
    }
}

/// Map a recognizer label onto a graph entity type. Labels outside the
/// accepted set are dropped, the models emit many classes we do not store.
pub fn map_label(label: &str) -> Option<EntityType> {
    match label {
        "ORG" => Some(EntityType::Organization),
        "GPE" => Some(EntityType::Country),
        "LOC" => Some(EntityType::Location),
        "DATE" => Some(EntityType::Date),
        "MONEY" => Some(EntityType::MonetaryValue),
        "PERSON" => Some(EntityType::Person),
        _ => None,
    }
}

/// Second extraction pass: statistical NER. A recognizer failure degrades
/// this pass to empty output rather than failing the document, the other
/// passes still contribute.
pub fn statistical_entities(doc: &SourceDocument, recognizer: &dyn Recognizer) -> Vec<Entity> {
    let spans = match recognizer.recognize(&doc.text) {
        Ok(spans) => spans,
        Err(e) => {
            tracing::warn!("recognizer failed for document {}: {}", doc.id, e);
            return Vec::new();
        }
    };

    let mut entities = Vec::new();
    for span in spans {
        let Some(entity_type) = map_label(&span.label) else {
            continue;
        };
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        entities.push(Entity::new(
            &doc.id,
            entity_type,
            text.to_string(),
            RECOGNIZER_CONFIDENCE,
            ExtractionSource::Statistical,
        ));
    }
    entities
}
