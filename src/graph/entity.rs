use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Unique identifier for a source document (owned by the document store,
/// referenced here only by id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity type enumeration. The domain types come from the immigration
/// corpus; the remainder are mapped from general-purpose recognizer labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityType {
    // Domain-specific types
    VisaType,
    VisaCode,
    Requirement,
    DocumentType,
    Condition,
    Process,
    TimePeriod,
    MonetaryValue,

    // Recognizer-mapped types
    Organization,
    Country,
    Location,
    Date,
    Person,

    // Custom type
    Other(String),
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::VisaType => write!(f, "visa_type"),
            EntityType::VisaCode => write!(f, "visa_code"),
            EntityType::Requirement => write!(f, "requirement"),
            EntityType::DocumentType => write!(f, "document_type"),
            EntityType::Condition => write!(f, "condition"),
            EntityType::Process => write!(f, "process"),
            EntityType::TimePeriod => write!(f, "time_period"),
            EntityType::MonetaryValue => write!(f, "monetary_value"),
            EntityType::Organization => write!(f, "organization"),
            EntityType::Country => write!(f, "country"),
            EntityType::Location => write!(f, "location"),
            EntityType::Date => write!(f, "date"),
            EntityType::Person => write!(f, "person"),
            EntityType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Parse an entity type from its string representation
pub fn parse_entity_type(type_str: &str) -> EntityType {
    match type_str {
        "visa_type" => EntityType::VisaType,
        "visa_code" => EntityType::VisaCode,
        "requirement" => EntityType::Requirement,
        "document_type" => EntityType::DocumentType,
        "condition" => EntityType::Condition,
        "process" => EntityType::Process,
        "time_period" => EntityType::TimePeriod,
        "monetary_value" => EntityType::MonetaryValue,
        "organization" => EntityType::Organization,
        "country" => EntityType::Country,
        "location" => EntityType::Location,
        "date" => EntityType::Date,
        "person" => EntityType::Person,
        other => EntityType::Other(other.to_string()),
    }
}

/// Which extraction pass produced an entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionSource {
    Pattern,
    Statistical,
    Semantic,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionSource::Pattern => write!(f, "pattern"),
            ExtractionSource::Statistical => write!(f, "statistical"),
            ExtractionSource::Semantic => write!(f, "semantic"),
        }
    }
}

/// Parse an extraction source from its string representation
pub fn parse_extraction_source(source_str: &str) -> ExtractionSource {
    match source_str {
        "pattern" => ExtractionSource::Pattern,
        "semantic" => ExtractionSource::Semantic,
        _ => ExtractionSource::Statistical,
    }
}

/// Typed node in the knowledge graph representing an extracted concept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub text: String,
    /// Extraction confidence in [0, 1]; fixed per pass
    pub confidence: f32,
    /// Documents this entity was extracted from
    pub provenance: BTreeSet<DocumentId>,
    pub source: ExtractionSource,
    /// Pass-specific properties (category, mandatory, steps, ...)
    pub attributes: HashMap<String, String>,
}

impl Entity {
    pub fn new(
        doc_id: &DocumentId,
        entity_type: EntityType,
        text: String,
        confidence: f32,
        source: ExtractionSource,
    ) -> Self {
        let id = Self::deterministic_id(doc_id, &text, &entity_type);
        let mut provenance = BTreeSet::new();
        provenance.insert(doc_id.clone());
        Self {
            id,
            entity_type,
            text,
            confidence,
            provenance,
            source,
            attributes: HashMap::new(),
        }
    }

    /// Derive the entity id from the (document, span, type) triple.
    /// Repeated extraction of the same document must reproduce the same id,
    /// which is what makes graph writes idempotent merge-upserts.
    pub fn deterministic_id(doc_id: &DocumentId, span: &str, entity_type: &EntityType) -> EntityId {
        let mut hasher = Sha256::new();
        hasher.update(doc_id.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(span.as_bytes());
        hasher.update(b":");
        hasher.update(entity_type.to_string().as_bytes());
        let digest = hasher.finalize();
        let short: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();
        EntityId(format!("{}_{}", entity_type, short))
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// A document handed to the extraction pipeline: id plus raw text.
/// Content hydration for query results is owned by the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: DocumentId,
    pub text: String,
}

impl SourceDocument {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: DocumentId::new(id),
            text: text.to_string(),
        }
    }
}
