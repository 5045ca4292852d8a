use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{DocumentId, EntityId};

/// Relationship type enumeration. The string form matches the wire names
/// used in the graph store (REQUIRES, SATISFIED_BY, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// A visa type requires a requirement
    Requires,
    /// A requirement is satisfied by a document type
    SatisfiedBy,
    /// An entity depends on another entity
    DependsOn,
    /// A condition applies to a visa type
    AppliesIf,
    /// A visa type can transition to another visa type
    CanTransitionTo,
    /// Weak association between entities
    RelatesTo,
    /// A near-duplicate entity points at its canonical form
    AliasOf,
    /// Custom relationship type
    Other(String),
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationType::Requires => write!(f, "REQUIRES"),
            RelationType::SatisfiedBy => write!(f, "SATISFIED_BY"),
            RelationType::DependsOn => write!(f, "DEPENDS_ON"),
            RelationType::AppliesIf => write!(f, "APPLIES_IF"),
            RelationType::CanTransitionTo => write!(f, "CAN_TRANSITION_TO"),
            RelationType::RelatesTo => write!(f, "RELATES_TO"),
            RelationType::AliasOf => write!(f, "ALIAS_OF"),
            RelationType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Parse a relationship type from its string representation
pub fn parse_relation_type(type_str: &str) -> RelationType {
    match type_str {
        "REQUIRES" => RelationType::Requires,
        "SATISFIED_BY" => RelationType::SatisfiedBy,
        "DEPENDS_ON" => RelationType::DependsOn,
        "APPLIES_IF" => RelationType::AppliesIf,
        "CAN_TRANSITION_TO" => RelationType::CanTransitionTo,
        "RELATES_TO" => RelationType::RelatesTo,
        "ALIAS_OF" => RelationType::AliasOf,
        other => RelationType::Other(other.to_string()),
    }
}

/// Typed, directed edge between two entities in the knowledge graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub source_id: EntityId,
    pub rel_type: RelationType,
    pub target_id: EntityId,
    pub weight: Option<f32>,
}

impl Relationship {
    pub fn new(source_id: EntityId, rel_type: RelationType, target_id: EntityId) -> Self {
        Self {
            source_id,
            rel_type,
            target_id,
            weight: None,
        }
    }

    /// Deterministic key for the (source, type, target) triple. Re-asserting
    /// the same triple produces the same key, so the store can treat edge
    /// writes as upserts and never create duplicates.
    pub fn triple_key(&self) -> String {
        format!(
            "{}->{}::{}",
            self.source_id.as_str(),
            self.target_id.as_str(),
            self.rel_type
        )
    }
}

/// Provenance edge linking a document to an entity it mentions.
/// `run_id` records which extraction run last asserted the edge; edges are
/// never deleted, so superseded runs leave their edges behind (known
/// staleness limitation of the append-only graph).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provenance {
    pub doc_id: DocumentId,
    pub entity_id: EntityId,
    pub run_id: String,
}

impl Provenance {
    pub fn new(doc_id: DocumentId, entity_id: EntityId, run_id: &str) -> Self {
        Self {
            doc_id,
            entity_id,
            run_id: run_id.to_string(),
        }
    }
}

/// Path walked during a multi-hop traversal. Ephemeral: produced inside a
/// single query for scoring and explanation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraversalPath {
    pub entity_ids: Vec<EntityId>,
    pub relation_types: Vec<RelationType>,
    pub hop_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_key_is_deterministic() {
        let rel = Relationship::new(
            EntityId::new("visa_type_aaa"),
            RelationType::Requires,
            EntityId::new("requirement_bbb"),
        );
        let again = Relationship::new(
            EntityId::new("visa_type_aaa"),
            RelationType::Requires,
            EntityId::new("requirement_bbb"),
        );
        assert_eq!(rel.triple_key(), again.triple_key());
        assert_eq!(rel.triple_key(), "visa_type_aaa->requirement_bbb::REQUIRES");
    }

    #[test]
    fn test_relation_type_round_trip() {
        let types = vec![
            RelationType::Requires,
            RelationType::SatisfiedBy,
            RelationType::DependsOn,
            RelationType::AppliesIf,
            RelationType::CanTransitionTo,
            RelationType::RelatesTo,
            RelationType::AliasOf,
            RelationType::Other("CITES".to_string()),
        ];
        for t in types {
            assert_eq!(parse_relation_type(&t.to_string()), t);
        }
    }
}
