pub mod entity;
pub mod relationship;

pub use entity::{DocumentId, Entity, EntityId, EntityType, ExtractionSource, SourceDocument};
pub use relationship::{Provenance, RelationType, Relationship, TraversalPath};
