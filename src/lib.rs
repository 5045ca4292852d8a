pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod retrieve;
pub mod service;

pub use config::GraphConfig;
pub use db::{Database, GraphReader};
pub use graph::{DocumentId, Entity, EntityId, EntityType, RelationType, Relationship, SourceDocument};
pub use service::GraphRagService;
