use chrono::Utc;
use rusqlite::{params, params_from_iter, types::Value, Connection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::graph::entity::{
    parse_entity_type, parse_extraction_source, DocumentId, Entity, EntityId, EntityType,
};
use crate::graph::relationship::{
    parse_relation_type, Provenance, RelationType, Relationship, TraversalPath,
};

/// Database schema version - increment when schema changes
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Separator used when packing traversal paths into a single SQL column.
/// Entity ids and relation names never contain the unit separator.
const PATH_SEP: char = '\u{1f}';

/// Graph store gateway over SQLite. Writes are batched merge-upserts keyed
/// on deterministic ids, so retrying a failed batch is always safe; reads
/// are parameterized per-call traversals returning rows with path metadata.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("conn", &"SQLite Connection")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            db_path: self.db_path.clone(),
        }
    }
}

/// Row returned by the direct-match read: one row per (entity, document)
#[derive(Debug, Clone)]
pub struct DirectRow {
    pub doc_id: DocumentId,
    pub entity_id: EntityId,
    pub entity_text: String,
}

/// Row returned by the 1-hop expansion read
#[derive(Debug, Clone)]
pub struct ExpansionRow {
    pub doc_id: DocumentId,
    pub source_text: String,
    pub rel_type: RelationType,
    pub target_text: String,
}

/// Row returned by the bounded multi-hop read
#[derive(Debug, Clone)]
pub struct MultiHopRow {
    pub doc_id: DocumentId,
    pub path: TraversalPath,
    pub path_texts: Vec<String>,
}

/// Minimal entity projection used by the canonicalization step
#[derive(Debug, Clone)]
pub struct EntitySummary {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub text: String,
    pub confidence: f32,
}

/// An entity with its incoming and outgoing relationships
#[derive(Debug, Clone, Serialize)]
pub struct EntityDetails {
    pub entity: Entity,
    pub outgoing: Vec<Relationship>,
    pub incoming: Vec<Relationship>,
}

/// Graph-wide statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_counts: HashMap<String, i64>,
    pub relationship_counts: HashMap<String, i64>,
    pub total_nodes: i64,
    pub total_relationships: i64,
    pub total_provenance: i64,
    pub graph_density: f64,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Error,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Error => write!(f, "error"),
        }
    }
}

/// Graph integrity report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Entities with no relationships and no provenance
    pub orphaned_nodes: i64,
    /// Entities with no provenance edge back to any document
    pub broken_references: i64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub timestamp: String,
}

/// Read seam used by the traversal strategies, so the retriever can be
/// exercised against stub stores in tests.
pub trait GraphReader: Send + Sync {
    fn direct_matches(&self, mention: &str, limit: usize) -> Result<Vec<DirectRow>, StoreError>;

    fn expansion_matches(
        &self,
        mention: &str,
        rel_types: &[RelationType],
        limit: usize,
    ) -> Result<Vec<ExpansionRow>, StoreError>;

    fn multi_hop_paths(
        &self,
        mention: &str,
        max_depth: usize,
        limit: usize,
    ) -> Result<Vec<MultiHopRow>, StoreError>;

    fn entity_texts(&self) -> Result<Vec<String>, StoreError>;
}

impl Database {
    /// Create a new database connection, initializing the schema if needed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(&path)?;
        let db_path = path.as_ref().to_string_lossy().to_string();
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create a new Database from a path string
    pub fn from_path(path: &str) -> Result<Self, StoreError> {
        Self::new(path)
    }

    /// Creates a fresh connection to the same database, used to get one
    /// connection per operation so readers and writers never share state
    pub fn new_connection(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Initialize the database schema if needed
    fn initialize_schema(&self) -> Result<(), StoreError> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "CREATE TABLE IF NOT EXISTS schema_version (
                    version INTEGER PRIMARY KEY
                )",
                [],
            )?;
            conn.execute(
                "INSERT OR IGNORE INTO schema_version (version) VALUES (0)",
                [],
            )?;
        }
        self.apply_migrations()?;
        Ok(())
    }

    /// Apply schema migrations as needed
    fn apply_migrations(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

        if version < 1 {
            conn.execute_batch(
                "CREATE TABLE entities (
                    id TEXT PRIMARY KEY,
                    entity_type TEXT NOT NULL,
                    text TEXT NOT NULL,
                    confidence REAL NOT NULL,
                    source TEXT NOT NULL,
                    attributes TEXT NOT NULL DEFAULT '{}'
                );

                CREATE TABLE relationships (
                    id TEXT PRIMARY KEY,
                    source_id TEXT NOT NULL,
                    target_id TEXT NOT NULL,
                    rel_type TEXT NOT NULL,
                    weight REAL,
                    FOREIGN KEY(source_id) REFERENCES entities(id),
                    FOREIGN KEY(target_id) REFERENCES entities(id)
                );

                CREATE TABLE provenance (
                    doc_id TEXT NOT NULL,
                    entity_id TEXT NOT NULL,
                    run_id TEXT NOT NULL,
                    PRIMARY KEY (doc_id, entity_id),
                    FOREIGN KEY(entity_id) REFERENCES entities(id)
                );

                CREATE INDEX idx_entity_text ON entities(text);
                CREATE INDEX idx_entity_type ON entities(entity_type);

                CREATE INDEX idx_rel_source ON relationships(source_id);
                CREATE INDEX idx_rel_target ON relationships(target_id);
                CREATE INDEX idx_rel_type ON relationships(rel_type);

                CREATE INDEX idx_prov_entity ON provenance(entity_id);
                CREATE INDEX idx_prov_doc ON provenance(doc_id);",
            )?;

            conn.execute(
                "UPDATE schema_version SET version = ?",
                params![CURRENT_SCHEMA_VERSION],
            )?;
        }

        // Add more version checks and migrations here for future schema changes

        Ok(())
    }

    /// Write entities, provenance edges and relationships in batches, one
    /// transaction per batch. All entity batches commit before any edge
    /// batch so both endpoints of every edge exist when it is written.
    pub fn write(
        &self,
        entities: &[Entity],
        provenance: &[Provenance],
        relationships: &[Relationship],
        batch_size: usize,
    ) -> Result<(), StoreError> {
        let batch_size = batch_size.max(1);

        for batch in entities.chunks(batch_size) {
            self.write_entity_batch(batch)?;
        }
        for batch in provenance.chunks(batch_size) {
            self.write_provenance_batch(batch)?;
        }
        for batch in relationships.chunks(batch_size) {
            self.write_relationship_batch(batch)?;
        }

        Ok(())
    }

    /// Merge-by-id entity upsert inside a single transaction
    fn write_entity_batch(&self, batch: &[Entity]) -> Result<(), StoreError> {
        let mut conn = self.new_connection()?;
        let tx = conn.transaction()?;

        for entity in batch {
            let attributes_json = serde_json::to_string(&entity.attributes)?;
            tx.execute(
                "INSERT INTO entities (id, entity_type, text, confidence, source, attributes)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     text = excluded.text,
                     confidence = excluded.confidence,
                     source = excluded.source,
                     attributes = excluded.attributes",
                params![
                    entity.id.as_str(),
                    entity.entity_type.to_string(),
                    entity.text,
                    entity.confidence,
                    entity.source.to_string(),
                    attributes_json,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Provenance upsert; re-asserting an edge refreshes its run id
    fn write_provenance_batch(&self, batch: &[Provenance]) -> Result<(), StoreError> {
        let mut conn = self.new_connection()?;
        let tx = conn.transaction()?;

        for edge in batch {
            tx.execute(
                "INSERT INTO provenance (doc_id, entity_id, run_id)
                 VALUES (?, ?, ?)
                 ON CONFLICT(doc_id, entity_id) DO UPDATE SET run_id = excluded.run_id",
                params![edge.doc_id.as_str(), edge.entity_id.as_str(), edge.run_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Merge-by-triple relationship upsert; a re-asserted triple is a no-op
    fn write_relationship_batch(&self, batch: &[Relationship]) -> Result<(), StoreError> {
        let mut conn = self.new_connection()?;
        let tx = conn.transaction()?;

        for rel in batch {
            tx.execute(
                "INSERT OR IGNORE INTO relationships (id, source_id, target_id, rel_type, weight)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    rel.triple_key(),
                    rel.source_id.as_str(),
                    rel.target_id.as_str(),
                    rel.rel_type.to_string(),
                    rel.weight,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load an entity with its provenance and relationships
    pub fn get_entity(&self, id: &EntityId) -> Result<Option<EntityDetails>, StoreError> {
        let conn = self.new_connection()?;

        let row = conn
            .query_row(
                "SELECT id, entity_type, text, confidence, source, attributes
                 FROM entities WHERE id = ?",
                params![id.as_str()],
                |row| {
                    let id: String = row.get(0)?;
                    let entity_type: String = row.get(1)?;
                    let text: String = row.get(2)?;
                    let confidence: f32 = row.get(3)?;
                    let source: String = row.get(4)?;
                    let attributes: String = row.get(5)?;
                    Ok((id, entity_type, text, confidence, source, attributes))
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let (entity_id, type_str, text, confidence, source_str, attributes_json) = match row {
            Some(parts) => parts,
            None => return Ok(None),
        };

        let mut provenance = BTreeSet::new();
        {
            let mut stmt = conn.prepare("SELECT doc_id FROM provenance WHERE entity_id = ?")?;
            let docs = stmt.query_map(params![entity_id], |row| row.get::<_, String>(0))?;
            for doc in docs {
                provenance.insert(DocumentId::new(&doc?));
            }
        }

        let entity = Entity {
            id: EntityId::new(&entity_id),
            entity_type: parse_entity_type(&type_str),
            text,
            confidence,
            provenance,
            source: parse_extraction_source(&source_str),
            attributes: serde_json::from_str(&attributes_json)?,
        };

        let outgoing = self.relationships_where(&conn, "source_id", &entity_id)?;
        let incoming = self.relationships_where(&conn, "target_id", &entity_id)?;

        Ok(Some(EntityDetails {
            entity,
            outgoing,
            incoming,
        }))
    }

    fn relationships_where(
        &self,
        conn: &Connection,
        column: &str,
        entity_id: &str,
    ) -> Result<Vec<Relationship>, StoreError> {
        // column is a fixed identifier supplied by this module, never user input
        let sql = format!(
            "SELECT source_id, rel_type, target_id, weight FROM relationships WHERE {} = ?",
            column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![entity_id], |row| {
            let source: String = row.get(0)?;
            let rel_type: String = row.get(1)?;
            let target: String = row.get(2)?;
            let weight: Option<f32> = row.get(3)?;
            Ok((source, rel_type, target, weight))
        })?;

        let mut relationships = Vec::new();
        for row in rows {
            let (source, rel_type, target, weight) = row?;
            relationships.push(Relationship {
                source_id: EntityId::new(&source),
                rel_type: parse_relation_type(&rel_type),
                target_id: EntityId::new(&target),
                weight,
            });
        }
        Ok(relationships)
    }

    /// Minimal projections of every entity, used by canonicalization
    pub fn entity_summaries(&self) -> Result<Vec<EntitySummary>, StoreError> {
        let conn = self.new_connection()?;
        let mut stmt = conn.prepare("SELECT id, entity_type, text, confidence FROM entities")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let entity_type: String = row.get(1)?;
            let text: String = row.get(2)?;
            let confidence: f32 = row.get(3)?;
            Ok((id, entity_type, text, confidence))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, entity_type, text, confidence) = row?;
            summaries.push(EntitySummary {
                id: EntityId::new(&id),
                entity_type: parse_entity_type(&entity_type),
                text,
                confidence,
            });
        }
        Ok(summaries)
    }

    /// Node, edge and provenance row counts
    pub fn counts(&self) -> Result<(i64, i64, i64), StoreError> {
        let conn = self.new_connection()?;
        let nodes: i64 = conn.query_row("SELECT count(*) FROM entities", [], |row| row.get(0))?;
        let edges: i64 =
            conn.query_row("SELECT count(*) FROM relationships", [], |row| row.get(0))?;
        let provenance: i64 =
            conn.query_row("SELECT count(*) FROM provenance", [], |row| row.get(0))?;
        Ok((nodes, edges, provenance))
    }

    /// Comprehensive graph statistics: counts by type, totals and density
    pub fn statistics(&self) -> Result<GraphStatistics, StoreError> {
        let conn = self.new_connection()?;

        let mut node_counts = HashMap::new();
        {
            let mut stmt =
                conn.prepare("SELECT entity_type, count(*) FROM entities GROUP BY entity_type")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (entity_type, count) = row?;
                node_counts.insert(entity_type, count);
            }
        }

        let mut relationship_counts = HashMap::new();
        {
            let mut stmt =
                conn.prepare("SELECT rel_type, count(*) FROM relationships GROUP BY rel_type")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (rel_type, count) = row?;
                relationship_counts.insert(rel_type, count);
            }
        }

        let total_nodes: i64 =
            conn.query_row("SELECT count(*) FROM entities", [], |row| row.get(0))?;
        let total_relationships: i64 =
            conn.query_row("SELECT count(*) FROM relationships", [], |row| row.get(0))?;
        let total_provenance: i64 =
            conn.query_row("SELECT count(*) FROM provenance", [], |row| row.get(0))?;

        // Directed graph density: edges / (n * (n - 1))
        let graph_density = if total_nodes > 1 {
            total_relationships as f64 / (total_nodes as f64 * (total_nodes - 1) as f64)
        } else {
            0.0
        };

        Ok(GraphStatistics {
            node_counts,
            relationship_counts,
            total_nodes,
            total_relationships,
            total_provenance,
            graph_density,
            last_updated: Utc::now().to_rfc3339(),
        })
    }

    /// Graph integrity check. Never fails: store errors surface as an
    /// `Error` status so callers can always report health.
    pub fn health_check(&self) -> HealthReport {
        match self.health_check_inner() {
            Ok(report) => report,
            Err(e) => HealthReport {
                status: HealthStatus::Error,
                orphaned_nodes: 0,
                broken_references: 0,
                warnings: Vec::new(),
                errors: vec![e.to_string()],
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }

    fn health_check_inner(&self) -> Result<HealthReport, StoreError> {
        let conn = self.new_connection()?;

        let orphaned_nodes: i64 = conn.query_row(
            "SELECT count(*) FROM entities e
             WHERE NOT EXISTS (
                 SELECT 1 FROM relationships r
                 WHERE r.source_id = e.id OR r.target_id = e.id
             )
             AND NOT EXISTS (SELECT 1 FROM provenance p WHERE p.entity_id = e.id)",
            [],
            |row| row.get(0),
        )?;

        let broken_references: i64 = conn.query_row(
            "SELECT count(*) FROM entities e
             WHERE NOT EXISTS (SELECT 1 FROM provenance p WHERE p.entity_id = e.id)",
            [],
            |row| row.get(0),
        )?;

        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if orphaned_nodes > 100 {
            warnings.push(format!("{} orphaned nodes detected", orphaned_nodes));
        }
        if broken_references > 0 {
            errors.push(format!(
                "{} entities with no provenance document",
                broken_references
            ));
        }

        let status = if !errors.is_empty() {
            HealthStatus::Unhealthy
        } else if !warnings.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Ok(HealthReport {
            status,
            orphaned_nodes,
            broken_references,
            warnings,
            errors,
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

impl GraphReader for Database {
    /// Documents with a provenance edge to an entity whose text contains
    /// the mention, case-insensitively; one row per (entity, document)
    fn direct_matches(&self, mention: &str, limit: usize) -> Result<Vec<DirectRow>, StoreError> {
        let conn = self.new_connection()?;
        let mut stmt = conn.prepare(
            "SELECT p.doc_id, e.id, e.text
             FROM entities e
             JOIN provenance p ON p.entity_id = e.id
             WHERE instr(lower(e.text), lower(?1)) > 0
             ORDER BY p.doc_id, e.id
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![mention, limit as i64], |row| {
            let doc_id: String = row.get(0)?;
            let entity_id: String = row.get(1)?;
            let entity_text: String = row.get(2)?;
            Ok((doc_id, entity_id, entity_text))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let (doc_id, entity_id, entity_text) = row?;
            matches.push(DirectRow {
                doc_id: DocumentId::new(&doc_id),
                entity_id: EntityId::new(&entity_id),
                entity_text,
            });
        }
        Ok(matches)
    }

    /// One hop from matched entities over a restricted relation set, in
    /// either direction, to documents referencing the adjacent entity
    fn expansion_matches(
        &self,
        mention: &str,
        rel_types: &[RelationType],
        limit: usize,
    ) -> Result<Vec<ExpansionRow>, StoreError> {
        if rel_types.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.new_connection()?;
        let placeholders = vec!["?"; rel_types.len()].join(", ");
        let sql = format!(
            "SELECT p.doc_id, e.text, r.rel_type, adj.text
             FROM entities e
             JOIN relationships r ON r.source_id = e.id OR r.target_id = e.id
             JOIN entities adj
               ON adj.id = CASE WHEN r.source_id = e.id THEN r.target_id ELSE r.source_id END
             JOIN provenance p ON p.entity_id = adj.id
             WHERE instr(lower(e.text), lower(?)) > 0
               AND r.rel_type IN ({})
             ORDER BY p.doc_id, adj.id
             LIMIT ?",
            placeholders
        );

        let mut values: Vec<Value> = Vec::with_capacity(rel_types.len() + 2);
        values.push(Value::Text(mention.to_string()));
        for rel_type in rel_types {
            values.push(Value::Text(rel_type.to_string()));
        }
        values.push(Value::Integer(limit as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            let doc_id: String = row.get(0)?;
            let source_text: String = row.get(1)?;
            let rel_type: String = row.get(2)?;
            let target_text: String = row.get(3)?;
            Ok((doc_id, source_text, rel_type, target_text))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let (doc_id, source_text, rel_type, target_text) = row?;
            matches.push(ExpansionRow {
                doc_id: DocumentId::new(&doc_id),
                source_text,
                rel_type: parse_relation_type(&rel_type),
                target_text,
            });
        }
        Ok(matches)
    }

    /// Bounded multi-hop walk over any relation type using a recursive CTE.
    /// Paths are cycle-free and returned shortest-first with full node and
    /// relation metadata for explanation.
    fn multi_hop_paths(
        &self,
        mention: &str,
        max_depth: usize,
        limit: usize,
    ) -> Result<Vec<MultiHopRow>, StoreError> {
        let conn = self.new_connection()?;
        let mut stmt = conn.prepare(
            "WITH RECURSIVE walk(entity_id, path_ids, path_texts, path_rels, depth) AS (
                 SELECT e.id, e.id, e.text, '', 0
                 FROM entities e
                 WHERE instr(lower(e.text), lower(?1)) > 0
                 UNION ALL
                 SELECT
                     nxt.id,
                     w.path_ids || char(31) || nxt.id,
                     w.path_texts || char(31) || nxt.text,
                     CASE WHEN w.path_rels = ''
                          THEN r.rel_type
                          ELSE w.path_rels || char(31) || r.rel_type END,
                     w.depth + 1
                 FROM walk w
                 JOIN relationships r
                   ON r.source_id = w.entity_id OR r.target_id = w.entity_id
                 JOIN entities nxt
                   ON nxt.id = CASE WHEN r.source_id = w.entity_id
                                    THEN r.target_id ELSE r.source_id END
                 WHERE w.depth < ?2
                   AND instr(w.path_ids, nxt.id) = 0
             )
             SELECT p.doc_id, w.path_ids, w.path_texts, w.path_rels, w.depth
             FROM walk w
             JOIN provenance p ON p.entity_id = w.entity_id
             WHERE w.depth > 0
             ORDER BY w.depth ASC, p.doc_id
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![mention, max_depth as i64, limit as i64],
            |row| {
                let doc_id: String = row.get(0)?;
                let path_ids: String = row.get(1)?;
                let path_texts: String = row.get(2)?;
                let path_rels: String = row.get(3)?;
                let depth: i64 = row.get(4)?;
                Ok((doc_id, path_ids, path_texts, path_rels, depth))
            },
        )?;

        let mut matches = Vec::new();
        for row in rows {
            let (doc_id, path_ids, path_texts, path_rels, depth) = row?;
            let entity_ids = path_ids
                .split(PATH_SEP)
                .map(EntityId::new)
                .collect::<Vec<_>>();
            let relation_types = if path_rels.is_empty() {
                Vec::new()
            } else {
                path_rels
                    .split(PATH_SEP)
                    .map(parse_relation_type)
                    .collect()
            };
            matches.push(MultiHopRow {
                doc_id: DocumentId::new(&doc_id),
                path: TraversalPath {
                    entity_ids,
                    relation_types,
                    hop_count: depth as usize,
                },
                path_texts: path_texts.split(PATH_SEP).map(str::to_string).collect(),
            });
        }
        Ok(matches)
    }

    /// Distinct entity texts, used as the resolver's known-entity index
    fn entity_texts(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.new_connection()?;
        let mut stmt = conn.prepare("SELECT DISTINCT text FROM entities")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut texts = Vec::new();
        for row in rows {
            texts.push(row?);
        }
        Ok(texts)
    }
}
