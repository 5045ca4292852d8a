use serde::Serialize;
use std::fmt;

use crate::config::ScoringConfig;
use crate::db::GraphReader;
use crate::error::RetrieveError;
use crate::graph::entity::DocumentId;
use crate::graph::relationship::RelationType;

/// Relations followed by the 1-hop expansion strategy. ALIAS_OF and
/// RELATES_TO are deliberately excluded; they carry no retrieval intent.
pub const EXPANSION_RELATIONS: [RelationType; 5] = [
    RelationType::Requires,
    RelationType::SatisfiedBy,
    RelationType::DependsOn,
    RelationType::AppliesIf,
    RelationType::CanTransitionTo,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Direct,
    Expansion,
    MultiHop,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Direct => write!(f, "direct"),
            Strategy::Expansion => write!(f, "expansion"),
            Strategy::MultiHop => write!(f, "multihop"),
        }
    }
}

/// One document hit produced by one strategy, before merging
#[derive(Debug, Clone)]
pub struct StrategyHit {
    pub doc_id: DocumentId,
    pub score: f64,
    pub strategy: Strategy,
    /// Entity text the query anchored on (direct hits)
    pub matched_entity: Option<String>,
    /// (source text, relation, target text) for expansion hits
    pub expansion: Option<(String, RelationType, String)>,
    /// Entity texts along the walk (multi-hop hits)
    pub path_texts: Option<Vec<String>>,
    pub path_relations: Option<Vec<RelationType>>,
    /// Distance from the anchor: 0 direct, 1 expansion, walk length multi-hop
    pub hop_count: usize,
}

fn strategy_error(strategy: Strategy, e: impl fmt::Display) -> RetrieveError {
    RetrieveError::Strategy {
        strategy: strategy.to_string(),
        message: e.to_string(),
    }
}

/// Documents whose entities contain a queried mention
pub fn direct_strategy(
    reader: &dyn GraphReader,
    mentions: &[String],
    scoring: &ScoringConfig,
    row_limit: usize,
) -> Result<Vec<StrategyHit>, RetrieveError> {
    let mut hits = Vec::new();
    for mention in mentions {
        let rows = reader
            .direct_matches(mention, row_limit)
            .map_err(|e| strategy_error(Strategy::Direct, e))?;
        for row in rows {
            hits.push(StrategyHit {
                doc_id: row.doc_id,
                score: scoring.direct,
                strategy: Strategy::Direct,
                matched_entity: Some(row.entity_text),
                expansion: None,
                path_texts: None,
                path_relations: None,
                hop_count: 0,
            });
        }
    }
    tracing::debug!("direct strategy produced {} hits", hits.len());
    Ok(hits)
}

/// Documents one relation away from a matched entity
pub fn expansion_strategy(
    reader: &dyn GraphReader,
    mentions: &[String],
    scoring: &ScoringConfig,
    row_limit: usize,
) -> Result<Vec<StrategyHit>, RetrieveError> {
    let mut hits = Vec::new();
    for mention in mentions {
        let rows = reader
            .expansion_matches(mention, &EXPANSION_RELATIONS, row_limit)
            .map_err(|e| strategy_error(Strategy::Expansion, e))?;
        for row in rows {
            hits.push(StrategyHit {
                doc_id: row.doc_id,
                score: scoring.expansion,
                strategy: Strategy::Expansion,
                matched_entity: Some(row.source_text.clone()),
                expansion: Some((row.source_text, row.rel_type, row.target_text)),
                path_texts: None,
                path_relations: None,
                hop_count: 1,
            });
        }
    }
    tracing::debug!("expansion strategy produced {} hits", hits.len());
    Ok(hits)
}

/// Documents reached by bounded walks; score decays with walk length
pub fn multi_hop_strategy(
    reader: &dyn GraphReader,
    mentions: &[String],
    max_depth: usize,
    scoring: &ScoringConfig,
    row_limit: usize,
) -> Result<Vec<StrategyHit>, RetrieveError> {
    let mut hits = Vec::new();
    for mention in mentions {
        let rows = reader
            .multi_hop_paths(mention, max_depth, row_limit)
            .map_err(|e| strategy_error(Strategy::MultiHop, e))?;
        for row in rows {
            let hop_count = row.path.hop_count.max(1);
            hits.push(StrategyHit {
                doc_id: row.doc_id,
                score: scoring.multi_hop_base / hop_count as f64,
                strategy: Strategy::MultiHop,
                matched_entity: row.path_texts.first().cloned(),
                expansion: None,
                path_texts: Some(row.path_texts),
                path_relations: Some(row.path.relation_types),
                hop_count,
            });
        }
    }
    tracing::debug!("multi-hop strategy produced {} hits", hits.len());
    Ok(hits)
}
