use serde::Serialize;
use std::collections::HashMap;

use crate::graph::entity::DocumentId;

use super::strategies::StrategyHit;

/// Why a document ranked where it did
#[derive(Debug, Clone, Default, Serialize)]
pub struct Explanation {
    /// Strategies that contributed to the score
    pub strategies: Vec<String>,
    /// Entity texts the query anchored on
    pub matched_entities: Vec<String>,
    /// 1-hop expansions, rendered as "source -RELATION-> target"
    pub expansions: Vec<String>,
    /// Multi-hop walks, rendered node by node
    pub paths: Vec<String>,
}

/// A document after merging, with its combined score and explanation
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    pub doc_id: DocumentId,
    pub score: f64,
    /// Shortest graph distance that reached this document
    pub min_hop: usize,
    pub explanation: Explanation,
}

fn render_path(texts: &[String], relations: &[impl ToString]) -> String {
    let mut rendered = String::new();
    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            let relation = relations
                .get(i - 1)
                .map(|r| r.to_string())
                .unwrap_or_else(|| "?".to_string());
            rendered.push_str(&format!(" -[{}]-> ", relation));
        }
        rendered.push_str(text);
    }
    rendered
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Merge strategy hits into a ranked document list. Scores are additive
/// across strategies. Ordering is total: score descending, then shortest
/// hop distance, then document id, so equal inputs always produce equal
/// output.
pub fn merge_and_rank(hits: Vec<StrategyHit>, top_k: usize) -> Vec<RankedDocument> {
    let mut by_doc: HashMap<DocumentId, RankedDocument> = HashMap::new();

    for hit in hits {
        let entry = by_doc
            .entry(hit.doc_id.clone())
            .or_insert_with(|| RankedDocument {
                doc_id: hit.doc_id.clone(),
                score: 0.0,
                min_hop: hit.hop_count,
                explanation: Explanation::default(),
            });

        entry.score += hit.score;
        entry.min_hop = entry.min_hop.min(hit.hop_count);

        push_unique(&mut entry.explanation.strategies, hit.strategy.to_string());
        if let Some(matched) = hit.matched_entity {
            push_unique(&mut entry.explanation.matched_entities, matched);
        }
        if let Some((source, relation, target)) = hit.expansion {
            push_unique(
                &mut entry.explanation.expansions,
                format!("{} -{}-> {}", source, relation, target),
            );
        }
        if let (Some(texts), Some(relations)) = (hit.path_texts, hit.path_relations) {
            push_unique(&mut entry.explanation.paths, render_path(&texts, &relations));
        }
    }

    let mut ranked: Vec<RankedDocument> = by_doc.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.min_hop.cmp(&b.min_hop))
            .then_with(|| a.doc_id.as_str().cmp(b.doc_id.as_str()))
    });
    ranked.truncate(top_k);
    ranked
}
