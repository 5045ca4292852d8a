use std::collections::HashSet;

use crate::graph::entity::{Entity, EntityType, SourceDocument};
use crate::graph::relationship::{Provenance, RelationType, Relationship};

/// Typed pairs eligible for sentence co-occurrence inference. Pairing is
/// restricted to combinations whose direction is unambiguous; free pairing
/// of everything with everything drowns the graph in noise.
const ALLOWED_PAIRS: [(EntityType, EntityType, RelationType); 3] = [
    (
        EntityType::VisaType,
        EntityType::Requirement,
        RelationType::Requires,
    ),
    (
        EntityType::Requirement,
        EntityType::DocumentType,
        RelationType::SatisfiedBy,
    ),
    (
        EntityType::VisaType,
        EntityType::Condition,
        RelationType::AppliesIf,
    ),
];

/// Infer relationships by sentence co-occurrence and record provenance for
/// every extracted entity. A sentence mentioning more entities than the cap
/// contributes provenance only, never pairs; dense sentences are usually
/// lists where pairwise edges are meaningless.
pub fn infer_relationships(
    doc: &SourceDocument,
    entities: &[Entity],
    sentence_entity_cap: usize,
    run_id: &str,
) -> (Vec<Relationship>, Vec<Provenance>) {
    let mut relationships = Vec::new();
    let mut seen_triples = HashSet::new();

    for sentence in doc.text.split('.') {
        let sentence_lower = sentence.to_lowercase();
        if sentence_lower.trim().is_empty() {
            continue;
        }

        let in_sentence: Vec<&Entity> = entities
            .iter()
            .filter(|e| !e.text.is_empty() && sentence_lower.contains(&e.text.to_lowercase()))
            .collect();

        if in_sentence.len() > sentence_entity_cap {
            tracing::debug!(
                "sentence in {} mentions {} entities, over cap {}; skipping pairing",
                doc.id,
                in_sentence.len(),
                sentence_entity_cap
            );
            continue;
        }

        for (source_type, target_type, rel_type) in &ALLOWED_PAIRS {
            for source in in_sentence.iter().filter(|e| e.entity_type == *source_type) {
                for target in in_sentence.iter().filter(|e| e.entity_type == *target_type) {
                    if source.id == target.id {
                        continue;
                    }
                    let rel = Relationship::new(
                        source.id.clone(),
                        rel_type.clone(),
                        target.id.clone(),
                    );
                    if seen_triples.insert(rel.triple_key()) {
                        relationships.push(rel);
                    }
                }
            }
        }
    }

    let mut provenance = Vec::new();
    let mut seen_entities = HashSet::new();
    for entity in entities {
        if seen_entities.insert(entity.id.clone()) {
            provenance.push(Provenance::new(doc.id.clone(), entity.id.clone(), run_id));
        }
    }

    (relationships, provenance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entity::{DocumentId, ExtractionSource};

    fn entity(doc: &SourceDocument, text: &str, entity_type: EntityType) -> Entity {
        Entity::new(
            &doc.id,
            entity_type,
            text.to_string(),
            0.9,
            ExtractionSource::Pattern,
        )
    }

    #[test]
    fn test_cooccurring_visa_and_requirement_linked() {
        let doc = SourceDocument::new(
            "d1",
            "The Skilled Worker visa requires proof of funds. A separate sentence.",
        );
        let visa = entity(&doc, "Skilled Worker visa", EntityType::VisaType);
        let req = entity(&doc, "proof of funds", EntityType::Requirement);

        let (rels, prov) = infer_relationships(&doc, &[visa.clone(), req.clone()], 20, "run-1");

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, visa.id);
        assert_eq!(rels[0].rel_type, RelationType::Requires);
        assert_eq!(rels[0].target_id, req.id);
        assert_eq!(prov.len(), 2);
        assert!(prov.iter().all(|p| p.doc_id == DocumentId::new("d1")));
        assert!(prov.iter().all(|p| p.run_id == "run-1"));
    }

    #[test]
    fn test_entities_in_different_sentences_not_linked() {
        let doc = SourceDocument::new(
            "d1",
            "The Skilled Worker visa is popular. Applicants show proof of funds.",
        );
        let visa = entity(&doc, "Skilled Worker visa", EntityType::VisaType);
        let req = entity(&doc, "proof of funds", EntityType::Requirement);

        let (rels, _) = infer_relationships(&doc, &[visa, req], 20, "run-1");
        assert!(rels.is_empty());
    }

    #[test]
    fn test_disallowed_pair_not_linked() {
        let doc = SourceDocument::new("d1", "Bring your passport to the Home Office.");
        let document = entity(&doc, "passport", EntityType::DocumentType);
        let org = entity(&doc, "Home Office", EntityType::Organization);

        let (rels, _) = infer_relationships(&doc, &[document, org], 20, "run-1");
        assert!(rels.is_empty());
    }

    #[test]
    fn test_satisfied_by_direction() {
        let doc = SourceDocument::new("d1", "Proof of funds is satisfied by a bank statement.");
        let req = entity(&doc, "proof of funds", EntityType::Requirement);
        let bank = entity(&doc, "bank statement", EntityType::DocumentType);

        let (rels, _) = infer_relationships(&doc, &[req.clone(), bank.clone()], 20, "run-1");
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, req.id);
        assert_eq!(rels[0].rel_type, RelationType::SatisfiedBy);
        assert_eq!(rels[0].target_id, bank.id);
    }

    #[test]
    fn test_sentence_over_cap_yields_provenance_only() {
        let doc = SourceDocument::new(
            "d1",
            "Skilled Worker visa needs proof of funds and an English test.",
        );
        let visa = entity(&doc, "Skilled Worker visa", EntityType::VisaType);
        let req_a = entity(&doc, "proof of funds", EntityType::Requirement);
        let req_b = entity(&doc, "English test", EntityType::Requirement);

        let (rels, prov) = infer_relationships(&doc, &[visa, req_a, req_b], 2, "run-1");
        assert!(rels.is_empty());
        assert_eq!(prov.len(), 3);
    }

    #[test]
    fn test_repeated_cooccurrence_deduplicated() {
        let doc = SourceDocument::new(
            "d1",
            "Skilled Worker visa needs proof of funds. The Skilled Worker visa checks proof of funds again.",
        );
        let visa = entity(&doc, "Skilled Worker visa", EntityType::VisaType);
        let req = entity(&doc, "proof of funds", EntityType::Requirement);

        let (rels, _) = infer_relationships(&doc, &[visa, req], 20, "run-1");
        assert_eq!(rels.len(), 1);
    }

    #[test]
    fn test_duplicate_entity_single_provenance_edge() {
        let doc = SourceDocument::new("d1", "passport, then passport again.");
        let a = entity(&doc, "passport", EntityType::DocumentType);
        let b = entity(&doc, "passport", EntityType::DocumentType);
        assert_eq!(a.id, b.id);

        let (_, prov) = infer_relationships(&doc, &[a, b], 20, "run-1");
        assert_eq!(prov.len(), 1);
    }
}
