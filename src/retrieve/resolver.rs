use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::GraphReader;
use crate::extract::recognizer::Recognizer;

/// Recognizer labels accepted for query mentions. Mirrors the set the
/// extraction side stores, so a resolved mention can actually match a node.
const QUERY_LABELS: [&str; 5] = ["ORG", "GPE", "PERSON", "DATE", "MONEY"];

/// Shorter known texts produce too many accidental substring hits
const MIN_KNOWN_TEXT_LEN: usize = 3;

static VISA_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(Skilled Worker|Student|Family|Tourist|Entrepreneur|Graduate|Parent|Partner|Settlement)",
    )
    .unwrap()
});

static DOCUMENT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(passport|bank statement|marriage certificate|degree|IELTS|English test)")
        .unwrap()
});

/// Resolves free-text queries into entity mentions the traversal strategies
/// can anchor on. Combines an optional statistical recognizer, a substring
/// index over texts already in the graph, and domain keyword patterns.
pub struct EntityResolver {
    known_texts: Vec<String>,
    recognizer: Option<Arc<dyn Recognizer>>,
}

impl EntityResolver {
    pub fn new(known_texts: Vec<String>, recognizer: Option<Arc<dyn Recognizer>>) -> Self {
        Self {
            known_texts,
            recognizer,
        }
    }

    /// Build a resolver backed by the graph's current entity texts. A store
    /// failure degrades to keyword-only resolution rather than erroring;
    /// resolution is best-effort by design.
    pub fn from_reader(
        reader: &dyn GraphReader,
        recognizer: Option<Arc<dyn Recognizer>>,
    ) -> Self {
        let known_texts = match reader.entity_texts() {
            Ok(texts) => texts,
            Err(e) => {
                tracing::warn!("could not load known entity texts: {}", e);
                Vec::new()
            }
        };
        Self::new(known_texts, recognizer)
    }

    /// Extract mentions from a query, order-preserving and case-insensitively
    /// deduplicated. An empty result means the query has no graph anchor.
    pub fn resolve(&self, query: &str) -> Vec<String> {
        let mut mentions = Vec::new();

        if let Some(recognizer) = &self.recognizer {
            match recognizer.recognize(query) {
                Ok(spans) => {
                    for span in spans {
                        if QUERY_LABELS.contains(&span.label.as_str()) {
                            mentions.push(span.text);
                        }
                    }
                }
                Err(e) => tracing::warn!("query recognizer failed: {}", e),
            }
        }

        let query_lower = query.to_lowercase();
        for text in &self.known_texts {
            if text.len() >= MIN_KNOWN_TEXT_LEN && query_lower.contains(&text.to_lowercase()) {
                mentions.push(text.clone());
            }
        }

        for found in VISA_KEYWORDS.find_iter(query) {
            mentions.push(found.as_str().to_string());
        }
        for found in DOCUMENT_KEYWORDS.find_iter(query) {
            mentions.push(found.as_str().to_string());
        }

        let mut seen = HashSet::new();
        mentions.retain(|m| seen.insert(m.to_lowercase()));
        mentions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::extract::recognizer::RecognizedSpan;

    #[test]
    fn test_keyword_resolution_without_recognizer() {
        let resolver = EntityResolver::new(Vec::new(), None);
        let mentions = resolver.resolve("What documents do I need for a Skilled Worker visa?");
        assert_eq!(mentions, vec!["Skilled Worker"]);
    }

    #[test]
    fn test_known_texts_matched_by_substring() {
        let resolver = EntityResolver::new(vec!["proof of funds".to_string()], None);
        let mentions = resolver.resolve("How do I show Proof of Funds?");
        assert_eq!(mentions, vec!["proof of funds"]);
    }

    #[test]
    fn test_dedup_is_case_insensitive_and_order_preserving() {
        let resolver = EntityResolver::new(vec!["skilled worker".to_string()], None);
        let mentions = resolver.resolve("Skilled Worker visa: does the skilled worker route need IELTS?");
        assert_eq!(mentions, vec!["skilled worker", "IELTS"]);
    }

    #[test]
    fn test_empty_query_resolves_to_nothing() {
        let resolver = EntityResolver::new(vec!["passport".to_string()], None);
        assert!(resolver.resolve("how long does it take").is_empty());
    }

    struct StubRecognizer;

    impl Recognizer for StubRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedSpan>, ExtractError> {
            Ok(vec![
                RecognizedSpan {
                    start: 0,
                    end: 11,
                    label: "ORG".to_string(),
                    text: "Home Office".to_string(),
                },
                RecognizedSpan {
                    start: 12,
                    end: 17,
                    label: "CARDINAL".to_string(),
                    text: "three".to_string(),
                },
            ])
        }
    }

    #[test]
    fn test_recognizer_labels_filtered() {
        let resolver = EntityResolver::new(Vec::new(), Some(Arc::new(StubRecognizer)));
        let mentions = resolver.resolve("Home Office three");
        assert_eq!(mentions, vec!["Home Office"]);
    }
}
