use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractError;
use crate::graph::entity::{Entity, EntityType, ExtractionSource, SourceDocument};

/// Confidence assigned to semantic-pass output. The model reads meaning the
/// patterns cannot, but it also hallucinates, so it ranks below both.
pub const SEMANTIC_CONFIDENCE: f32 = 0.7;

/// Only this many characters of a document are sent to the model
const PROMPT_TEXT_LIMIT: usize = 4000;

/// Seam for the model backend. Takes a fully rendered prompt, returns the
/// raw completion text; all parsing happens on this side of the seam.
#[async_trait]
pub trait SemanticExtractor: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractError>;
}

/// Structured output schema requested from the model
#[derive(Debug, Default, Deserialize)]
pub struct SemanticPayload {
    #[serde(default)]
    pub requirements: Vec<Value>,
    #[serde(default)]
    pub conditions: Vec<Value>,
    #[serde(default)]
    pub processes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RequirementItem {
    text: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default = "default_mandatory")]
    mandatory: bool,
}

fn default_category() -> String {
    "other".to_string()
}

fn default_mandatory() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ConditionItem {
    text: String,
    #[serde(default)]
    applies_to: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessItem {
    name: String,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    duration: Option<String>,
}

/// Render the extraction prompt for one document, truncated to keep cost down
pub fn extraction_prompt(doc: &SourceDocument) -> String {
    let content: String = doc.text.chars().take(PROMPT_TEXT_LIMIT).collect();
    format!(
        r#"Extract immigration visa requirements and conditions from this UK immigration document text.

Text: {content}

Return ONLY valid JSON with this exact structure (no markdown, no explanations):
{{
    "requirements": [
        {{"text": "requirement description", "category": "financial|documents|english|health|other", "mandatory": true}}
    ],
    "conditions": [
        {{"text": "condition description", "applies_to": ["visa type names"]}}
    ],
    "processes": [
        {{"name": "process name", "steps": ["step 1", "step 2"], "duration": "estimate or null"}}
    ]
}}

If no entities found, return: {{"requirements": [], "conditions": [], "processes": []}}"#
    )
}

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").unwrap());

/// Parse the model response. Models wrap JSON in markdown fences despite the
/// prompt, so a fenced block is unwrapped before giving up.
pub fn parse_semantic_payload(raw: &str) -> Result<SemanticPayload, ExtractError> {
    if let Ok(payload) = serde_json::from_str(raw) {
        return Ok(payload);
    }
    if let Some(captures) = FENCED_JSON.captures(raw) {
        if let Ok(payload) = serde_json::from_str(&captures[1]) {
            return Ok(payload);
        }
    }
    let preview: String = raw.chars().take(200).collect();
    Err(ExtractError::InvalidSemanticOutput(preview))
}

/// Turn a parsed payload into entities. Each list item is decoded on its
/// own; an item missing a required field is dropped with a warning while the
/// rest of the payload survives.
pub fn payload_entities(doc: &SourceDocument, payload: &SemanticPayload) -> Vec<Entity> {
    let mut entities = Vec::new();

    for item in &payload.requirements {
        match serde_json::from_value::<RequirementItem>(item.clone()) {
            Ok(req) => {
                entities.push(
                    Entity::new(
                        &doc.id,
                        EntityType::Requirement,
                        req.text,
                        SEMANTIC_CONFIDENCE,
                        ExtractionSource::Semantic,
                    )
                    .with_attribute("category", &req.category)
                    .with_attribute("mandatory", &req.mandatory.to_string()),
                );
            }
            Err(e) => tracing::warn!("dropping malformed requirement in {}: {}", doc.id, e),
        }
    }

    for item in &payload.conditions {
        match serde_json::from_value::<ConditionItem>(item.clone()) {
            Ok(cond) => {
                let mut entity = Entity::new(
                    &doc.id,
                    EntityType::Condition,
                    cond.text,
                    SEMANTIC_CONFIDENCE,
                    ExtractionSource::Semantic,
                );
                if !cond.applies_to.is_empty() {
                    entity = entity.with_attribute("applies_to", &cond.applies_to.join(", "));
                }
                entities.push(entity);
            }
            Err(e) => tracing::warn!("dropping malformed condition in {}: {}", doc.id, e),
        }
    }

    for item in &payload.processes {
        match serde_json::from_value::<ProcessItem>(item.clone()) {
            Ok(proc) => {
                let mut entity = Entity::new(
                    &doc.id,
                    EntityType::Process,
                    proc.name,
                    SEMANTIC_CONFIDENCE,
                    ExtractionSource::Semantic,
                );
                if !proc.steps.is_empty() {
                    entity = entity.with_attribute("steps", &proc.steps.join("; "));
                }
                if let Some(duration) = proc.duration {
                    entity = entity.with_attribute("duration_estimate", &duration);
                }
                entities.push(entity);
            }
            Err(e) => tracing::warn!("dropping malformed process in {}: {}", doc.id, e),
        }
    }

    entities
}

/// Third extraction pass: structured extraction through the model. A model
/// or parse failure degrades this pass to empty output for the document.
pub async fn semantic_entities(
    doc: &SourceDocument,
    extractor: &dyn SemanticExtractor,
) -> Vec<Entity> {
    if doc.text.trim().is_empty() {
        return Vec::new();
    }

    let prompt = extraction_prompt(doc);
    let raw = match extractor.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("semantic extraction failed for document {}: {}", doc.id, e);
            return Vec::new();
        }
    };

    match parse_semantic_payload(&raw) {
        Ok(payload) => payload_entities(doc, &payload),
        Err(e) => {
            tracing::warn!("unparseable semantic output for document {}: {}", doc.id, e);
            Vec::new()
        }
    }
}
