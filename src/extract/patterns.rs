use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::entity::{DocumentId, Entity, EntityType, ExtractionSource, SourceDocument};

/// Confidence assigned to pattern matches. Patterns are hand-written for the
/// domain, so they outrank the statistical and semantic passes.
pub const PATTERN_CONFIDENCE: f32 = 0.9;

static VISA_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(Skilled Worker|Student|Family|Tourist|Entrepreneur|Innovator|Graduate|Health and Care Worker|Global Talent|Start-up|Intra-Company Transfer|Minister of Religion|Sportsperson|Representative of an Overseas Business|Temporary Worker|Seasonal Worker|Creative Worker|Charity Worker|Religious Worker|Youth Mobility|Parent|Partner|Child|Adult Dependent Relative|Settlement|Indefinite Leave to Remain|British Citizenship)\s*(?:visa|route)?",
    )
    .unwrap()
});

// e.g. T2, T4, T5, PBS. Case-sensitive: "t2" in prose is not a visa code.
static VISA_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(T[1-5]|PBS)\b").unwrap());

static DOCUMENT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(passport|birth certificate|marriage certificate|divorce certificate|death certificate|bank statement|payslip|P60|employment contract|sponsor licence|certificate of sponsorship|CAS|degree certificate|academic transcript|English language test|IELTS|TOEFL|PTE|SELT|tuberculosis test|TB certificate|police certificate|criminal record check|DBS check|tenancy agreement|mortgage statement|utility bill|council tax bill|NHS registration|travel itinerary|flight booking|accommodation booking)",
    )
    .unwrap()
});

static TIME_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s*(day|week|month|year|hour)s?").unwrap());

static MONEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"£\d+(?:,\d{3})*(?:\.\d{2})?").unwrap());

/// Obligation phrasing used by the resolver to spot requirement-shaped
/// queries. Not an entity pattern by itself.
pub static REQUIREMENT_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(must|required to|need to|should|have to|necessary to|mandatory)\s+(provide|submit|demonstrate|show|have|hold|meet|satisfy)",
    )
    .unwrap()
});

/// First extraction pass: domain regex patterns over the raw document text.
/// Every match becomes an entity with a deterministic id, so repeated
/// extraction of the same document converges instead of duplicating.
pub fn pattern_entities(doc: &SourceDocument) -> Vec<Entity> {
    let mut entities = Vec::new();
    let passes: [(&Lazy<Regex>, EntityType); 5] = [
        (&VISA_TYPE, EntityType::VisaType),
        (&VISA_CODE, EntityType::VisaCode),
        (&DOCUMENT_TYPE, EntityType::DocumentType),
        (&TIME_PERIOD, EntityType::TimePeriod),
        (&MONEY, EntityType::MonetaryValue),
    ];

    for (pattern, entity_type) in passes {
        for found in pattern.find_iter(&doc.text) {
            let text = found.as_str().trim();
            if text.is_empty() {
                continue;
            }
            entities.push(entity_from_span(&doc.id, text, entity_type.clone()));
        }
    }

    entities
}

fn entity_from_span(doc_id: &DocumentId, text: &str, entity_type: EntityType) -> Entity {
    Entity::new(
        doc_id,
        entity_type,
        text.to_string(),
        PATTERN_CONFIDENCE,
        ExtractionSource::Pattern,
    )
}
