use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

// ============================================================================
// INPUT TYPES
// ============================================================================

/// One listing to process, in run input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub url: Url,
}

impl Listing {
    /// The review-tab fragment only selects a tab on the rendered page, so it
    /// is stripped before the URL identifies a listing.
    pub fn new(id: i64, mut url: Url) -> Self {
        if url
            .fragment()
            .is_some_and(|f| f.starts_with("tab-reviews"))
        {
            url.set_fragment(None);
        }
        Self { id, url }
    }
}

/// Rendered markup for one page, as produced by the external renderer.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub markup: String,
}

// ============================================================================
// REVIEWS
// ============================================================================

/// What the field reader yields per review candidate, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub author: Option<String>,
    pub positive: Option<String>,
    pub negative: Option<String>,
    pub country: Option<String>,
}

/// Tone bucket derived from polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
        }
    }
}

/// One accepted guest review. Immutable once accepted; the sentiment fields
/// are filled in by the annotation step after collection completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Sequence number, unique within one collection run, assigned at
    /// acceptance and never reused.
    pub id: u32,
    pub author: String,
    pub content: String,
    pub country: Option<String>,
    /// [-1, 1] polarity of `content`, absent until annotation runs.
    pub polarity: Option<f64>,
    /// Polarity mapped onto the 1-5 rating scale.
    pub sentiment_rating: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
}

/// Content hash for review deduplication. Hashes the stored bytes exactly:
/// a duplicate means byte-identical content, not merely similar text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub Vec<u8>);

impl ContentHash {
    pub fn from_content(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(hasher.finalize().to_vec())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

// ============================================================================
// RATINGS & METADATA
// ============================================================================

/// One weighted review-category axis for one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRating {
    /// Normalized category name (see `config::normalize_category`).
    pub category: String,
    /// Guest score on the 0-10 source scale.
    pub raw_score: f64,
    /// Importance weight in (0, 1]. Weights need not sum to 1; the engine
    /// renormalizes by the weight mass actually present.
    pub weight: f64,
}

/// Structural facts about the property. Every field is always present:
/// unreadable values are backed by the documented `ScrapeDefaults`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListingMetadata {
    pub star_rating: u8,
    pub airport_distance_km: f64,
    pub floors: u32,
    pub rooms: u32,
}

/// Raw per-listing facts as the external field reader produced them.
/// Absent fields are resolved against defaults by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub star_rating: Option<u8>,
    pub airport_distance_km: Option<f64>,
    pub floors: Option<u32>,
    pub rooms: Option<u32>,
    /// (category name, 0-10 score) pairs in page order, duplicates included.
    pub category_scores: Vec<(String, f64)>,
}

// ============================================================================
// RESULTS
// ============================================================================

/// The engine's output for one listing. Produced once, immutable, consumed
/// only by the serialization sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Final 0-100 sparkling score, rounded to 2 decimals.
    pub composite: f64,
    pub review_component: f64,
    pub metadata_component: f64,
    pub sentiment_component: f64,
    /// Category -> raw 0-10 score pass-through, for reporting.
    pub category_breakdown: BTreeMap<String, f64>,
    pub review_count: usize,
}

/// One fully processed listing: resolved facts, annotated reviews, score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredListing {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metadata: ListingMetadata,
    pub categories: Vec<CategoryRating>,
    pub reviews: Vec<Review>,
    pub score: ScoreResult,
}
