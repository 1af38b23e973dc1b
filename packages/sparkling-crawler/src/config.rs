use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canonical form for category names, so "Food & Beverage", "food-beverage"
/// and "food_beverage" all land on the same axis.
pub fn normalize_category(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Limits for the paginated review collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Stop once this many distinct valid reviews are accepted.
    pub target_count: usize,
    /// Upper bound on page-advance attempts for one listing.
    pub max_pages: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            target_count: 50,
            max_pages: 8,
        }
    }
}

impl CollectorConfig {
    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// One weighted review-category axis in the scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub name: String,
    pub weight: f64,
}

/// Relative importance of the three metadata sub-scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataWeights {
    pub stars: f64,
    pub airport: f64,
    pub size: f64,
}

impl Default for MetadataWeights {
    fn default() -> Self {
        Self {
            stars: 0.40,
            airport: 0.30,
            size: 0.30,
        }
    }
}

/// All scoring weights in one value object. The historical scraper variants
/// hard-coded drifting copies of these numbers; new variants are config
/// changes, not code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Top-level split: guest-derived signal vs structural facts.
    pub review_weight: f64,
    pub metadata_weight: f64,
    /// Split inside the review component: what guests rated vs how they felt.
    pub category_weight: f64,
    pub sentiment_weight: f64,
    pub metadata_weights: MetadataWeights,
    /// The fixed category set, in output-column order.
    pub category_weights: Vec<CategoryWeight>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            review_weight: 0.70,
            metadata_weight: 0.30,
            category_weight: 0.80,
            sentiment_weight: 0.20,
            metadata_weights: MetadataWeights::default(),
            category_weights: vec![
                CategoryWeight { name: "amenities".into(), weight: 0.20 },
                CategoryWeight { name: "cleanliness".into(), weight: 0.25 },
                CategoryWeight { name: "food_beverage".into(), weight: 0.15 },
                CategoryWeight { name: "sleep_quality".into(), weight: 0.20 },
                CategoryWeight { name: "internet_quality".into(), weight: 0.10 },
            ],
        }
    }
}

impl ScoringConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scoring config {}", path.display()))
    }

    pub fn with_split(mut self, review_weight: f64, metadata_weight: f64) -> Self {
        self.review_weight = review_weight;
        self.metadata_weight = metadata_weight;
        self
    }

    pub fn with_review_split(mut self, category_weight: f64, sentiment_weight: f64) -> Self {
        self.category_weight = category_weight;
        self.sentiment_weight = sentiment_weight;
        self
    }

    /// Add or replace one category axis.
    pub fn with_category_weight(mut self, name: &str, weight: f64) -> Self {
        let name = normalize_category(name);
        match self.category_weights.iter().position(|c| c.name == name) {
            Some(index) => self.category_weights[index].weight = weight,
            None => self.category_weights.push(CategoryWeight { name, weight }),
        }
        self
    }

    /// Weight for a normalized category name, if configured.
    pub fn weight_for(&self, normalized: &str) -> Option<f64> {
        self.category_weights
            .iter()
            .find(|c| c.name == normalized)
            .map(|c| c.weight)
    }

    /// 1-based position of a normalized category in output-column order.
    pub fn category_position(&self, normalized: &str) -> Option<usize> {
        self.category_weights
            .iter()
            .position(|c| c.name == normalized)
            .map(|i| i + 1)
    }
}

/// Documented fallbacks for anything the field reader cannot produce.
/// These are the backbone of the pipeline: a sparse page still yields a
/// complete record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeDefaults {
    pub author: String,
    pub star_rating: u8,
    pub airport_distance_km: f64,
    pub floors: u32,
    pub rooms: u32,
    /// Joins the positive and negative remark parts into stored content.
    pub remark_separator: String,
}

impl Default for ScrapeDefaults {
    fn default() -> Self {
        Self {
            author: "Anonymous".into(),
            star_rating: 3,
            airport_distance_km: 10.0,
            floors: 5,
            rooms: 100,
            remark_separator: " | ".into(),
        }
    }
}
