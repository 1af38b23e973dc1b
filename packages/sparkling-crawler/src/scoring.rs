use std::collections::BTreeMap;

use crate::config::{MetadataWeights, ScoringConfig};
use crate::types::{CategoryRating, ListingMetadata, Review, ScoreResult};

/// Round to the 2-decimal precision every emitted figure carries.
/// Accumulation stays at full precision until this final step.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// [-1, 1] polarity onto the 1-5 rating scale.
pub fn polarity_to_rating(polarity: f64) -> f64 {
    let p = polarity.clamp(-1.0, 1.0);
    ((p + 1.0) / 2.0) * 4.0 + 1.0
}

/// Weighted average over the category axes present, renormalized by the
/// weight mass actually present. Renormalization is the key correctness
/// property: an absent category must not change the component's scale.
fn category_component(categories: &[CategoryRating]) -> f64 {
    let mut weighted = 0.0;
    let mut mass = 0.0;
    for rating in categories {
        let normalized = (rating.raw_score / 10.0) * 100.0;
        weighted += normalized * rating.weight;
        mass += rating.weight;
    }
    if mass == 0.0 {
        0.0
    } else {
        weighted / mass
    }
}

/// Mean guest polarity mapped onto the 1-5 rating scale, then onto 0-100.
/// A review still missing its polarity counts as neutral.
fn sentiment_component(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: f64 = reviews
        .iter()
        .map(|r| polarity_to_rating(r.polarity.unwrap_or(0.0)))
        .sum();
    let average = sum / reviews.len() as f64;
    (average / 5.0) * 100.0
}

/// Three independently weighted structural sub-scores. Airport distance
/// decays linearly and floors at zero from 50 km; the size term is capped
/// so very large properties cannot grow without bound.
fn metadata_component(metadata: &ListingMetadata, weights: &MetadataWeights) -> f64 {
    let star = (f64::from(metadata.star_rating) / 5.0) * 100.0 * weights.stars;
    let airport = (100.0 - metadata.airport_distance_km * 2.0).max(0.0) * weights.airport;
    let size_raw = (f64::from(metadata.floors) * 5.0 + f64::from(metadata.rooms) / 2.0) / 2.0;
    let size = size_raw.min(100.0) * weights.size;
    star + airport + size
}

/// Fold category ratings, structural metadata and annotated reviews into one
/// comparable 0-100 sparkling score with its component breakdown.
///
/// Deterministic: identical inputs yield bit-identical rounded outputs. A
/// listing with no categories and no reviews is a valid input and scores
/// `metadata_component x metadata_weight`.
pub fn score_listing(
    categories: &[CategoryRating],
    metadata: &ListingMetadata,
    reviews: &[Review],
    config: &ScoringConfig,
) -> ScoreResult {
    let category = category_component(categories);
    let sentiment = sentiment_component(reviews);
    let review = category * config.category_weight + sentiment * config.sentiment_weight;
    let structural = metadata_component(metadata, &config.metadata_weights);
    let composite = review * config.review_weight + structural * config.metadata_weight;

    let category_breakdown: BTreeMap<String, f64> = categories
        .iter()
        .map(|rating| (rating.category.clone(), rating.raw_score))
        .collect();

    ScoreResult {
        composite: round2(composite),
        review_component: round2(review),
        metadata_component: round2(structural),
        sentiment_component: round2(sentiment),
        category_breakdown,
        review_count: reviews.len(),
    }
}
