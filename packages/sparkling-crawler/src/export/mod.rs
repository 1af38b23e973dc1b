use anyhow::{Context, Result};
use std::path::Path;

use crate::config::ScoringConfig;
use crate::types::ScoredListing;

pub mod csv;
pub mod tables;

pub use csv::{write_row, write_table};

/// Serialize one run's relational tables under `out_dir`: hotels, users,
/// reviews, review_ratings and the ranked hotel_scoring table.
pub fn write_output_tables(
    out_dir: &Path,
    listings: &[ScoredListing],
    config: &ScoringConfig,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let hotels = tables::hotel_rows(listings);
    write_table(&out_dir.join("hotels.csv"), tables::HOTELS_HEADER, &hotels)?;
    tracing::info!(rows = hotels.len(), "Wrote hotels.csv");

    let users = tables::build_users(listings);
    write_table(&out_dir.join("users.csv"), tables::USERS_HEADER, &users.rows)?;
    tracing::info!(rows = users.rows.len(), "Wrote users.csv");

    let (reviews, ratings) = tables::build_reviews(listings, &users, config);
    write_table(&out_dir.join("reviews.csv"), tables::REVIEWS_HEADER, &reviews)?;
    tracing::info!(rows = reviews.len(), "Wrote reviews.csv");
    write_table(
        &out_dir.join("review_ratings.csv"),
        tables::REVIEW_RATINGS_HEADER,
        &ratings,
    )?;
    tracing::info!(rows = ratings.len(), "Wrote review_ratings.csv");

    let scoring_header = tables::scoring_header(config);
    let header_refs: Vec<&str> = scoring_header.iter().map(String::as_str).collect();
    let scoring = tables::scoring_rows(listings, config);
    write_table(&out_dir.join("hotel_scoring.csv"), &header_refs, &scoring)?;
    tracing::info!(rows = scoring.len(), "Wrote hotel_scoring.csv");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ListingMetadata, ScoreResult, ScoredListing};
    use std::collections::BTreeMap;

    #[test]
    fn writes_all_five_tables() {
        let listing = ScoredListing {
            id: 1,
            name: "Hotel One".into(),
            address: None,
            city_id: None,
            latitude: None,
            longitude: None,
            metadata: ListingMetadata {
                star_rating: 3,
                airport_distance_km: 10.0,
                floors: 5,
                rooms: 100,
            },
            categories: vec![],
            reviews: vec![],
            score: ScoreResult {
                composite: 20.85,
                review_component: 0.0,
                metadata_component: 69.5,
                sentiment_component: 0.0,
                category_breakdown: BTreeMap::new(),
                review_count: 0,
            },
        };

        let dir = tempfile::tempdir().unwrap();
        write_output_tables(dir.path(), &[listing], &ScoringConfig::default()).unwrap();

        for table in [
            "hotels.csv",
            "users.csv",
            "reviews.csv",
            "review_ratings.csv",
            "hotel_scoring.csv",
        ] {
            assert!(dir.path().join(table).exists(), "{table} missing");
        }

        let users = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
        assert!(users.lines().any(|l| l.contains("admin")));
        let scoring = std::fs::read_to_string(dir.path().join("hotel_scoring.csv")).unwrap();
        assert!(scoring.contains("20.85"));
    }
}
