use anyhow::{Context, Result};
use uuid::Uuid;

use crate::collector::collect_reviews;
use crate::config::{normalize_category, CollectorConfig, ScoringConfig, ScrapeDefaults};
use crate::error::FetchError;
use crate::geo::CoordinateTable;
use crate::scoring::score_listing;
use crate::sentiment::annotate_reviews;
use crate::traits::{FieldReader, ReviewPageSource, SentimentAnalyzer};
use crate::types::{CategoryRating, Listing, ListingFields, ListingMetadata, ScoredListing};

/// Everything one run needs, bundled so callers configure in one place.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub collector: CollectorConfig,
    pub scoring: ScoringConfig,
    pub defaults: ScrapeDefaults,
    pub coordinates: CoordinateTable,
}

/// What one run produced, listings in input order.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub listings: Vec<ScoredListing>,
    pub failed: usize,
}

/// Resolve raw reader output against the documented defaults, discarding
/// out-of-domain values the same way an unreadable field is discarded.
fn resolve_metadata(fields: &ListingFields, defaults: &ScrapeDefaults) -> ListingMetadata {
    ListingMetadata {
        star_rating: fields
            .star_rating
            .filter(|s| (1..=5).contains(s))
            .unwrap_or(defaults.star_rating),
        airport_distance_km: fields
            .airport_distance_km
            .filter(|km| km.is_finite() && *km >= 0.0)
            .unwrap_or(defaults.airport_distance_km),
        floors: fields.floors.filter(|f| *f > 0).unwrap_or(defaults.floors),
        rooms: fields.rooms.filter(|r| *r > 0).unwrap_or(defaults.rooms),
    }
}

/// Join page-order category scores with the configured weights. The first
/// occurrence of a normalized name wins; later duplicates and categories
/// outside the configured set are discarded before they reach the engine.
fn resolve_categories(
    scores: &[(String, f64)],
    scoring: &ScoringConfig,
) -> Vec<CategoryRating> {
    let mut ratings: Vec<CategoryRating> = Vec::new();
    for (name, raw_score) in scores {
        let normalized = normalize_category(name);
        if ratings.iter().any(|r| r.category == normalized) {
            tracing::debug!(category = %normalized, "Duplicate category rating discarded");
            continue;
        }
        let Some(weight) = scoring.weight_for(&normalized) else {
            tracing::debug!(category = %normalized, "Category not configured, ignored");
            continue;
        };
        ratings.push(CategoryRating {
            category: normalized,
            raw_score: raw_score.clamp(0.0, 10.0),
            weight,
        });
    }
    ratings
}

/// Fully process one listing: open its page, read facts, collect and
/// annotate reviews, score.
pub async fn process_listing(
    listing: &Listing,
    source: &impl ReviewPageSource,
    reader: &impl FieldReader,
    analyzer: &impl SentimentAnalyzer,
    config: &PipelineConfig,
) -> Result<ScoredListing> {
    tracing::info!(listing_id = listing.id, url = %listing.url, "Processing listing");

    let page = source
        .open_listing(listing)
        .await
        .context("Failed to open listing page")?;
    let fields = reader
        .read_listing(&page)
        .context("Failed to read listing fields")?;

    let metadata = resolve_metadata(&fields, &config.defaults);
    let categories = resolve_categories(&fields.category_scores, &config.scoring);

    let mut reviews = collect_reviews(source, reader, &config.collector, &config.defaults)
        .await
        .context("Review collection failed")?;
    annotate_reviews(&mut reviews, analyzer).await;

    let score = score_listing(&categories, &metadata, &reviews, &config.scoring);

    let fallback = config.coordinates.lookup_url(&listing.url);
    let scored = ScoredListing {
        id: listing.id,
        name: fields
            .name
            .unwrap_or_else(|| format!("Hotel {}", listing.id)),
        address: fields
            .address
            .or_else(|| fallback.map(|loc| loc.country.clone())),
        city_id: fields.city_id.or_else(|| fallback.map(|loc| loc.city_id)),
        latitude: fields.latitude.or_else(|| fallback.map(|loc| loc.latitude)),
        longitude: fields
            .longitude
            .or_else(|| fallback.map(|loc| loc.longitude)),
        metadata,
        categories,
        reviews,
        score,
    };

    tracing::info!(
        listing_id = scored.id,
        name = %scored.name,
        composite = scored.score.composite,
        reviews = scored.score.review_count,
        "Listing scored"
    );
    Ok(scored)
}

/// Run the whole pipeline, strictly sequentially, one listing at a time.
///
/// A per-listing failure is logged and skipped; the listing contributes no
/// rows to any output table. An unreachable fetcher aborts the run.
pub async fn run_pipeline(
    listings: &[Listing],
    source: &impl ReviewPageSource,
    reader: &impl FieldReader,
    analyzer: &impl SentimentAnalyzer,
    config: &PipelineConfig,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, listings = listings.len(), "Starting scoring run");

    let mut scored = Vec::new();
    let mut failed = 0usize;
    for listing in listings {
        match process_listing(listing, source, reader, analyzer, config).await {
            Ok(result) => scored.push(result),
            Err(e) => {
                if matches!(
                    e.downcast_ref::<FetchError>(),
                    Some(FetchError::Unreachable(_))
                ) {
                    return Err(e.context("Page fetcher unreachable, aborting run"));
                }
                failed += 1;
                tracing::warn!(
                    listing_id = listing.id,
                    url = %listing.url,
                    error = %e,
                    "Listing failed, continuing with the next one"
                );
            }
        }
    }

    tracing::info!(%run_id, scored = scored.len(), failed, "Scoring run finished");
    Ok(RunSummary {
        run_id,
        listings: scored,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PageAdvance;
    use crate::types::{RenderedPage, ReviewDraft};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    /// One in-memory world backing all three capability seams.
    struct World {
        fields: ListingFields,
        pages: Vec<Vec<ReviewDraft>>,
        polarities: HashMap<String, f64>,
        cursor: Mutex<usize>,
        broken_listings: HashMap<i64, bool>, // id -> unreachable?
    }

    impl World {
        fn new(fields: ListingFields, pages: Vec<Vec<ReviewDraft>>) -> Self {
            Self {
                fields,
                pages,
                polarities: HashMap::new(),
                cursor: Mutex::new(0),
                broken_listings: HashMap::new(),
            }
        }

        fn with_polarity(mut self, content: &str, polarity: f64) -> Self {
            self.polarities.insert(content.to_string(), polarity);
            self
        }
    }

    #[async_trait]
    impl ReviewPageSource for World {
        async fn open_listing(&self, listing: &Listing) -> anyhow::Result<RenderedPage> {
            if let Some(unreachable) = self.broken_listings.get(&listing.id) {
                if *unreachable {
                    return Err(FetchError::Unreachable("driver gone".into()).into());
                }
                return Err(anyhow!("listing page failed to render"));
            }
            *self.cursor.lock().unwrap() = 0;
            Ok(RenderedPage {
                url: listing.url.to_string(),
                markup: "listing".into(),
            })
        }

        async fn current_page(&self) -> anyhow::Result<RenderedPage> {
            let cursor = *self.cursor.lock().unwrap();
            Ok(RenderedPage {
                url: format!("mock://reviews/page-{}", cursor + 1),
                markup: cursor.to_string(),
            })
        }

        async fn advance(&self, strategy: PageAdvance) -> anyhow::Result<bool> {
            let mut cursor = self.cursor.lock().unwrap();
            let target = match strategy {
                PageAdvance::JumpToPage(n) => n as usize - 1,
                PageAdvance::ClickNext => *cursor + 1,
            };
            if target < self.pages.len() {
                *cursor = target;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    impl FieldReader for World {
        fn read_listing(&self, _page: &RenderedPage) -> anyhow::Result<ListingFields> {
            Ok(self.fields.clone())
        }

        fn read_reviews(&self, page: &RenderedPage) -> anyhow::Result<Vec<ReviewDraft>> {
            let index: usize = page.markup.parse()?;
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl SentimentAnalyzer for World {
        async fn polarity(&self, text: &str) -> anyhow::Result<f64> {
            Ok(self.polarities.get(text).copied().unwrap_or(0.0))
        }
    }

    fn listing(id: i64, url: &str) -> Listing {
        Listing::new(id, Url::parse(url).unwrap())
    }

    fn draft(positive: &str) -> ReviewDraft {
        ReviewDraft {
            author: Some("Guest".into()),
            positive: Some(positive.into()),
            negative: None,
            country: Some("France".into()),
        }
    }

    #[tokio::test]
    async fn scores_a_listing_end_to_end() {
        let fields = ListingFields {
            name: Some("Radisson Blu Bordeaux".into()),
            star_rating: Some(4),
            airport_distance_km: Some(10.0),
            floors: Some(8),
            rooms: Some(100),
            category_scores: vec![("Cleanliness".into(), 8.0), ("amenities".into(), 6.0)],
            ..ListingFields::default()
        };
        let world = World::new(
            fields,
            vec![vec![draft("Spotless rooms and great staff"), draft("Breakfast was underwhelming")]],
        )
        .with_polarity("Spotless rooms and great staff", 0.5)
        .with_polarity("Breakfast was underwhelming", -0.2);

        let config = PipelineConfig::default();
        let scored = process_listing(
            &listing(1, "https://www.booking.com/hotel/fr/radisson-blu-bordeaux.en-gb.html"),
            &world,
            &world,
            &world,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(scored.name, "Radisson Blu Bordeaux");
        assert_eq!(scored.score.composite, 69.91);
        assert_eq!(scored.score.review_component, 70.09);
        assert_eq!(scored.score.sentiment_component, 66.0);
        assert_eq!(scored.score.metadata_component, 69.5);
        assert_eq!(scored.reviews.len(), 2);
    }

    #[tokio::test]
    async fn applies_defaults_and_coordinate_fallbacks() {
        let world = World::new(ListingFields::default(), vec![]);
        let config = PipelineConfig::default();
        let scored = process_listing(
            &listing(7, "https://www.booking.com/hotel/fr/some-hotel.en-gb.html#tab-reviews"),
            &world,
            &world,
            &world,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(scored.name, "Hotel 7");
        assert_eq!(scored.address.as_deref(), Some("France"));
        assert_eq!(scored.city_id, Some(2));
        assert_eq!(scored.latitude, Some(48.8566));
        assert_eq!(
            scored.metadata,
            ListingMetadata {
                star_rating: 3,
                airport_distance_km: 10.0,
                floors: 5,
                rooms: 100,
            }
        );
        // No categories, no reviews: composite is the metadata share.
        assert_eq!(scored.score.composite, 20.85);
    }

    #[tokio::test]
    async fn keeps_first_of_duplicate_categories_and_drops_unconfigured() {
        let fields = ListingFields {
            category_scores: vec![
                ("cleanliness".into(), 8.0),
                ("Cleanliness".into(), 3.0),
                ("spa".into(), 9.0),
            ],
            ..ListingFields::default()
        };
        let world = World::new(fields, vec![]);
        let config = PipelineConfig::default();
        let scored = process_listing(
            &listing(1, "https://www.booking.com/hotel/fr/x.html"),
            &world,
            &world,
            &world,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(scored.categories.len(), 1);
        assert_eq!(scored.categories[0].category, "cleanliness");
        assert_eq!(scored.categories[0].raw_score, 8.0);
        assert_eq!(scored.score.category_breakdown.get("cleanliness"), Some(&8.0));
    }

    #[tokio::test]
    async fn failed_listing_is_skipped_and_counted() {
        let mut world = World::new(ListingFields::default(), vec![]);
        world.broken_listings.insert(2, false);
        let listings = vec![
            listing(1, "https://www.booking.com/hotel/fr/a.html"),
            listing(2, "https://www.booking.com/hotel/fr/b.html"),
            listing(3, "https://www.booking.com/hotel/fr/c.html"),
        ];

        let summary = run_pipeline(&listings, &world, &world, &world, &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.listings.len(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.listings.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[tokio::test]
    async fn unreachable_fetcher_aborts_the_run() {
        let mut world = World::new(ListingFields::default(), vec![]);
        world.broken_listings.insert(2, true);
        let listings = vec![
            listing(1, "https://www.booking.com/hotel/fr/a.html"),
            listing(2, "https://www.booking.com/hotel/fr/b.html"),
        ];

        let err = run_pipeline(&listings, &world, &world, &world, &PipelineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Unreachable(_))
        ));
    }
}
