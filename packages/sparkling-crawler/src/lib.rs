pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod geo;
pub mod pipeline;
pub mod scoring;
pub mod sentiment;
pub mod traits;
pub mod types;

// Re-exports for clean API
pub use collector::{collect_reviews, compose_content};
pub use config::{
    CategoryWeight, CollectorConfig, MetadataWeights, ScoringConfig, ScrapeDefaults,
};
pub use error::FetchError;
pub use geo::{CoordinateTable, CountryLocation};
pub use pipeline::{process_listing, run_pipeline, PipelineConfig, RunSummary};
pub use scoring::{polarity_to_rating, score_listing};
pub use sentiment::annotate_reviews;
pub use traits::{FieldReader, PageAdvance, ReviewPageSource, SentimentAnalyzer};
pub use types::{
    CategoryRating, ContentHash, Listing, ListingFields, ListingMetadata, RenderedPage, Review,
    ReviewDraft, ScoreResult, ScoredListing, SentimentLabel,
};
