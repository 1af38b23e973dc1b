use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use sparkling_crawler::{
    compose_content, FetchError, FieldReader, Listing, ListingFields, PageAdvance, RenderedPage,
    ReviewDraft, ReviewPageSource, ScrapeDefaults, SentimentAnalyzer,
};

// The run file carries what the external collaborators already produced:
// rendered pages reduced to their readable fields, and the per-review
// polarity from the text-polarity capability. The pipeline itself stays
// behind the same trait seams a live browser-backed source would use.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub listings: Vec<ListingSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub url: Url,
    #[serde(default)]
    pub fields: SnapshotFields,
    #[serde(default)]
    pub review_pages: Vec<SnapshotReviewPage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hotel_stars: Option<u8>,
    pub distance_to_airport_km: Option<f64>,
    pub floors: Option<u32>,
    pub rooms: Option<u32>,
    pub category_scores: Vec<CategoryScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotReviewPage {
    #[serde(default)]
    pub reviews: Vec<SnapshotReview>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotReview {
    pub author: Option<String>,
    pub positive: Option<String>,
    pub negative: Option<String>,
    pub country: Option<String>,
    /// Polarity the external text-polarity capability produced upstream.
    pub polarity: Option<f64>,
}

/// All snapshots of one run, loaded once and shared by the adapters.
#[derive(Debug)]
pub struct SnapshotStore {
    listings: Vec<ListingSnapshot>,
}

impl SnapshotStore {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run file {}", path.display()))?;
        let run: RunFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse run file {}", path.display()))?;
        Ok(Self {
            listings: run.listings,
        })
    }

    /// Listings in run-file order, ids assigned from 1.
    pub fn listings(&self) -> Vec<Listing> {
        self.listings
            .iter()
            .enumerate()
            .map(|(index, snap)| Listing::new(index as i64 + 1, snap.url.clone()))
            .collect()
    }

    fn get(&self, id: i64) -> Option<&ListingSnapshot> {
        usize::try_from(id - 1).ok().and_then(|i| self.listings.get(i))
    }
}

#[derive(Debug, Default)]
struct Cursor {
    listing: Option<i64>,
    page: usize,
}

/// A page source backed by stored snapshots. Jumping to page N lands on the
/// stored page N; clicking next moves one page forward; both report no
/// further page once the stored pages run out.
pub struct SnapshotSource {
    store: Arc<SnapshotStore>,
    cursor: Mutex<Cursor>,
}

impl SnapshotSource {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            cursor: Mutex::new(Cursor::default()),
        }
    }
}

#[async_trait]
impl ReviewPageSource for SnapshotSource {
    async fn open_listing(&self, listing: &Listing) -> Result<RenderedPage> {
        let snap = self.store.get(listing.id).ok_or_else(|| {
            FetchError::PageUnavailable(format!("no snapshot for listing {}", listing.id))
        })?;
        let mut cursor = self.cursor.lock().unwrap();
        cursor.listing = Some(listing.id);
        cursor.page = 0;
        Ok(RenderedPage {
            url: listing.url.to_string(),
            markup: serde_json::to_string(&snap.fields)?,
        })
    }

    async fn current_page(&self) -> Result<RenderedPage> {
        let cursor = self.cursor.lock().unwrap();
        let id = cursor
            .listing
            .ok_or_else(|| FetchError::PageUnavailable("no listing opened".into()))?;
        let snap = self
            .store
            .get(id)
            .ok_or_else(|| FetchError::PageUnavailable(format!("no snapshot for listing {id}")))?;
        let page = snap.review_pages.get(cursor.page).cloned().unwrap_or_default();
        Ok(RenderedPage {
            url: format!("{}#reviews-page-{}", snap.url, cursor.page + 1),
            markup: serde_json::to_string(&page)?,
        })
    }

    async fn advance(&self, strategy: PageAdvance) -> Result<bool> {
        let mut cursor = self.cursor.lock().unwrap();
        let id = cursor
            .listing
            .ok_or_else(|| FetchError::PageUnavailable("no listing opened".into()))?;
        let snap = self
            .store
            .get(id)
            .ok_or_else(|| FetchError::PageUnavailable(format!("no snapshot for listing {id}")))?;
        let target = match strategy {
            PageAdvance::JumpToPage(n) if n >= 1 => n as usize - 1,
            PageAdvance::JumpToPage(_) => return Ok(false),
            PageAdvance::ClickNext => cursor.page + 1,
        };
        if target < snap.review_pages.len() {
            cursor.page = target;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Field reader over snapshot pages: the "markup" of a snapshot page is its
/// stored field document.
pub struct SnapshotReader;

impl FieldReader for SnapshotReader {
    fn read_listing(&self, page: &RenderedPage) -> Result<ListingFields> {
        let fields: SnapshotFields = serde_json::from_str(&page.markup)
            .context("Listing snapshot fields did not parse")?;
        Ok(ListingFields {
            name: fields.name,
            address: fields.address,
            city_id: fields.city_id,
            latitude: fields.latitude,
            longitude: fields.longitude,
            star_rating: fields.hotel_stars,
            airport_distance_km: fields.distance_to_airport_km,
            floors: fields.floors,
            rooms: fields.rooms,
            category_scores: fields
                .category_scores
                .into_iter()
                .map(|c| (c.name, c.score))
                .collect(),
        })
    }

    fn read_reviews(&self, page: &RenderedPage) -> Result<Vec<ReviewDraft>> {
        let body: SnapshotReviewPage = serde_json::from_str(&page.markup)
            .context("Review snapshot page did not parse")?;
        Ok(body
            .reviews
            .into_iter()
            .map(|r| ReviewDraft {
                author: r.author,
                positive: r.positive,
                negative: r.negative,
                country: r.country,
            })
            .collect())
    }
}

/// Serves the polarity each snapshot review arrived with, keyed by the
/// stored content the collector will ask about. Reviews without a stored
/// polarity read as neutral.
pub struct SnapshotSentiment {
    by_content: HashMap<String, f64>,
}

impl SnapshotSentiment {
    pub fn from_store(store: &SnapshotStore, defaults: &ScrapeDefaults) -> Self {
        let mut by_content = HashMap::new();
        for snap in &store.listings {
            for page in &snap.review_pages {
                for review in &page.reviews {
                    let Some(polarity) = review.polarity else {
                        continue;
                    };
                    if let Some(content) = compose_content(
                        review.positive.as_deref(),
                        review.negative.as_deref(),
                        &defaults.remark_separator,
                    ) {
                        by_content.insert(content, polarity);
                    }
                }
            }
        }
        Self { by_content }
    }
}

#[async_trait]
impl SentimentAnalyzer for SnapshotSentiment {
    async fn polarity(&self, text: &str) -> Result<f64> {
        Ok(self.by_content.get(text).copied().unwrap_or(0.0))
    }
}
