use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Listing, ListingFields, RenderedPage, ReviewDraft};

/// One pagination strategy. Strategies are tried as an ordered fallback
/// chain: the numbered-page control first, then the generic next control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// Jump straight to page N via the numbered pagination control.
    JumpToPage(u32),
    /// Click the generic "next page" control.
    ClickNext,
}

// ============================================================================
// PAGE SOURCE: browser automation lives behind this seam (to allow mocking)
// ============================================================================

#[async_trait]
pub trait ReviewPageSource: Send + Sync {
    /// Navigate to the listing and return its rendered page.
    async fn open_listing(&self, listing: &Listing) -> Result<RenderedPage>;

    /// The currently rendered review page for the opened listing.
    async fn current_page(&self) -> Result<RenderedPage>;

    /// Try one pagination strategy. `Ok(false)` means the control had no
    /// effect (no further page reachable that way), not an error.
    async fn advance(&self, strategy: PageAdvance) -> Result<bool>;
}

// ============================================================================
// FIELD READER: selector-based extraction lives behind this seam
// ============================================================================

pub trait FieldReader: Send + Sync {
    /// Structured listing facts, with `None` for anything unreadable.
    fn read_listing(&self, page: &RenderedPage) -> Result<ListingFields>;

    /// Zero or more review candidates from one rendered review page.
    fn read_reviews(&self, page: &RenderedPage) -> Result<Vec<ReviewDraft>>;
}

// ============================================================================
// SENTIMENT: the external text-polarity capability
// ============================================================================

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Polarity of free text in [-1, 1].
    async fn polarity(&self, text: &str) -> Result<f64>;
}
