use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::config::{CollectorConfig, ScrapeDefaults};
use crate::error::FetchError;
use crate::traits::{FieldReader, PageAdvance, ReviewPageSource};
use crate::types::{ContentHash, Review, ReviewDraft};

/// Candidates with less joined text than this are discarded as unreadable.
pub const MIN_CONTENT_CHARS: usize = 10;
/// Content is truncated to this many characters on storage.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Join the positive/negative remark parts into stored review content.
///
/// Returns `None` when the joined text is below the validity threshold;
/// otherwise the content is already truncated to the storage limit.
pub fn compose_content(
    positive: Option<&str>,
    negative: Option<&str>,
    separator: &str,
) -> Option<String> {
    let parts: Vec<&str> = [positive, negative]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let joined = parts.join(separator);
    if joined.chars().count() < MIN_CONTENT_CHARS {
        return None;
    }
    if joined.chars().count() > MAX_CONTENT_CHARS {
        return Some(joined.chars().take(MAX_CONTENT_CHARS).collect());
    }
    Some(joined)
}

fn build_review(draft: ReviewDraft, id: u32, defaults: &ScrapeDefaults) -> Option<(Review, ContentHash)> {
    let content = compose_content(
        draft.positive.as_deref(),
        draft.negative.as_deref(),
        &defaults.remark_separator,
    )?;
    let author = draft
        .author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| defaults.author.clone());
    let hash = ContentHash::from_content(&content);
    let review = Review {
        id,
        author,
        content,
        country: draft.country.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        polarity: None,
        sentiment_rating: None,
        sentiment_label: None,
    };
    Some((review, hash))
}

/// Try the pagination strategies in order until one succeeds.
///
/// A strategy error counts as that strategy failing, except an unreachable
/// fetcher, which is fatal and propagates. `Ok(false)` means the chain is
/// exhausted: no further page is reachable and collection must stop.
async fn advance_page(source: &impl ReviewPageSource, next_page: u32) -> Result<bool> {
    for strategy in [PageAdvance::JumpToPage(next_page), PageAdvance::ClickNext] {
        match source.advance(strategy).await {
            Ok(true) => return Ok(true),
            Ok(false) => {
                tracing::debug!(?strategy, "Advance strategy reported no further page");
            }
            Err(e) => {
                if matches!(
                    e.downcast_ref::<FetchError>(),
                    Some(FetchError::Unreachable(_))
                ) {
                    return Err(e);
                }
                tracing::debug!(?strategy, error = %e, "Advance strategy failed");
            }
        }
    }
    Ok(false)
}

/// Gather up to `target_count` valid, distinct reviews for the currently
/// opened listing, walking review pages until the target is met, the page
/// budget runs out, or no further page is reachable.
///
/// Reviews come back in acceptance order with sequence ids assigned from 1.
/// Duplicate means byte-identical content; a failed page advance is terminal
/// for the collection, never retried.
pub async fn collect_reviews(
    source: &impl ReviewPageSource,
    reader: &impl FieldReader,
    config: &CollectorConfig,
    defaults: &ScrapeDefaults,
) -> Result<Vec<Review>> {
    let mut accepted: Vec<Review> = Vec::new();
    let mut seen: HashSet<ContentHash> = HashSet::new();
    let mut advances = 0usize;

    loop {
        let page = source
            .current_page()
            .await
            .context("Failed to fetch review page")?;
        let drafts = reader
            .read_reviews(&page)
            .context("Failed to read reviews from page")?;
        tracing::debug!(
            url = %page.url,
            candidates = drafts.len(),
            accepted = accepted.len(),
            "Review page read"
        );

        for draft in drafts {
            if accepted.len() >= config.target_count {
                break;
            }
            let id = accepted.len() as u32 + 1;
            let Some((review, hash)) = build_review(draft, id, defaults) else {
                continue;
            };
            if !seen.insert(hash) {
                tracing::debug!(author = %review.author, "Duplicate review content discarded");
                continue;
            }
            accepted.push(review);
        }

        if accepted.len() >= config.target_count {
            tracing::debug!(accepted = accepted.len(), "Review target reached");
            break;
        }
        if advances >= config.max_pages {
            tracing::debug!(max_pages = config.max_pages, "Page budget exhausted");
            break;
        }
        advances += 1;
        let next_page = advances as u32 + 1;
        if !advance_page(source, next_page).await? {
            tracing::debug!(accepted = accepted.len(), "Pagination exhausted");
            break;
        }
    }

    Ok(accepted)
}
