use std::collections::HashMap;

use crate::config::ScoringConfig;
use crate::types::ScoredListing;

/// The fixed role accounts every export carries, ahead of any guest user.
/// The downstream consumer seeds its auth tables from these rows; the
/// credential is the uniform development password it stores verbatim.
const SYNTHETIC_ACCOUNTS: [(&str, &str, &str); 2] = [
    ("admin", "admin@sparklingawards.com", "admin"),
    ("manager", "manager@sparklingawards.com", "hotel_manager"),
];
const SEED_PASSWORD: &str = "password123";

fn fmt2(value: f64) -> String {
    format!("{:.2}", value)
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ============================================================================
// hotels
// ============================================================================

pub const HOTELS_HEADER: &[&str] = &[
    "GlobalPropertyID",
    "GlobalPropertyName",
    "PropertyAddress1",
    "CityID",
    "PropertyLatitude",
    "PropertyLongitude",
    "HotelStars",
    "DistanceToTheAirport",
    "FloorsNumber",
    "RoomsNumber",
    "sparkling_score",
];

pub fn hotel_rows(listings: &[ScoredListing]) -> Vec<Vec<String>> {
    listings
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.name.clone(),
                l.address.clone().unwrap_or_default(),
                fmt_opt(l.city_id),
                fmt_opt(l.latitude),
                fmt_opt(l.longitude),
                l.metadata.star_rating.to_string(),
                fmt2(l.metadata.airport_distance_km),
                l.metadata.floors.to_string(),
                l.metadata.rooms.to_string(),
                fmt2(l.score.composite),
            ]
        })
        .collect()
}

// ============================================================================
// users
// ============================================================================

pub const USERS_HEADER: &[&str] = &[
    "id",
    "username",
    "email",
    "password_hash",
    "nationality",
    "role",
    "review_count",
];

/// Guest users derived from distinct review authors, in first-appearance
/// order, behind the fixed synthetic role accounts.
pub struct UserTable {
    pub rows: Vec<Vec<String>>,
    /// Author display name -> user id, for review rows.
    index: HashMap<String, i64>,
}

impl UserTable {
    pub fn user_id_for(&self, author: &str) -> Option<i64> {
        self.index.get(author).copied()
    }
}

fn email_slug(author: &str) -> String {
    let mut slug = String::new();
    let mut pending_dot = false;
    for ch in author.chars() {
        if ch.is_alphanumeric() {
            if pending_dot && !slug.is_empty() {
                slug.push('.');
            }
            pending_dot = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dot = true;
        }
    }
    if slug.is_empty() {
        "guest".to_string()
    } else {
        slug
    }
}

pub fn build_users(listings: &[ScoredListing]) -> UserTable {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut index: HashMap<String, i64> = HashMap::new();

    for (username, email, role) in SYNTHETIC_ACCOUNTS {
        let id = rows.len() as i64 + 1;
        rows.push(vec![
            id.to_string(),
            username.to_string(),
            email.to_string(),
            SEED_PASSWORD.to_string(),
            String::new(),
            role.to_string(),
            "0".to_string(),
        ]);
    }

    struct Guest {
        id: i64,
        nationality: Option<String>,
        review_count: usize,
    }
    let mut guests: Vec<(String, Guest)> = Vec::new();
    for listing in listings {
        for review in &listing.reviews {
            match guests.iter().position(|(author, _)| *author == review.author) {
                Some(index) => {
                    let guest = &mut guests[index].1;
                    guest.review_count += 1;
                    if guest.nationality.is_none() {
                        guest.nationality = review.country.clone();
                    }
                }
                None => {
                    let id = SYNTHETIC_ACCOUNTS.len() as i64 + guests.len() as i64 + 1;
                    guests.push((
                        review.author.clone(),
                        Guest {
                            id,
                            nationality: review.country.clone(),
                            review_count: 1,
                        },
                    ));
                }
            }
        }
    }

    for (author, guest) in guests {
        rows.push(vec![
            guest.id.to_string(),
            author.clone(),
            format!("{}.{}@guests.sparklingawards.com", email_slug(&author), guest.id),
            SEED_PASSWORD.to_string(),
            guest.nationality.unwrap_or_default(),
            "guest".to_string(),
            guest.review_count.to_string(),
        ]);
        index.insert(author, guest.id);
    }

    UserTable { rows, index }
}

// ============================================================================
// reviews + review_ratings
// ============================================================================

pub const REVIEWS_HEADER: &[&str] = &[
    "id",
    "hotel_id",
    "user_id",
    "content",
    "sentiment_score",
    "sentiment_label",
];

pub const REVIEW_RATINGS_HEADER: &[&str] = &["id", "review_id", "category_id", "rating_value"];

/// Review rows with run-global ids, plus the per-review category rating
/// assignments. Each accepted review carries its listing's category scores
/// converted from the 0-10 source scale to the 1-5 consumer scale via
/// `raw_score / 2` (the convention the consumer's `review_ratings` table
/// always used; the `(s/10)*4+1` variant was dropped).
pub fn build_reviews(
    listings: &[ScoredListing],
    users: &UserTable,
    config: &ScoringConfig,
) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    let mut reviews: Vec<Vec<String>> = Vec::new();
    let mut ratings: Vec<Vec<String>> = Vec::new();

    for listing in listings {
        for review in &listing.reviews {
            let review_id = reviews.len() as i64 + 1;
            let user_id = users.user_id_for(&review.author).unwrap_or_default();
            reviews.push(vec![
                review_id.to_string(),
                listing.id.to_string(),
                user_id.to_string(),
                review.content.clone(),
                fmt2(review.sentiment_rating.unwrap_or(3.0)),
                review
                    .sentiment_label
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "neutral".to_string()),
            ]);

            for weight in &config.category_weights {
                let Some(rating) = listing
                    .categories
                    .iter()
                    .find(|c| c.category == weight.name)
                else {
                    continue;
                };
                let Some(category_id) = config.category_position(&rating.category) else {
                    continue;
                };
                let id = ratings.len() as i64 + 1;
                ratings.push(vec![
                    id.to_string(),
                    review_id.to_string(),
                    category_id.to_string(),
                    format!("{:.1}", rating.raw_score / 2.0),
                ]);
            }
        }
    }

    (reviews, ratings)
}

// ============================================================================
// hotel_scoring (ranked)
// ============================================================================

pub fn scoring_header(config: &ScoringConfig) -> Vec<String> {
    let mut header: Vec<String> = [
        "ranking",
        "hotel_id",
        "hotel_name",
        "location",
        "sparkling_score",
        "review_component",
        "metadata_component",
        "sentiment_score",
        "total_reviews",
        "hotel_stars",
        "distance_to_airport",
        "floors_number",
        "rooms_number",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    header.extend(config.category_weights.iter().map(|c| c.name.clone()));
    header
}

/// One row per listing, composite descending, rank 1-based. Ties keep input
/// order (the sort is stable).
pub fn scoring_rows(listings: &[ScoredListing], config: &ScoringConfig) -> Vec<Vec<String>> {
    let mut ordered: Vec<&ScoredListing> = listings.iter().collect();
    ordered.sort_by(|a, b| {
        b.score
            .composite
            .partial_cmp(&a.score.composite)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ordered
        .iter()
        .enumerate()
        .map(|(position, l)| {
            let mut row = vec![
                (position + 1).to_string(),
                l.id.to_string(),
                l.name.clone(),
                l.address.clone().unwrap_or_default(),
                fmt2(l.score.composite),
                fmt2(l.score.review_component),
                fmt2(l.score.metadata_component),
                fmt2(l.score.sentiment_component),
                l.score.review_count.to_string(),
                l.metadata.star_rating.to_string(),
                fmt2(l.metadata.airport_distance_km),
                l.metadata.floors.to_string(),
                l.metadata.rooms.to_string(),
            ];
            for weight in &config.category_weights {
                row.push(
                    l.score
                        .category_breakdown
                        .get(&weight.name)
                        .map(|raw| fmt2(*raw))
                        .unwrap_or_default(),
                );
            }
            row
        })
        .collect()
}
