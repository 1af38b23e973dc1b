use crate::scoring::polarity_to_rating;
use crate::traits::SentimentAnalyzer;
use crate::types::{Review, SentimentLabel};

/// Polarity within this band of zero reads as neutral tone.
const NEUTRAL_BAND: f64 = 0.1;

pub fn label_for(polarity: f64) -> SentimentLabel {
    if polarity > NEUTRAL_BAND {
        SentimentLabel::Positive
    } else if polarity < -NEUTRAL_BAND {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Annotate collected reviews with polarity, the derived 1-5 sentiment
/// rating and a tone label.
///
/// The polarity function is an external capability; when it fails for one
/// review the review is treated as neutral rather than failing the listing,
/// and out-of-range values are clamped to [-1, 1].
pub async fn annotate_reviews(reviews: &mut [Review], analyzer: &impl SentimentAnalyzer) {
    for review in reviews.iter_mut() {
        let polarity = match analyzer.polarity(&review.content).await {
            Ok(p) => {
                if !p.is_finite() {
                    tracing::warn!(review_id = review.id, polarity = p, "Non-finite polarity, treating as neutral");
                    0.0
                } else {
                    p.clamp(-1.0, 1.0)
                }
            }
            Err(e) => {
                tracing::warn!(review_id = review.id, error = %e, "Polarity analysis failed, treating as neutral");
                0.0
            }
        };
        review.polarity = Some(polarity);
        review.sentiment_rating = Some(polarity_to_rating(polarity));
        review.sentiment_label = Some(label_for(polarity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FixedAnalyzer {
        polarity: Result<f64, String>,
    }

    #[async_trait]
    impl SentimentAnalyzer for FixedAnalyzer {
        async fn polarity(&self, _text: &str) -> Result<f64> {
            match &self.polarity {
                Ok(p) => Ok(*p),
                Err(message) => Err(anyhow!("{message}")),
            }
        }
    }

    fn review() -> Review {
        Review {
            id: 1,
            author: "Guest".into(),
            content: "Comfortable beds, slow check-in".into(),
            country: None,
            polarity: None,
            sentiment_rating: None,
            sentiment_label: None,
        }
    }

    #[test]
    fn labels_follow_the_neutral_band() {
        assert_eq!(label_for(0.5), SentimentLabel::Positive);
        assert_eq!(label_for(0.1), SentimentLabel::Neutral);
        assert_eq!(label_for(-0.05), SentimentLabel::Neutral);
        assert_eq!(label_for(-0.4), SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn annotates_polarity_and_rating() {
        let mut reviews = vec![review()];
        let analyzer = FixedAnalyzer { polarity: Ok(0.5) };
        annotate_reviews(&mut reviews, &analyzer).await;

        assert_eq!(reviews[0].polarity, Some(0.5));
        assert_eq!(reviews[0].sentiment_rating, Some(4.0));
        assert_eq!(reviews[0].sentiment_label, Some(SentimentLabel::Positive));
    }

    #[tokio::test]
    async fn clamps_out_of_range_polarity() {
        let mut reviews = vec![review()];
        let analyzer = FixedAnalyzer { polarity: Ok(3.7) };
        annotate_reviews(&mut reviews, &analyzer).await;
        assert_eq!(reviews[0].polarity, Some(1.0));
    }

    #[tokio::test]
    async fn failed_analysis_falls_back_to_neutral() {
        let mut reviews = vec![review()];
        let analyzer = FixedAnalyzer {
            polarity: Err("model unavailable".into()),
        };
        annotate_reviews(&mut reviews, &analyzer).await;

        assert_eq!(reviews[0].polarity, Some(0.0));
        assert_eq!(reviews[0].sentiment_rating, Some(3.0));
        assert_eq!(reviews[0].sentiment_label, Some(SentimentLabel::Neutral));
    }
}
