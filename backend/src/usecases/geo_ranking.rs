use std::{cmp::Ordering, sync::Arc};

use marketplace::domain::{
    repositories::{business_profiles::BusinessProfileRepository, reviews::ReviewRepository},
    value_objects::{
        enums::ranking_policies::NearbyPolicy,
        geo::{GeoCandidate, GeoPoint, within_radius},
        reviews::RatingSummaries,
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::review_aggregator::ReviewAggregator;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("failed to rank nearby businesses")]
    Failure(#[from] anyhow::Error),
}

impl RankingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Sponsored placement is always the leading key.
fn sponsored_first(a: &GeoCandidate, b: &GeoCandidate) -> Ordering {
    b.subscription_type
        .is_sponsored()
        .cmp(&a.subscription_type.is_sponsored())
}

fn by_distance(a: &GeoCandidate, b: &GeoCandidate) -> Ordering {
    a.distance.total_cmp(&b.distance)
}

pub fn rank_nearest(mut candidates: Vec<GeoCandidate>) -> Vec<GeoCandidate> {
    candidates.sort_by(|a, b| sponsored_first(a, b).then_with(|| by_distance(a, b)));
    candidates
}

pub fn rank_best_rating(
    mut candidates: Vec<GeoCandidate>,
    summaries: &RatingSummaries,
) -> Vec<GeoCandidate> {
    candidates.sort_by(|a, b| {
        let rating_a = summaries.get(&a.business_id);
        let rating_b = summaries.get(&b.business_id);

        sponsored_first(a, b)
            .then_with(|| rating_b.average_rating.total_cmp(&rating_a.average_rating))
            .then_with(|| rating_b.total_reviews.cmp(&rating_a.total_reviews))
            .then_with(|| by_distance(a, b))
    });
    candidates
}

pub struct GeoRankingEngine<B, R>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    business_repo: Arc<B>,
    review_aggregator: ReviewAggregator<R>,
    max_distance: f64,
}

impl<B, R> GeoRankingEngine<B, R>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    pub fn new(business_repo: Arc<B>, review_repo: Arc<R>, max_distance: f64) -> Self {
        Self {
            business_repo,
            review_aggregator: ReviewAggregator::new(review_repo),
            max_distance,
        }
    }

    /// Ids of businesses within the ranking radius, best first. No pagination.
    pub async fn rank_nearby(
        &self,
        point: GeoPoint,
        policy: NearbyPolicy,
    ) -> Result<Vec<Uuid>, RankingError> {
        let candidates = self
            .business_repo
            .find_geo_candidates(point, self.max_distance)
            .await
            .map_err(|err| {
                error!(
                    longitude = point.longitude,
                    latitude = point.latitude,
                    db_error = ?err,
                    "ranking: proximity query failed"
                );
                RankingError::Failure(err)
            })?;

        let candidates: Vec<GeoCandidate> = candidates
            .into_iter()
            .filter(|candidate| within_radius(candidate.distance, self.max_distance))
            .collect();

        if candidates.is_empty() {
            info!(?policy, "ranking: no businesses within radius");
            return Ok(Vec::new());
        }

        let ranked = match policy {
            NearbyPolicy::Nearest => rank_nearest(candidates),
            NearbyPolicy::BestRating => {
                let ids = candidates.iter().map(|c| c.business_id).collect();
                let summaries = self.review_aggregator.summaries(ids).await.map_err(|err| {
                    error!(db_error = ?err, "ranking: failed to load rating summaries");
                    RankingError::Failure(err)
                })?;
                rank_best_rating(candidates, &summaries)
            }
        };

        info!(?policy, ranked = ranked.len(), "ranking: businesses ranked");
        Ok(ranked.into_iter().map(|c| c.business_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace::domain::{
        repositories::{
            business_profiles::MockBusinessProfileRepository, reviews::MockReviewRepository,
        },
        value_objects::{enums::subscription_types::SubscriptionType, reviews::RatingSummary},
    };

    fn candidate(distance: f64, tier: SubscriptionType) -> GeoCandidate {
        GeoCandidate {
            business_id: Uuid::new_v4(),
            distance,
            subscription_type: tier,
        }
    }

    fn ids(candidates: &[GeoCandidate]) -> Vec<Uuid> {
        candidates.iter().map(|c| c.business_id).collect()
    }

    fn point() -> GeoPoint {
        GeoPoint::new(100.5, 13.7).unwrap()
    }

    #[test]
    fn nearest_puts_sponsored_first_then_distance() {
        let far_free = candidate(900.0, SubscriptionType::Free);
        let near_standard = candidate(100.0, SubscriptionType::Standard);
        let far_sponsored = candidate(2000.0, SubscriptionType::Sponsored);
        let near_sponsored = candidate(300.0, SubscriptionType::Sponsored);

        let ranked = rank_nearest(vec![
            far_free.clone(),
            near_standard.clone(),
            far_sponsored.clone(),
            near_sponsored.clone(),
        ]);

        assert_eq!(
            ids(&ranked),
            vec![
                near_sponsored.business_id,
                far_sponsored.business_id,
                near_standard.business_id,
                far_free.business_id,
            ]
        );
    }

    #[test]
    fn best_rating_never_lifts_unsponsored_above_sponsored() {
        let sponsored = candidate(5000.0, SubscriptionType::Sponsored);
        let top_rated = candidate(10.0, SubscriptionType::Standard);
        let summaries: RatingSummaries = vec![
            (
                sponsored.business_id,
                RatingSummary {
                    average_rating: 1.0,
                    total_reviews: 1,
                },
            ),
            (
                top_rated.business_id,
                RatingSummary {
                    average_rating: 5.0,
                    total_reviews: 40,
                },
            ),
        ]
        .into_iter()
        .collect();

        let ranked = rank_best_rating(vec![top_rated.clone(), sponsored.clone()], &summaries);
        assert_eq!(ids(&ranked), vec![sponsored.business_id, top_rated.business_id]);
    }

    #[test]
    fn best_rating_breaks_ties_by_review_count_then_distance() {
        let few_reviews = candidate(10.0, SubscriptionType::Free);
        let many_reviews = candidate(50.0, SubscriptionType::Free);
        let same_as_many_but_farther = candidate(80.0, SubscriptionType::Free);
        let summary = |total_reviews| RatingSummary {
            average_rating: 4.0,
            total_reviews,
        };
        let summaries: RatingSummaries = vec![
            (few_reviews.business_id, summary(2)),
            (many_reviews.business_id, summary(9)),
            (same_as_many_but_farther.business_id, summary(9)),
        ]
        .into_iter()
        .collect();

        let ranked = rank_best_rating(
            vec![
                same_as_many_but_farther.clone(),
                few_reviews.clone(),
                many_reviews.clone(),
            ],
            &summaries,
        );

        assert_eq!(
            ids(&ranked),
            vec![
                many_reviews.business_id,
                same_as_many_but_farther.business_id,
                few_reviews.business_id,
            ]
        );
    }

    #[test]
    fn equal_candidates_keep_input_order() {
        let first = candidate(100.0, SubscriptionType::Free);
        let second = candidate(100.0, SubscriptionType::Free);
        let third = candidate(100.0, SubscriptionType::Free);

        let ranked = rank_nearest(vec![first.clone(), second.clone(), third.clone()]);
        assert_eq!(
            ids(&ranked),
            vec![first.business_id, second.business_id, third.business_id]
        );

        let ranked = rank_best_rating(
            vec![first.clone(), second.clone(), third.clone()],
            &RatingSummaries::default(),
        );
        assert_eq!(
            ids(&ranked),
            vec![first.business_id, second.business_id, third.business_id]
        );
    }

    #[tokio::test]
    async fn radius_boundary_is_inclusive() {
        let on_boundary = candidate(25_000.0, SubscriptionType::Free);
        let outside = candidate(25_000.5, SubscriptionType::Sponsored);
        let returned = vec![on_boundary.clone(), outside];

        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_geo_candidates()
            .returning(move |_, _| Ok(returned.clone()));
        let review_repo = MockReviewRepository::new();

        let engine = GeoRankingEngine::new(Arc::new(business_repo), Arc::new(review_repo), 25_000.0);
        let ranked = engine.rank_nearby(point(), NearbyPolicy::Nearest).await.unwrap();

        assert_eq!(ranked, vec![on_boundary.business_id]);
    }

    #[tokio::test]
    async fn no_candidates_is_an_empty_result() {
        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_geo_candidates()
            .returning(|_, _| Ok(Vec::new()));
        let review_repo = MockReviewRepository::new();

        let engine = GeoRankingEngine::new(Arc::new(business_repo), Arc::new(review_repo), 25_000.0);
        let ranked = engine.rank_nearby(point(), NearbyPolicy::BestRating).await.unwrap();

        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn best_rating_loads_summaries_for_candidates() {
        let low = candidate(10.0, SubscriptionType::Free);
        let high = candidate(20.0, SubscriptionType::Free);
        let returned = vec![low.clone(), high.clone()];
        let high_id = high.business_id;

        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_geo_candidates()
            .returning(move |_, _| Ok(returned.clone()));
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_rating_summaries()
            .times(1)
            .returning(move |_| {
                Ok(vec![(
                    high_id,
                    RatingSummary {
                        average_rating: 4.8,
                        total_reviews: 12,
                    },
                )])
            });

        let engine = GeoRankingEngine::new(Arc::new(business_repo), Arc::new(review_repo), 25_000.0);
        let ranked = engine.rank_nearby(point(), NearbyPolicy::BestRating).await.unwrap();

        assert_eq!(ranked, vec![high.business_id, low.business_id]);
    }

    #[tokio::test]
    async fn data_access_failure_is_a_ranking_failure() {
        let mut business_repo = MockBusinessProfileRepository::new();
        business_repo
            .expect_find_geo_candidates()
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));
        let review_repo = MockReviewRepository::new();

        let engine = GeoRankingEngine::new(Arc::new(business_repo), Arc::new(review_repo), 25_000.0);
        let err = engine
            .rank_nearby(point(), NearbyPolicy::Nearest)
            .await
            .unwrap_err();

        assert!(matches!(err, RankingError::Failure(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
