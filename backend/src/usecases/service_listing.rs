use std::{collections::HashMap, sync::Arc};

use marketplace::domain::{
    repositories::{reviews::ReviewRepository, services::ServiceRepository},
    value_objects::{
        enums::ranking_policies::ListingPolicy,
        pagination::paginate,
        service_listing::{
            ServiceCandidate, ServiceCandidateFilter, ServiceListingDto, ServiceListingPage,
            ServiceListingQuery,
        },
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::review_aggregator::ReviewAggregator;

#[derive(Debug, Error)]
pub enum ServiceListingError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceListingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Sponsored business first, then (outside `Recent`) the ranked business order, then newest.
pub fn order_services(
    mut services: Vec<ServiceCandidate>,
    policy: ListingPolicy,
    ranked_business_ids: &[Uuid],
) -> Vec<ServiceCandidate> {
    let rank: HashMap<Uuid, usize> = ranked_business_ids
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect();

    services.sort_by(|a, b| {
        let sponsored = b
            .business_subscription_type
            .is_sponsored()
            .cmp(&a.business_subscription_type.is_sponsored());

        let business_order = match policy {
            ListingPolicy::Recent => std::cmp::Ordering::Equal,
            ListingPolicy::BestRating | ListingPolicy::Nearest => {
                let rank_a = rank.get(&a.business_id).copied().unwrap_or(usize::MAX);
                let rank_b = rank.get(&b.business_id).copied().unwrap_or(usize::MAX);
                rank_a.cmp(&rank_b)
            }
        };

        sponsored
            .then(business_order)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    services
}

pub struct ServiceListingUseCase<S, R>
where
    S: ServiceRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    service_repo: Arc<S>,
    review_aggregator: ReviewAggregator<R>,
}

impl<S, R> ServiceListingUseCase<S, R>
where
    S: ServiceRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    pub fn new(service_repo: Arc<S>, review_repo: Arc<R>) -> Self {
        Self {
            service_repo,
            review_aggregator: ReviewAggregator::new(review_repo),
        }
    }

    pub async fn list_services(
        &self,
        business_ids: Vec<Uuid>,
        query: ServiceListingQuery,
    ) -> Result<ServiceListingPage, ServiceListingError> {
        let is_recent = query.policy == ListingPolicy::Recent;
        if !is_recent && business_ids.is_empty() {
            info!(policy = %query.policy, "services: no ranked businesses, empty listing");
            return Ok(ServiceListingPage::empty(query.page));
        }

        let filter = ServiceCandidateFilter {
            business_ids: (!is_recent).then(|| business_ids.clone()),
            price_max_minor: query.price_max_minor,
            search_text: query
                .search_text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        };

        let mut candidates = self
            .service_repo
            .list_active_candidates(filter)
            .await
            .map_err(|err| {
                error!(policy = %query.policy, db_error = ?err, "services: candidate query failed");
                ServiceListingError::Internal(err)
            })?;
        if let Some(price_max) = query.price_max_minor {
            candidates.retain(|service| service.price_minor <= price_max);
        }

        let ordered = order_services(candidates, query.policy, &business_ids);
        let (page_items, pagination) = paginate(ordered, query.page);

        let mut page_business_ids: Vec<Uuid> =
            page_items.iter().map(|service| service.business_id).collect();
        page_business_ids.sort();
        page_business_ids.dedup();

        let summaries = self
            .review_aggregator
            .summaries(page_business_ids)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "services: failed to load rating summaries");
                ServiceListingError::Internal(err)
            })?;

        let services = page_items
            .into_iter()
            .map(|service| {
                let summary = summaries.get(&service.business_id);
                ServiceListingDto::from_candidate(service, summary)
            })
            .collect();

        info!(
            policy = %query.policy,
            total_docs = pagination.total_docs,
            page = pagination.page,
            "services: listing resolved"
        );
        Ok(ServiceListingPage {
            services,
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use marketplace::domain::{
        repositories::{reviews::MockReviewRepository, services::MockServiceRepository},
        value_objects::{
            enums::subscription_types::SubscriptionType, pagination::PageRequest,
        },
    };

    fn service(
        name: &str,
        business_id: Uuid,
        tier: SubscriptionType,
        created_at: DateTime<Utc>,
        price_minor: i64,
    ) -> ServiceCandidate {
        ServiceCandidate {
            id: Uuid::new_v4(),
            business_id,
            name: name.to_string(),
            description: None,
            price_minor,
            created_at,
            business_name: "Biz".to_string(),
            business_slug: "biz".to_string(),
            business_subscription_type: tier,
        }
    }

    fn names(services: &[ServiceCandidate]) -> Vec<&str> {
        services.iter().map(|s| s.name.as_str()).collect()
    }

    fn query(policy: ListingPolicy, page: PageRequest) -> ServiceListingQuery {
        ServiceListingQuery {
            policy,
            price_max_minor: None,
            page,
            search_text: None,
        }
    }

    #[test]
    fn ranked_order_is_secondary_to_sponsorship() {
        let now = Utc::now();
        let first_ranked = Uuid::new_v4();
        let second_ranked = Uuid::new_v4();
        let sponsored = Uuid::new_v4();

        let ordered = order_services(
            vec![
                service("old-first", first_ranked, SubscriptionType::Free, now - Duration::days(3), 100),
                service("second", second_ranked, SubscriptionType::Standard, now, 100),
                service("new-first", first_ranked, SubscriptionType::Free, now, 100),
                service("sponsored", sponsored, SubscriptionType::Sponsored, now - Duration::days(9), 100),
            ],
            ListingPolicy::Nearest,
            &[first_ranked, second_ranked, sponsored],
        );

        assert_eq!(names(&ordered), vec!["sponsored", "new-first", "old-first", "second"]);
    }

    #[test]
    fn recent_ignores_business_order() {
        let now = Utc::now();
        let ordered = order_services(
            vec![
                service("old", Uuid::new_v4(), SubscriptionType::Free, now - Duration::days(2), 100),
                service("new", Uuid::new_v4(), SubscriptionType::Free, now, 100),
                service("sponsored-old", Uuid::new_v4(), SubscriptionType::Sponsored, now - Duration::days(5), 100),
            ],
            ListingPolicy::Recent,
            &[],
        );

        assert_eq!(names(&ordered), vec!["sponsored-old", "new", "old"]);
    }

    #[tokio::test]
    async fn empty_ranking_short_circuits_without_querying() {
        let service_repo = MockServiceRepository::new();
        let review_repo = MockReviewRepository::new();
        let usecase = ServiceListingUseCase::new(Arc::new(service_repo), Arc::new(review_repo));

        let page = usecase
            .list_services(Vec::new(), query(ListingPolicy::BestRating, PageRequest::default()))
            .await
            .unwrap();

        assert!(page.services.is_empty());
        assert_eq!(page.pagination.total_docs, 0);
    }

    #[tokio::test]
    async fn recent_with_no_ids_lists_every_active_service() {
        let now = Utc::now();
        let rows = vec![
            service("a", Uuid::new_v4(), SubscriptionType::Free, now, 100),
            service("b", Uuid::new_v4(), SubscriptionType::Free, now - Duration::hours(1), 100),
        ];

        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_list_active_candidates()
            .withf(|filter| filter.business_ids.is_none())
            .times(1)
            .returning(move |_| Ok(rows.clone()));
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_rating_summaries()
            .returning(|_| Ok(Vec::new()));

        let usecase = ServiceListingUseCase::new(Arc::new(service_repo), Arc::new(review_repo));
        let page = usecase
            .list_services(Vec::new(), query(ListingPolicy::Recent, PageRequest::default()))
            .await
            .unwrap();

        assert_eq!(page.pagination.total_docs, 2);
        assert_eq!(page.services[0].name, "a");
        assert_eq!(page.services[1].name, "b");
    }

    #[tokio::test]
    async fn paginates_after_sorting_and_drops_expensive_services() {
        let now = Utc::now();
        let business_id = Uuid::new_v4();
        let rows: Vec<ServiceCandidate> = (0..5)
            .map(|i| {
                service(
                    &format!("s{i}"),
                    business_id,
                    SubscriptionType::Free,
                    now - Duration::minutes(i),
                    if i == 4 { 99_999 } else { 1_000 },
                )
            })
            .collect();

        let mut service_repo = MockServiceRepository::new();
        service_repo
            .expect_list_active_candidates()
            .withf(move |filter| filter.business_ids == Some(vec![business_id]))
            .returning(move |_| Ok(rows.clone()));
        let mut review_repo = MockReviewRepository::new();
        review_repo
            .expect_rating_summaries()
            .returning(|_| Ok(Vec::new()));

        let usecase = ServiceListingUseCase::new(Arc::new(service_repo), Arc::new(review_repo));
        let mut listing_query = query(ListingPolicy::Nearest, PageRequest::new(Some(2), Some(3)).unwrap());
        listing_query.price_max_minor = Some(2_000);

        let page = usecase
            .list_services(vec![business_id], listing_query)
            .await
            .unwrap();

        assert_eq!(page.pagination.total_docs, 4);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.services.len(), 1);
        assert_eq!(page.services[0].name, "s3");
    }
}
