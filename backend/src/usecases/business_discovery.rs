use std::sync::Arc;

use marketplace::domain::{
    repositories::{business_profiles::BusinessProfileRepository, reviews::ReviewRepository},
    value_objects::{
        business_discovery::{
            AdminBusinessFilter, BusinessListingDto, BusinessProfileDto, DiscoverySort,
            NearbyBusiness, NearbyBusinessDto, NearbyBusinessQuery, NearbyBusinessesDto,
        },
        geo::within_radius,
        pagination::Pagination,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::review_aggregator::ReviewAggregator;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("business not found")]
    BusinessNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiscoveryError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DiscoveryError::BusinessNotFound => StatusCode::NOT_FOUND,
            DiscoveryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DiscoveryError>;

/// Lower is better: exact tag, then name, then description, then partial tag.
fn match_priority(business: &NearbyBusiness, needle: &str) -> Option<u8> {
    let tag_exact = business.tags.iter().any(|tag| tag.to_lowercase() == needle);
    let tag_partial = business
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(needle));
    let name = business.business_name.to_lowercase().contains(needle);
    let description = business
        .description
        .as_deref()
        .is_some_and(|text| text.to_lowercase().contains(needle));

    if tag_exact {
        Some(0)
    } else if name {
        Some(1)
    } else if description {
        Some(2)
    } else if tag_partial {
        Some(3)
    } else {
        None
    }
}

/// Tier partition, then optional text filtering with a stable priority re-sort.
pub fn order_matches(
    mut businesses: Vec<NearbyBusiness>,
    search_text: Option<&str>,
) -> Vec<NearbyBusiness> {
    businesses.sort_by_key(|business| !business.subscription_type.is_sponsored());

    let Some(needle) = search_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
    else {
        return businesses;
    };

    let mut matched: Vec<(u8, NearbyBusiness)> = businesses
        .into_iter()
        .filter_map(|business| match_priority(&business, &needle).map(|p| (p, business)))
        .collect();
    matched.sort_by_key(|(priority, _)| *priority);

    matched.into_iter().map(|(_, business)| business).collect()
}

/// Runs last, so it overrides every earlier ordering step.
pub fn apply_sort(mut businesses: Vec<NearbyBusinessDto>, sort_by: DiscoverySort) -> Vec<NearbyBusinessDto> {
    if sort_by == DiscoverySort::Rating {
        businesses.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    }
    businesses
}

pub struct BusinessDiscoveryUseCase<B, R>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    business_repo: Arc<B>,
    review_aggregator: ReviewAggregator<R>,
}

impl<B, R> BusinessDiscoveryUseCase<B, R>
where
    B: BusinessProfileRepository + Send + Sync + 'static,
    R: ReviewRepository + Send + Sync + 'static,
{
    pub fn new(business_repo: Arc<B>, review_repo: Arc<R>) -> Self {
        Self {
            business_repo,
            review_aggregator: ReviewAggregator::new(review_repo),
        }
    }

    pub async fn find_nearby(&self, query: NearbyBusinessQuery) -> UseCaseResult<NearbyBusinessesDto> {
        let max_distance = query.max_distance;
        let matches = self
            .business_repo
            .find_nearby(query.point, max_distance, query.subscription_type)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "discovery: proximity query failed");
                DiscoveryError::Internal(err)
            })?;

        let matches: Vec<NearbyBusiness> = matches
            .into_iter()
            .filter(|business| within_radius(business.distance, max_distance))
            .collect();
        let ordered = order_matches(matches, query.search_text.as_deref());

        let ids = ordered.iter().map(|business| business.business_id).collect();
        let summaries = self.review_aggregator.summaries(ids).await.map_err(|err| {
            error!(db_error = ?err, "discovery: failed to load rating summaries");
            DiscoveryError::Internal(err)
        })?;

        let enriched = ordered
            .into_iter()
            .map(|business| {
                let summary = summaries.get(&business.business_id);
                NearbyBusinessDto::from_match(business, summary)
            })
            .collect();
        let businesses = apply_sort(enriched, query.sort_by);

        info!(
            found = businesses.len(),
            sort_by = ?query.sort_by,
            searched = query.search_text.is_some(),
            "discovery: nearby businesses resolved"
        );
        Ok(NearbyBusinessesDto { businesses })
    }

    pub async fn list_businesses(&self, filter: AdminBusinessFilter) -> UseCaseResult<BusinessListingDto> {
        let page = filter.page;
        let (businesses, total_docs) = self
            .business_repo
            .list_paginated(filter)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "discovery: failed to list businesses");
                DiscoveryError::Internal(err)
            })?;

        Ok(BusinessListingDto {
            businesses: businesses.into_iter().map(BusinessProfileDto::from).collect(),
            pagination: Pagination::new(page, total_docs),
        })
    }

    pub async fn set_approval(
        &self,
        business_id: Uuid,
        is_approved: bool,
    ) -> UseCaseResult<BusinessProfileDto> {
        let updated = self
            .business_repo
            .set_approval(business_id, is_approved)
            .await
            .map_err(|err| {
                error!(%business_id, db_error = ?err, "discovery: failed to set approval");
                DiscoveryError::Internal(err)
            })?;

        match updated {
            Some(business) => {
                info!(%business_id, is_approved, "discovery: approval updated");
                Ok(BusinessProfileDto::from(business))
            }
            None => {
                warn!(%business_id, "discovery: approval target not found");
                Err(DiscoveryError::BusinessNotFound)
            }
        }
    }
}
