use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::{ranking_policies::ListingPolicy, subscription_types::SubscriptionType},
    pagination::{PageRequest, Pagination},
    reviews::RatingSummary,
};

/// Converts a decimal wire price into minor units. Rejects negatives and non-finite input.
pub fn price_to_minor(price: f64) -> Option<i64> {
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    let minor = (price * 100.0).round();
    if minor > i64::MAX as f64 {
        return None;
    }
    Some(minor as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceListingQuery {
    pub policy: ListingPolicy,
    pub price_max_minor: Option<i64>,
    pub page: PageRequest,
    pub search_text: Option<String>,
}

/// Database-side restriction. `business_ids == None` means every approved business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceCandidateFilter {
    pub business_ids: Option<Vec<Uuid>>,
    pub price_max_minor: Option<i64>,
    pub search_text: Option<String>,
}

/// Active service joined with the business fields the listing shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCandidate {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub created_at: DateTime<Utc>,
    pub business_name: String,
    pub business_slug: String,
    pub business_subscription_type: SubscriptionType,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBusinessDto {
    pub id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub subscription_type: SubscriptionType,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListingDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub created_at: DateTime<Utc>,
    pub business: ServiceBusinessDto,
}

impl ServiceListingDto {
    pub fn from_candidate(candidate: ServiceCandidate, summary: RatingSummary) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            description: candidate.description,
            price_minor: candidate.price_minor,
            created_at: candidate.created_at,
            business: ServiceBusinessDto {
                id: candidate.business_id,
                business_name: candidate.business_name,
                slug: candidate.business_slug,
                subscription_type: candidate.business_subscription_type,
                average_rating: summary.average_rating,
                total_reviews: summary.total_reviews,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceListingPage {
    pub services: Vec<ServiceListingDto>,
    pub pagination: Pagination,
}

impl ServiceListingPage {
    pub fn empty(page: PageRequest) -> Self {
        Self {
            services: Vec::new(),
            pagination: Pagination::new(page, 0),
        }
    }
}
