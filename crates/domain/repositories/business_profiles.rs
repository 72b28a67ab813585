use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::business_profiles::BusinessProfileEntity,
    value_objects::{
        business_discovery::{AdminBusinessFilter, NearbyBusiness},
        enums::subscription_types::SubscriptionType,
        geo::{GeoCandidate, GeoPoint},
    },
};

#[automock]
#[async_trait]
pub trait BusinessProfileRepository {
    /// Businesses within `max_distance` metres (inclusive), nearest first.
    async fn find_geo_candidates(
        &self,
        point: GeoPoint,
        max_distance: f64,
    ) -> Result<Vec<GeoCandidate>>;

    /// Same radius rule as `find_geo_candidates`, joined with the owning user.
    async fn find_nearby(
        &self,
        point: GeoPoint,
        max_distance: f64,
        subscription_type: Option<SubscriptionType>,
    ) -> Result<Vec<NearbyBusiness>>;

    async fn find_by_id(&self, business_id: Uuid) -> Result<Option<BusinessProfileEntity>>;

    /// Page of businesses ordered by `created_at` desc, plus the total match count.
    async fn list_paginated(
        &self,
        filter: AdminBusinessFilter,
    ) -> Result<(Vec<BusinessProfileEntity>, i64)>;

    async fn set_approval(
        &self,
        business_id: Uuid,
        is_approved: bool,
    ) -> Result<Option<BusinessProfileEntity>>;
}
