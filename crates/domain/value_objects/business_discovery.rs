use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::business_profiles::BusinessProfileEntity,
    value_objects::{
        enums::subscription_types::SubscriptionType,
        geo::GeoPoint,
        pagination::{PageRequest, Pagination},
        reviews::RatingSummary,
    },
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySort {
    #[default]
    Distance,
    Rating,
}

impl DiscoverySort {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "distance" => Some(DiscoverySort::Distance),
            "rating" => Some(DiscoverySort::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyBusinessQuery {
    pub point: GeoPoint,
    pub max_distance: f64,
    pub search_text: Option<String>,
    pub sort_by: DiscoverySort,
    pub subscription_type: Option<SubscriptionType>,
}

/// One proximity match joined with its owner. Rows arrive ordered by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyBusiness {
    pub business_id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub slug: String,
    pub longitude: f64,
    pub latitude: f64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub banner_image_url: Option<String>,
    pub subscription_type: SubscriptionType,
    pub distance: f64,
    pub owner_full_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessOwnerDto {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbyBusinessDto {
    pub id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub slug: String,
    pub longitude: f64,
    pub latitude: f64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub banner_image_url: Option<String>,
    pub subscription_type: SubscriptionType,
    pub distance: f64,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub owner: BusinessOwnerDto,
}

impl NearbyBusinessDto {
    pub fn from_match(business: NearbyBusiness, summary: RatingSummary) -> Self {
        Self {
            id: business.business_id,
            business_name: business.business_name,
            description: business.description,
            tags: business.tags,
            slug: business.slug,
            longitude: business.longitude,
            latitude: business.latitude,
            state: business.state,
            city: business.city,
            postal_code: business.postal_code,
            street_address: business.street_address,
            banner_image_url: business.banner_image_url,
            subscription_type: business.subscription_type,
            distance: business.distance,
            average_rating: summary.average_rating,
            total_reviews: summary.total_reviews,
            owner: BusinessOwnerDto {
                id: business.user_id,
                full_name: business.owner_full_name,
                email: business.owner_email,
                profile_image_url: business.owner_profile_image_url,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearbyBusinessesDto {
    pub businesses: Vec<NearbyBusinessDto>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminBusinessFilter {
    pub page: PageRequest,
    pub is_approved: Option<bool>,
    pub search_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfileDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub slug: String,
    pub longitude: f64,
    pub latitude: f64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub banner_image_url: Option<String>,
    pub subscription_type: Option<SubscriptionType>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BusinessProfileEntity> for BusinessProfileDto {
    fn from(value: BusinessProfileEntity) -> Self {
        Self {
            subscription_type: SubscriptionType::from_str(&value.subscription_type),
            id: value.id,
            user_id: value.user_id,
            business_name: value.business_name,
            description: value.description,
            tags: value.tags,
            slug: value.slug,
            longitude: value.longitude,
            latitude: value.latitude,
            state: value.state,
            city: value.city,
            postal_code: value.postal_code,
            street_address: value.street_address,
            banner_image_url: value.banner_image_url,
            is_approved: value.is_approved,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BusinessListingDto {
    pub businesses: Vec<BusinessProfileDto>,
    pub pagination: Pagination,
}
