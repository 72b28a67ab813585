use chrono::{DateTime, Utc};
use diesel::{prelude::*, sql_types};
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        business_discovery::NearbyBusiness, enums::subscription_types::SubscriptionType,
        geo::GeoCandidate,
    },
    infra::db::postgres::schema::business_profiles,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = business_profiles)]
pub struct BusinessProfileEntity {
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
    pub subscription_type: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result row of the radius query used by ranking.
#[derive(Debug, Clone, QueryableByName)]
pub struct GeoCandidateRow {
    #[diesel(sql_type = sql_types::Uuid)]
    pub id: Uuid,
    #[diesel(sql_type = sql_types::Double)]
    pub distance: f64,
    #[diesel(sql_type = sql_types::Text)]
    pub subscription_type: String,
}

impl From<GeoCandidateRow> for GeoCandidate {
    fn from(value: GeoCandidateRow) -> Self {
        Self {
            business_id: value.id,
            distance: value.distance,
            subscription_type: SubscriptionType::from_str(&value.subscription_type)
                .unwrap_or_default(),
        }
    }
}

/// Result row of the radius query used by discovery, joined with the owning user.
#[derive(Debug, Clone, QueryableByName)]
pub struct NearbyBusinessRow {
    #[diesel(sql_type = sql_types::Uuid)]
    pub id: Uuid,
    #[diesel(sql_type = sql_types::Uuid)]
    pub user_id: Uuid,
    #[diesel(sql_type = sql_types::Text)]
    pub business_name: String,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = sql_types::Array<sql_types::Text>)]
    pub tags: Vec<String>,
    #[diesel(sql_type = sql_types::Text)]
    pub slug: String,
    #[diesel(sql_type = sql_types::Double)]
    pub longitude: f64,
    #[diesel(sql_type = sql_types::Double)]
    pub latitude: f64,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub state: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub city: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub postal_code: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub street_address: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub banner_image_url: Option<String>,
    #[diesel(sql_type = sql_types::Text)]
    pub subscription_type: String,
    #[diesel(sql_type = sql_types::Double)]
    pub distance: f64,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub owner_full_name: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub owner_email: Option<String>,
    #[diesel(sql_type = sql_types::Nullable<sql_types::Text>)]
    pub owner_profile_image_url: Option<String>,
}

impl From<NearbyBusinessRow> for NearbyBusiness {
    fn from(value: NearbyBusinessRow) -> Self {
        Self {
            subscription_type: SubscriptionType::from_str(&value.subscription_type)
                .unwrap_or_default(),
            business_id: value.id,
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
            distance: value.distance,
            owner_full_name: value.owner_full_name,
            owner_email: value.owner_email,
            owner_profile_image_url: value.owner_profile_image_url,
        }
    }
}
