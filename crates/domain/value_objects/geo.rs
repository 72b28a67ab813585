use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::enums::subscription_types::SubscriptionType;

pub const DEFAULT_RANKING_RADIUS_METERS: f64 = 25_000.0;
pub const DEFAULT_DISCOVERY_RADIUS_METERS: f64 = 100_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("longitude must be a number between -180 and 180")]
    InvalidLongitude,
    #[error("latitude must be a number between -90 and 90")]
    InvalidLatitude,
    #[error("distance must be a positive number")]
    InvalidDistance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude);
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude);
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

pub fn validate_radius(max_distance: f64) -> Result<f64, GeoError> {
    if max_distance.is_finite() && max_distance > 0.0 {
        Ok(max_distance)
    } else {
        Err(GeoError::InvalidDistance)
    }
}

/// Inclusive: a point exactly on the boundary is inside.
pub fn within_radius(distance: f64, max_distance: f64) -> bool {
    distance <= max_distance
}

/// Raw output of the proximity query, before any ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCandidate {
    pub business_id: Uuid,
    pub distance: f64,
    pub subscription_type: SubscriptionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan_and_out_of_range_coordinates() {
        assert_eq!(GeoPoint::new(f64::NAN, 0.0), Err(GeoError::InvalidLongitude));
        assert_eq!(GeoPoint::new(181.0, 0.0), Err(GeoError::InvalidLongitude));
        assert_eq!(GeoPoint::new(0.0, f64::INFINITY), Err(GeoError::InvalidLatitude));
        assert_eq!(GeoPoint::new(0.0, -90.5), Err(GeoError::InvalidLatitude));
        assert!(GeoPoint::new(-180.0, 90.0).is_ok());
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(within_radius(25_000.0, 25_000.0));
        assert!(!within_radius(25_000.001, 25_000.0));
    }

    #[test]
    fn radius_must_be_positive() {
        assert_eq!(validate_radius(0.0), Err(GeoError::InvalidDistance));
        assert_eq!(validate_radius(-5.0), Err(GeoError::InvalidDistance));
        assert_eq!(validate_radius(f64::NAN), Err(GeoError::InvalidDistance));
        assert_eq!(validate_radius(10.0), Ok(10.0));
    }
}
