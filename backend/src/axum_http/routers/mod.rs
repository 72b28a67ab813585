pub mod admin;
pub mod businesses;
pub mod reviews;
pub mod services;
pub mod subscriptions;

use marketplace::domain::value_objects::{
    geo::GeoPoint,
    pagination::PageRequest,
};

use super::error_responses::AppError;

/// Coordinates are required together and must be finite and in range.
pub(crate) fn parse_point(longitude: Option<f64>, latitude: Option<f64>) -> Result<GeoPoint, AppError> {
    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => {
            GeoPoint::new(longitude, latitude).map_err(|err| AppError::bad_request(err.to_string()))
        }
        _ => Err(AppError::bad_request(
            "longitude and latitude are required",
        )),
    }
}

pub(crate) fn parse_page(page: Option<i64>, limit: Option<i64>) -> Result<PageRequest, AppError> {
    PageRequest::new(page, limit).map_err(|err| AppError::bad_request(err.to_string()))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_must_come_in_pairs() {
        assert!(parse_point(Some(100.5), None).is_err());
        assert!(parse_point(None, Some(13.7)).is_err());
        assert!(parse_point(Some(f64::NAN), Some(13.7)).is_err());
        assert!(parse_point(Some(100.5), Some(91.0)).is_err());
        assert_eq!(
            parse_point(Some(100.5), Some(13.7)).unwrap(),
            GeoPoint::new(100.5, 13.7).unwrap()
        );
    }

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" spa ".to_string())), Some("spa".to_string()));
    }

    #[test]
    fn bad_paging_is_a_client_error() {
        assert_eq!(
            parse_page(Some(0), None).unwrap_err().status(),
            axum::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(parse_page(None, Some(500)).unwrap().limit, 100);
    }
}
