use std::sync::Arc;

use marketplace::domain::{
    repositories::bookings::BookingRepository,
    value_objects::{
        bookings::{BookingDto, BookingFilter, BookingListingDto},
        pagination::Pagination,
    },
};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub struct BookingAdminUseCase<K>
where
    K: BookingRepository + Send + Sync + 'static,
{
    booking_repo: Arc<K>,
}

impl<K> BookingAdminUseCase<K>
where
    K: BookingRepository + Send + Sync + 'static,
{
    pub fn new(booking_repo: Arc<K>) -> Self {
        Self { booking_repo }
    }

    pub async fn list_bookings(&self, filter: BookingFilter) -> Result<BookingListingDto, AdminError> {
        let page = filter.page;
        let status = filter.booking_status.map(|status| status.code());

        let (bookings, total_docs) = self
            .booking_repo
            .list_paginated(filter)
            .await
            .map_err(|err| {
                error!(booking_status = ?status, db_error = ?err, "admin: booking listing failed");
                AdminError::Internal(err)
            })?;

        info!(booking_status = ?status, total_docs, "admin: bookings listed");
        Ok(BookingListingDto {
            bookings: bookings.into_iter().map(BookingDto::from).collect(),
            pagination: Pagination::new(page, total_docs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marketplace::domain::{
        entities::bookings::BookingEntity,
        repositories::bookings::MockBookingRepository,
        value_objects::{enums::booking_statuses::BookingStatus, pagination::PageRequest},
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn booking(status: BookingStatus) -> BookingEntity {
        BookingEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            provider_user_id: Uuid::new_v4(),
            booking_status: status.code(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn passes_status_filter_and_paginates() {
        let filter = BookingFilter {
            page: PageRequest::new(Some(2), Some(5)).unwrap(),
            booking_status: Some(BookingStatus::Paid),
        };

        let mut repo = MockBookingRepository::new();
        repo.expect_list_paginated()
            .with(eq(filter.clone()))
            .times(1)
            .returning(|_| Ok((vec![booking(BookingStatus::Paid)], 6)));

        let usecase = BookingAdminUseCase::new(Arc::new(repo));
        let listing = usecase.list_bookings(filter).await.unwrap();

        assert_eq!(listing.bookings.len(), 1);
        assert_eq!(listing.bookings[0].booking_status, BookingStatus::Paid.code());
        assert_eq!(listing.pagination.page, 2);
        assert_eq!(listing.pagination.total_pages, 2);
        assert_eq!(listing.pagination.total_docs, 6);
    }
}
