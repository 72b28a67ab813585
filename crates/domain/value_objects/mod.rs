pub mod bookings;
pub mod business_discovery;
pub mod enums;
pub mod geo;
pub mod pagination;
pub mod payments;
pub mod plans;
pub mod reviews;
pub mod service_listing;
pub mod subscriptions;
