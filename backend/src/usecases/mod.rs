pub mod admin;
pub mod business_discovery;
pub mod geo_ranking;
pub mod review_aggregator;
pub mod reviews;
pub mod service_listing;
pub mod subscription_sync;
pub mod subscriptions;
