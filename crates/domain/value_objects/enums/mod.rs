pub mod booking_statuses;
pub mod expiry_reasons;
pub mod ranking_policies;
pub mod subscription_statuses;
pub mod subscription_types;
