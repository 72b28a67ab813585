pub mod bookings;
pub mod business_profiles;
pub mod leases;
pub mod payment_cards;
pub mod reviews;
pub mod services;
pub mod subscriptions;
