pub mod billing_sweep;
pub mod config;
pub mod usecases;
