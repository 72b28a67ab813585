pub mod billing_sweep;
