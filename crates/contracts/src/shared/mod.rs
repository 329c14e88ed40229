pub mod metrics;
pub mod period;
