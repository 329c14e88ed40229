pub mod aggregation;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod fiscal;
pub mod metrics;
