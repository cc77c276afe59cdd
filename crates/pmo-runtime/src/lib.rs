//! Runtime layer for PMO Analytics.
//!
//! Owns the load-once data store, the registry of named view pipelines, and
//! the two batch front ends (static HTML report, console summary).

pub mod report;
pub mod store;
pub mod summary;
pub mod views;

pub use pmo_core as core;
pub use pmo_data as data;
