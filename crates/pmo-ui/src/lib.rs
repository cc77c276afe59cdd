//! Terminal UI layer for PMO Analytics.
//!
//! Provides themes, KPI and chart rendering, and the interactive dashboard
//! event loop built on top of [`ratatui`]: six navigable views with
//! multi-select project filters that recompute figures synchronously from
//! the shared data store.

pub mod app;
pub mod charts;
pub mod themes;

pub use pmo_core as core;
