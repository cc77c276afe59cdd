//! Core domain layer for PMO Analytics.
//!
//! Holds the cell value model with its explicit absent sentinel, the fixed
//! table/column schema contract, the error taxonomy, number and currency
//! formatting, and CLI settings with last-used persistence.

pub mod error;
pub mod formatting;
pub mod schema;
pub mod settings;
pub mod value;
