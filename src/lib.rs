//! Macro indicator database for the copper/gold ratio research note.
//!
//! Time series fetched from FRED and Yahoo Finance are normalized into a
//! canonical `(date, value)` schema, stored in SQLite keyed by indicator
//! name, and served back out for derivation (ratios, percent changes,
//! z-score composites) and export (wide CSV, JSON report).
//!
//! Inserting a series is a full replace of everything stored under that
//! name, not an incremental merge; see [`store::IndicatorStore::insert`].

pub mod analysis;
pub mod derive;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod models;
pub mod registry;
pub mod store;
pub mod timeseries;

pub use error::{Error, Result};
pub use models::{IndicatorMeta, Observation, Provenance};
pub use store::IndicatorStore;
