//! tariffscope core: domain types, price data providers, record ingestion.
//!
//! This crate holds everything below the analysis pipeline:
//! - Domain types (tariff events, daily price records, event-window metrics)
//! - The `DataProvider` seam with CSV-directory and Stooq implementations
//! - Ingestion: sorting, de-duplication and OHLC sanity filtering

pub mod data;
pub mod domain;
