//! Report row model: declarative field mapping, exact dual-representation
//! statistics, and deterministic record identity for downloaded
//! advertising-performance reports.

pub mod audit;
pub mod batch;
pub mod config;
pub mod decimal;
pub mod dimension;
pub mod error;
pub mod field;
pub mod identity;
pub mod projection;
pub mod record;
pub mod record_type;
pub mod reports;
pub mod store;
pub mod types;
