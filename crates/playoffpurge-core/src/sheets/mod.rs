//! Google Sheets access for the league spreadsheet.
//!
//! `SheetsClient` pulls all four tabs in one `values:batchGet` call and
//! `rows` turns the raw cell grids into typed records. Authentication is
//! either a service-account bearer token (see `crate::auth`) or an API key
//! for publicly shared sheets.

pub mod client;
pub mod error;
pub mod rows;

pub use client::{SheetsAuth, SheetsClient, SHEETS_BASE_URL};
pub use error::SheetsError;
