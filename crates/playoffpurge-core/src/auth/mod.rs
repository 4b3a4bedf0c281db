//! Authentication against Google for server-to-server sheet reads.
//!
//! A service account signs an RS256 JWT assertion which is exchanged at the
//! OAuth token endpoint for a short-lived bearer token. Tokens are kept in
//! memory and renewed five minutes before they expire.

pub mod service_account;

pub use service_account::{AccessToken, ServiceAccountAuth, ServiceAccountKey};
