// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper around these modules.
//
// Module responsibilities:
// - `credentials`: finds the account credentials (environment, user
//   config file, local `.env`).
// - `api`: the blocking HTTP client for the carrier backend, including
//   the two-step SMS login.
// - `token`: reads the customer id out of the access token.
// - `models`: request/response shapes.
// - `fixtures`: canned payloads for `--dry-run`.
// - `ui`: progress, SMS prompt and report rendering.
// - `cli`: flags and the end-to-end workflow.
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod token;
pub mod ui;

pub use api::ApiClient;
pub use credentials::{CredentialResolver, Credentials};
pub use error::{Error, Result};
pub use models::{Contract, DataConsumptionReport, DataPass, MfaChallenge, Session};
