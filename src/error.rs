// Error type shared by every library module. The binary wraps these with
// `anyhow` context and prints them as a single line.

/// Everything that can go wrong between resolving credentials and
/// receiving a consumption report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("credentials not found (checked: {})", .checked.join(", "))]
    MissingCredentials { checked: Vec<String> },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("malformed access token: {0}")]
    TokenFormat(String),

    #[error("session expired or token rejected, please log in again")]
    SessionExpired,

    #[error("request failed with HTTP {status}: {body}")]
    Request { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("invalid fixture {name}: {source}")]
    Fixture {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
