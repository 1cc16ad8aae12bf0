// Wire shapes of the carrier API. Field names follow the server's
// camelCase; keys this crate does not model are kept in `extra` so a
// payload re-serializes to the same JSON it was read from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::fmt;

/// Result of login step 1: the server has sent an SMS and expects the
/// code together with `mfa_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaChallenge {
    pub mfa_token: String,
    /// Human readable delivery confirmation from the server.
    pub description: String,
}

/// An authenticated session. Only `ApiClient::login_complete` creates one.
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Derived from the access token's `sub` claim.
    pub customer_id: String,
    /// Lifetime in seconds as reported at login. Not refreshed.
    pub expires_in: u64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("customer_id", &self.customer_id)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Body of `POST /login` when it answers 401.
#[derive(Deserialize, Debug)]
pub(crate) struct LoginErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub mfa_token: Option<String>,
}

/// Body of a successful `POST /login-with-mfa`.
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".into()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataConsumptionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
    #[serde(default)]
    pub passes: Vec<DataPass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookable_data_passes_available: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msisdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One data allowance (monthly volume, booked pass, ...). Boolean feature
/// flags vary between passes and end up in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPass {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub pass_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_volume_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_consumption: Option<String>,
    /// 0-100; kept as the server's number so it re-serializes unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_consumption: Option<Number>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_timestamp: Option<i64>,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<JsonValue>>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl DataPass {
    /// Consumed share in percent, 0 when the server omitted it.
    pub fn percentage(&self) -> f64 {
        self.percentage_consumption
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }

    /// Boolean feature flags carried by this pass, in key order.
    pub fn flags(&self) -> impl Iterator<Item = (&str, bool)> {
        self.extra
            .iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k.as_str(), b)))
    }
}
