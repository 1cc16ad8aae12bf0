// Access token inspection. Only the payload segment is decoded; the
// signature is never checked. The token is trusted because it arrives
// straight from the login endpoint over TLS, not because it was verified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Decode the payload (middle) segment of a JWT-shaped token into JSON.
pub fn decode_payload(access_token: &str) -> Result<JsonValue> {
    let segments: Vec<&str> = access_token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::TokenFormat(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }

    // JWT omits padding, but accept it if the server ever sends it.
    let payload = segments[1].trim_end_matches('=');
    if payload.is_empty() {
        return Err(Error::TokenFormat("empty payload segment".into()));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::TokenFormat(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::TokenFormat(format!("payload is not JSON: {e}")))
}

/// Extract the numeric customer id from the token's `sub` claim.
///
/// The claim looks like `f:<uuid>:<customer id>`; the last colon-delimited
/// component is the id. A claim without colons is used as-is.
pub fn extract_customer_id(access_token: &str) -> Result<String> {
    let payload = decode_payload(access_token)?;
    let sub = payload
        .get("sub")
        .ok_or_else(|| Error::TokenFormat("payload has no `sub` claim".into()))?
        .as_str()
        .ok_or_else(|| Error::TokenFormat("`sub` claim is not a string".into()))?;

    let customer_id = sub.rsplit(':').next().unwrap_or(sub).trim();
    if customer_id.is_empty() {
        return Err(Error::TokenFormat(format!(
            "`sub` claim `{sub}` has no customer id"
        )));
    }
    Ok(customer_id.to_string())
}
