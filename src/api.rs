// API client module: a small blocking HTTP client for the fraenk app
// backend. It holds no token state; login produces a `Session` that is
// passed explicitly into every authenticated call.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::{
    Contract, DataConsumptionReport, LoginErrorBody, MfaChallenge, Session, TokenResponse,
};
use crate::token;

pub const DEFAULT_BASE_URL: &str = "https://app.fraenk.de/fraenk-rest-service/app/v13";

/// `error` value of the 401 that starts the SMS step.
pub const MFA_REQUIRED: &str = "mfa_required";

/// Headers the backend expects from its Android app (`X-Tenant`,
/// `X-App-OS`, ...). Sent on every request; the server rejects clients
/// without them. Names are lowercase as `HeaderName::from_static` requires.
pub const APP_HEADERS: [(&str, &str); 6] = [
    ("x-tenant", "fraenk"),
    ("x-app-os", "Android"),
    ("x-app-device", "Python-Client"),
    ("x-app-device-vendor", "Python"),
    ("x-app-os-version", "13"),
    ("x-app-version", "1.13.9"),
];

/// Blocking client for the carrier's REST endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in APP_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Login step 1: password grant. The server answers 401 with
    /// `error = "mfa_required"` and sends an SMS; that answer is the
    /// success case here.
    pub fn login_initiate(&self, username: &str, password: &str) -> Result<MfaChallenge> {
        let req = self.client.post(self.url("/login")).form(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("scope", "app"),
        ]);
        let res = send(req, "POST /login")?;
        let status = res.status();
        let body = res.text()?;

        let parsed: Option<LoginErrorBody> = serde_json::from_str(&body).ok();
        if let Some(challenge) = parsed.as_ref().filter(|b| {
            status == StatusCode::UNAUTHORIZED && b.error.as_deref() == Some(MFA_REQUIRED)
        }) {
            let mfa_token = challenge
                .mfa_token
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    Error::Authentication("server requested MFA but sent no mfa_token".into())
                })?;
            return Ok(MfaChallenge {
                mfa_token,
                description: challenge
                    .error_description
                    .clone()
                    .unwrap_or_else(|| "SMS sent".into()),
            });
        }

        Err(Error::Authentication(describe_failure(status, parsed.as_ref(), &body)))
    }

    /// Login step 2: submit the SMS code with the challenge token and
    /// derive the customer id from the returned access token. Not retried;
    /// the code is single-use.
    pub fn login_complete(
        &self,
        username: &str,
        password: &str,
        sms_code: &str,
        mfa_token: &str,
    ) -> Result<Session> {
        let req = self.client.post(self.url("/login-with-mfa")).form(&[
            ("username", username),
            ("password", password),
            ("mtan", sms_code),
            ("mfa_token", mfa_token),
        ]);
        let res = send(req, "POST /login-with-mfa")?;
        let status = res.status();
        let body = res.text()?;

        if status != StatusCode::OK {
            let parsed: Option<LoginErrorBody> = serde_json::from_str(&body).ok();
            return Err(Error::Authentication(describe_failure(
                status,
                parsed.as_ref(),
                &body,
            )));
        }

        let tokens: TokenResponse = parse_body(&body)?;
        let customer_id = token::extract_customer_id(&tokens.access_token)?;
        tracing::debug!(%customer_id, expires_in = tokens.expires_in, "login complete");
        Ok(Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            customer_id,
            expires_in: tokens.expires_in,
        })
    }

    /// List the contracts of the session's customer.
    pub fn get_contracts(&self, session: &Session) -> Result<Vec<Contract>> {
        let path = format!("/customers/{}/contracts", session.customer_id);
        let req = self.authed_get(session, &path);
        let body = checked_body(send(req, "GET contracts")?)?;
        parse_body(&body)
    }

    /// Fetch data consumption for `contract`. With `use_cache == false`
    /// the request carries `Cache-Control: no-cache` to force fresh numbers.
    pub fn get_data_consumption(
        &self,
        session: &Session,
        contract: &Contract,
        use_cache: bool,
    ) -> Result<DataConsumptionReport> {
        let path = format!(
            "/customers/{}/contracts/{}/dataconsumption",
            session.customer_id, contract.id
        );
        let mut req = self.authed_get(session, &path);
        if !use_cache {
            req = req.header(CACHE_CONTROL, "no-cache");
        }
        let body = checked_body(send(req, "GET dataconsumption")?)?;
        parse_body(&body)
    }

    /// GET with the session's bearer token attached.
    fn authed_get(&self, session: &Session, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
    }
}

fn send(req: RequestBuilder, what: &str) -> Result<Response> {
    let res = req.send()?;
    tracing::debug!(request = what, status = res.status().as_u16(), "response received");
    Ok(res)
}

/// Body of a 2xx response; maps 401 and other failures to typed errors.
fn checked_body(res: Response) -> Result<String> {
    let status = res.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::SessionExpired);
    }
    let body = res.text()?;
    if !status.is_success() {
        return Err(Error::Request {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))
}

/// Human readable failure text: the carrier's description when it sent
/// one, else its error code, else the raw body.
fn describe_failure(status: StatusCode, parsed: Option<&LoginErrorBody>, body: &str) -> String {
    let detail = parsed
        .and_then(|b| b.error_description.clone().or_else(|| b.error.clone()))
        .unwrap_or_else(|| body.trim().to_string());
    if detail.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:1234/app/v13/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:1234/app/v13");
        assert_eq!(api.url("/login"), "http://localhost:1234/app/v13/login");
    }

    #[test]
    fn failure_text_prefers_description() {
        let body = LoginErrorBody {
            error: Some("invalid_grant".into()),
            error_description: Some("Bad credentials".into()),
            mfa_token: None,
        };
        assert_eq!(
            describe_failure(StatusCode::BAD_REQUEST, Some(&body), "{}"),
            "HTTP 400: Bad credentials"
        );
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, None, " upstream down "),
            "HTTP 502: upstream down"
        );
        assert_eq!(describe_failure(StatusCode::FORBIDDEN, None, ""), "HTTP 403");
    }
}
