//! HTTP client for backend verification.
//!
//! UI scenarios have a parallel verification path: the same backend is
//! exercised directly over HTTP, so a validation rule can be asserted
//! without a browser in the loop (for example, posting an all-empty
//! registration payload and checking for a 400 with a structured
//! error-field list). The client owns its own connection and shares no
//! state with the browser session.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::UserData;

/// Default request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the API client
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The configured base URL does not parse
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    /// Payload serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Registration payload in the backend's wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl UserPayload {
    /// An all-empty payload, for negative validation tests
    #[must_use]
    pub fn empty() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
        }
    }
}

impl From<&UserData> for UserPayload {
    fn from(user: &UserData) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
        }
    }
}

/// Response surface handed back to test scenarios
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body (`Null` when the body was empty or not JSON)
    pub body: Value,
    /// Raw response headers
    pub headers: Vec<(String, String)>,
}

impl ApiResponse {
    /// Keys of the backend's `errors` object, sorted: the field list
    /// of a structured validation failure
    #[must_use]
    pub fn error_keys(&self) -> Vec<String> {
        self.body
            .get("errors")
            .and_then(Value::as_object)
            .map(|errors| {
                let keys: BTreeMap<_, _> = errors.iter().collect();
                keys.keys().map(ToString::to_string).collect()
            })
            .unwrap_or_default()
    }

    /// The backend's top-level `message` field, when present
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// The backend's session token, when the call produced one
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.body.get("token").and_then(Value::as_str)
    }
}

/// HTTP API client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: url::Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: url::Url::parse(base_url)?,
            http,
        })
    }

    /// The configured base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Browser-like headers the backend expects on form-origin calls
    #[must_use]
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let origin = self.base_url.as_str().trim_end_matches('/').to_string();
        vec![
            ("Accept".to_string(), "*/*".to_string()),
            ("Origin".to_string(), origin.clone()),
            ("Referer".to_string(), format!("{origin}/addUser")),
        ]
    }

    /// POST a JSON body to `path` (resolved against the base URL) with
    /// the default headers plus `extra_headers`
    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        extra_headers: &[(String, String)],
    ) -> Result<ApiResponse, ApiError> {
        let url = self.base_url.join(path)?;
        let mut request = self.http.post(url).json(body);
        for (name, value) in self.default_headers().iter().chain(extra_headers) {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?;
        Self::read(response).await
    }

    /// DELETE `path` carrying a bearer token
    pub async fn delete_authorized(
        &self,
        path: &str,
        token: &str,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.base_url.join(path)?;
        let response = self
            .http
            .delete(url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;
        Self::read(response).await
    }

    /// Register a user: `POST /users`.
    /// 201 on success; 400 with an `errors` object on validation
    /// failure, or a "already in use" message on a duplicate email.
    pub async fn register_user(&self, user: &UserPayload) -> Result<ApiResponse, ApiError> {
        self.post_json("/users", user, &[]).await
    }

    /// Log in: `POST /users/login`
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_json("/users/login", &body, &[]).await
    }

    /// Delete the authenticated user: `DELETE /users/me`.
    /// Used by scenarios to clean up accounts they registered.
    pub async fn delete_current_user(&self, token: &str) -> Result<ApiResponse, ApiError> {
        self.delete_authorized("/users/me", token).await
    }

    async fn read(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(ApiResponse {
            status,
            body,
            headers,
        })
    }
}
