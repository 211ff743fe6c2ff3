//! Supabase REST client.
//!
//! Two services live behind the project URL: GoTrue (`/auth/v1`) for password
//! sign-in and sign-up, and PostgREST (`/rest/v1`) for the `sweets` and
//! `profiles` tables. Every data call carries the signed-in user's access
//! token, so row-level security is enforced by the remote project rather than
//! re-implemented here.

pub mod auth;
pub mod rest;
pub mod types;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors from the Supabase surface.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Network or protocol failure before a response was read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Sign-in was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-in was rejected because the address is unconfirmed.
    #[error("email address has not been confirmed")]
    EmailNotConfirmed,

    /// A row-targeted write matched nothing.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for one Supabase project.
///
/// Cheap to clone; all clones share the underlying connection pool and the
/// default `apikey` header.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
    auth_url: String,
}

impl SupabaseClient {
    /// Build a client with the project's anon key attached to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the anon key is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(config.anon_key.expose_secret())
            .map_err(|e| SupabaseError::Parse(format!("invalid anon key: {e}")))?;
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let base = config.url.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                rest_url: format!("{base}/rest/v1"),
                auth_url: format!("{base}/auth/v1"),
            }),
        })
    }

    /// Probe the auth service health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or reports unhealthy.
    pub async fn check_health(&self) -> Result<(), SupabaseError> {
        let url = format!("{}/health", self.inner.auth_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: "auth service unhealthy".to_string(),
            });
        }
        Ok(())
    }

    /// Read a success body as JSON, or surface the remote error message.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SupabaseError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate(&body, 200),
                "Supabase request failed"
            );
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| SupabaseError::Parse(format!("{e}; body: {}", truncate(&text, 200))))
    }
}

/// Known shapes of GoTrue and PostgREST error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull a human-readable message out of whichever error shape came back.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg.or(b.message).or(b.error_description).or(b.error))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no error detail".to_string()
            } else {
                truncate(body, 200)
            }
        })
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> SupabaseConfig {
        SupabaseConfig {
            url: url::Url::parse("https://project.supabase.co").unwrap(),
            anon_key: SecretString::from("anon-key"),
        }
    }

    #[test]
    fn test_client_builds_service_urls() {
        let client = SupabaseClient::new(&test_config()).unwrap();
        assert_eq!(client.inner.rest_url, "https://project.supabase.co/rest/v1");
        assert_eq!(client.inner.auth_url, "https://project.supabase.co/auth/v1");
    }

    #[test]
    fn test_error_display() {
        let err = SupabaseError::Api {
            status: 403,
            message: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 403 - permission denied");

        let err = SupabaseError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Record not found: abc");
    }

    #[test]
    fn test_extract_error_message_gotrue_shape() {
        let body = r#"{"code":400,"error_code":"validation_failed","msg":"Signup requires a valid password"}"#;
        assert_eq!(extract_error_message(body), "Signup requires a valid password");
    }

    #[test]
    fn test_extract_error_message_oauth_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(extract_error_message(body), "Invalid login credentials");
    }

    #[test]
    fn test_extract_error_message_postgrest_shape() {
        let body = r#"{"code":"23514","details":null,"hint":null,"message":"new row violates check constraint"}"#;
        assert_eq!(extract_error_message(body), "new row violates check constraint");
    }

    #[test]
    fn test_extract_error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("upstream timeout"), "upstream timeout");
        assert_eq!(extract_error_message(""), "no error detail");
    }
}
