//! GoTrue password authentication.

use reqwest::StatusCode;
use serde_json::json;
use tracing::instrument;

use super::types::{AuthSession, SignUpOutcome};
use super::{SupabaseClient, SupabaseError, extract_error_message};

impl SupabaseClient {
    /// Exchange an email and password for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::InvalidCredentials`] or
    /// [`SupabaseError::EmailNotConfirmed`] when the grant is rejected, and
    /// the transport or API error otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SupabaseError> {
        let url = format!("{}/token?grant_type=password", self.inner.auth_url);
        let response = self
            .inner
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            if body.contains("email_not_confirmed") {
                return Err(SupabaseError::EmailNotConfirmed);
            }
            return Err(SupabaseError::InvalidCredentials);
        }
        Self::read_json(response).await
    }

    /// Register a new account.
    ///
    /// Depending on the project's confirmation settings the response is
    /// either an immediate session or a pending user record.
    ///
    /// # Errors
    ///
    /// Returns the remote rejection (weak password, duplicate address) or
    /// the transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, SupabaseError> {
        let url = format!("{}/signup", self.inner.auth_url);
        let response = self
            .inner
            .client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Revoke the access token server-side.
    ///
    /// The local session is cleared by the caller regardless of the outcome
    /// here.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error from the revocation call.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/logout", self.inner.auth_url);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(())
    }
}
