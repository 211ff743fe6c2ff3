//! Authentication route handlers.
//!
//! Handles sign-in, registration, and sign-out against Supabase GoTrue.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sweet_shop_core::{Email, UserId};
use tower_sessions::Session;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::supabase::SupabaseError;
use crate::supabase::types::{AuthSession, SignUpOutcome};

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Message Codes
// =============================================================================

fn login_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "email_not_confirmed" => "Please confirm your email address before signing in.",
        "session" => "Could not start your session. Please try again.",
        "session_expired" => "Your session has expired. Please sign in again.",
        _ => "Sign in failed. Please try again.",
    }
}

fn login_notice_message(code: &str) -> &'static str {
    match code {
        "confirm_email" => "Account created. Check your email for a confirmation link.",
        "signed_out" => "You have been signed out.",
        _ => "Done.",
    }
}

fn register_error_message(code: &str) -> &'static str {
    match code {
        "invalid_email" => "Please enter a valid email address.",
        "password_mismatch" => "Passwords do not match.",
        "password_too_short" => "Password must be at least 6 characters.",
        "email_taken" => "An account with this email already exists.",
        "session" => "Account created, but the session could not be started. Please sign in.",
        _ => "Registration failed. Please try again.",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Signed-in visitors are sent straight to the dashboard.
pub async fn login_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        error: query.error.as_deref().map(|c| login_error_message(c).to_string()),
        notice: query.notice.as_deref().map(|c| login_notice_message(c).to_string()),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Authenticates via the GoTrue password grant, then loads the caller's
/// profile to decide the admin role.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.supabase().sign_in(&form.email, &form.password).await {
        Ok(auth) => match build_current_user(&state, auth, &form.email).await {
            Some(user) => start_session(&session, user).await,
            None => Redirect::to("/auth/login?error=failed").into_response(),
        },
        Err(SupabaseError::EmailNotConfirmed) => {
            Redirect::to("/auth/login?error=email_not_confirmed").into_response()
        }
        Err(SupabaseError::InvalidCredentials) => {
            tracing::warn!("Login rejected for invalid credentials");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
///
/// Signed-in visitors are sent straight to the dashboard.
pub async fn register_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate {
        error: query
            .error
            .as_deref()
            .map(|c| register_error_message(c).to_string()),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// Creates the account via GoTrue. Depending on the project's confirmation
/// settings the new user is either signed in immediately or told to check
/// their email.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    // Validate the email shape before calling out
    if form.email.parse::<Email>().is_err() {
        return Redirect::to("/auth/register?error=invalid_email").into_response();
    }

    // Validate passwords match
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    // Validate password length
    if form.password.len() < MIN_PASSWORD_LENGTH {
        return Redirect::to("/auth/register?error=password_too_short").into_response();
    }

    match state.supabase().sign_up(&form.email, &form.password).await {
        Ok(SignUpOutcome::Session(auth)) => {
            match build_current_user(&state, auth, &form.email).await {
                Some(user) => start_session(&session, user).await,
                None => Redirect::to("/auth/register?error=session").into_response(),
            }
        }
        Ok(SignUpOutcome::Pending(_)) => {
            Redirect::to("/auth/login?notice=confirm_email").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            // Check for specific error types
            let error_msg = e.to_string();
            if error_msg.contains("already") || error_msg.contains("taken") {
                Redirect::to("/auth/register?error=email_taken").into_response()
            } else {
                Redirect::to("/auth/register?error=failed").into_response()
            }
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the Supabase access token (best effort) and destroys the session.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
    {
        if let Err(e) = state.supabase().sign_out(&user.access_token).await {
            tracing::warn!("Failed to revoke Supabase access token: {}", e);
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();
    Redirect::to("/auth/login?notice=signed_out").into_response()
}

// =============================================================================
// Helpers
// =============================================================================

/// Assemble the session user from a fresh token grant.
///
/// The admin flag comes from the caller's `profiles` row; a missing row (or a
/// failed lookup) means a plain user.
async fn build_current_user(
    state: &AppState,
    auth: AuthSession,
    form_email: &str,
) -> Option<CurrentUser> {
    let user_id = UserId::new(auth.user.id);

    let is_admin = match state
        .supabase()
        .fetch_profile(&auth.access_token, user_id)
        .await
    {
        Ok(profile) => profile.is_some_and(|p| p.is_admin),
        Err(e) => {
            tracing::warn!("Failed to fetch profile after sign-in: {}", e);
            false
        }
    };

    let raw_email = auth.user.email.as_deref().unwrap_or(form_email);
    let email = match raw_email.parse::<Email>() {
        Ok(email) => email,
        Err(e) => {
            tracing::warn!("Rejecting sign-in with unusable email: {}", e);
            return None;
        }
    };

    Some(CurrentUser::new(user_id, email, is_admin, auth.access_token))
}

/// Store the user in the session and land on the dashboard.
async fn start_session(session: &Session, user: CurrentUser) -> Response {
    if let Err(e) = set_current_user(session, &user).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);
    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("credentials"), "Invalid email or password.");
        assert_eq!(
            login_error_message("unknown_code"),
            "Sign in failed. Please try again."
        );
    }

    #[test]
    fn test_register_error_messages() {
        assert_eq!(register_error_message("password_mismatch"), "Passwords do not match.");
        assert_eq!(
            register_error_message("email_taken"),
            "An account with this email already exists."
        );
    }
}
