//! Integration tests for Sweet Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the web server
//! cargo run -p sweet-shop-web
//!
//! # Run integration tests against it
//! cargo test -p sweet-shop-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a running server
//! backed by a Supabase project with confirmed test users.
//!
//! # Environment
//!
//! - `SWEET_SHOP_BASE_URL` - Server under test (default `http://localhost:3000`)
//! - `TEST_USER_EMAIL` / `TEST_USER_PASSWORD` - Confirmed non-admin user
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` - Confirmed admin user

use reqwest::Client;

/// Base URL for the server under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SWEET_SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Browsing client: cookie store on, redirects followed.
///
/// With the cookie store the session survives across requests, so a single
/// client can sign in once and then exercise authenticated pages.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Non-following client for asserting on redirect targets.
#[must_use]
pub fn raw_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Credentials for the seeded non-admin user.
#[must_use]
pub fn user_credentials() -> (String, String) {
    (
        std::env::var("TEST_USER_EMAIL").expect("TEST_USER_EMAIL not set"),
        std::env::var("TEST_USER_PASSWORD").expect("TEST_USER_PASSWORD not set"),
    )
}

/// Credentials for the seeded admin user.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    (
        std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set"),
        std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD not set"),
    )
}

/// Sign in through the login form, filling the client's cookie jar.
///
/// Panics if the server does not land on the dashboard afterwards, which is
/// what a failed sign-in looks like (a bounce back to the login page).
pub async fn sign_in(client: &Client, email: &str, password: &str) {
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to post login form");

    assert!(resp.status().is_success());
    assert_eq!(resp.url().path(), "/", "sign-in did not reach the dashboard");
}
