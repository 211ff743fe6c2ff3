//! Integration tests for authentication flows.
//!
//! These tests require:
//! - The web server running (cargo run -p sweet-shop-web)
//! - A Supabase project with confirmed test users
//!
//! Run with: cargo test -p sweet-shop-integration-tests -- --ignored

use reqwest::{StatusCode, header};
use sweet_shop_integration_tests::{base_url, client, raw_client, sign_in, user_credentials};
use uuid::Uuid;

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect without Location header")
}

// ============================================================================
// Health Checks
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_health_endpoint() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read response"), "ok");
}

#[tokio::test]
#[ignore = "Requires running web server and Supabase project"]
async fn test_readiness_endpoint() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get readiness endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Session Gate
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_dashboard_requires_sign_in() {
    let client = raw_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_sweet_routes_require_sign_in() {
    let client = raw_client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/sweets/new"))
        .send()
        .await
        .expect("Failed to get add sweet form");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_login_page_renders() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/auth/login"))
        .send()
        .await
        .expect("Failed to get login page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Sign in to manage your sweets"));
    assert!(body.contains("/auth/register"));
}

#[tokio::test]
#[ignore = "Requires running web server and Supabase project"]
async fn test_login_rejects_bad_credentials() {
    let client = raw_client();
    let base_url = base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", "nobody@example.com"), ("password", "wrong-password")])
        .send()
        .await
        .expect("Failed to post login form");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login?error=credentials");
}

#[tokio::test]
#[ignore = "Requires running web server and seeded test users"]
async fn test_login_and_logout_round_trip() {
    let client = client();
    let base_url = base_url();
    let (email, password) = user_credentials();

    sign_in(&client, &email, &password).await;

    // Signed-in header shows the account email
    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert!(
        resp.text()
            .await
            .expect("Failed to read response")
            .contains(&email)
    );

    // Logout lands back on the login page with a notice
    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to post logout");
    assert_eq!(resp.url().path(), "/auth/login");

    // The session is gone
    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.url().path(), "/auth/login");
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_register_rejects_password_mismatch() {
    let client = raw_client();
    let base_url = base_url();
    let email = format!("test-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("password", "sugar-rush-1"),
            ("password_confirm", "sugar-rush-2"),
        ])
        .send()
        .await
        .expect("Failed to post register form");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/register?error=password_mismatch");
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_register_rejects_short_password() {
    let client = raw_client();
    let base_url = base_url();
    let email = format!("test-{}@example.com", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("password", "tiny"),
            ("password_confirm", "tiny"),
        ])
        .send()
        .await
        .expect("Failed to post register form");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/register?error=password_too_short");
}
