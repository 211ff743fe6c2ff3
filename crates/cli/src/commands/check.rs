//! Environment and connectivity checks.
//!
//! Loads the full shop configuration so misconfigured or weak values fail
//! here rather than at server start, then probes the Supabase auth service.

use tracing::info;

use sweet_shop_web::config::SweetShopConfig;
use sweet_shop_web::supabase::SupabaseClient;

/// Validate configuration and probe Supabase.
///
/// # Errors
///
/// Returns an error if any required environment variable is missing or
/// invalid, or if Supabase does not answer its health endpoint.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = SweetShopConfig::from_env()?;
    info!("Configuration loaded");
    info!("  Listen address: {}", config.socket_addr());
    info!("  Base URL: {}", config.base_url);
    info!("  Supabase URL: {}", config.supabase.url);
    info!(
        "  Sentry: {}",
        if config.sentry_dsn.is_some() {
            "configured"
        } else {
            "disabled"
        }
    );

    let client = SupabaseClient::new(&config.supabase)?;
    client.check_health().await?;
    info!("Supabase auth service reachable");

    Ok(())
}
