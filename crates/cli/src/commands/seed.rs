//! Seed the catalog from a YAML file.
//!
//! Reads sweets from YAML, validates them against the catalog rules, signs
//! in to Supabase as an administrator, and inserts whatever is not already
//! listed.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{error, info};

use sweet_shop_core::NewSweet;
use sweet_shop_web::config::SupabaseConfig;
use sweet_shop_web::supabase::SupabaseClient;

/// Top-level structure of the seed file.
///
/// ```yaml
/// sweets:
///   - name: Jelly Beans
///     category: Gummy
///     price: "2.99"
///     quantity: 50
///     description: Assorted fruit-flavored jelly beans
/// ```
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub sweets: Vec<NewSweet>,
}

/// Seed the catalog from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog file
/// * `allow_duplicates` - If true, insert sweets whose names are already listed
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or fails validation, or any Supabase call fails.
pub async fn catalog(
    file_path: &str,
    allow_duplicates: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Get required environment variables
    let email =
        std::env::var("SWEET_SHOP_ADMIN_EMAIL").map_err(|_| "SWEET_SHOP_ADMIN_EMAIL not set")?;
    let password = std::env::var("SWEET_SHOP_ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| "SWEET_SHOP_ADMIN_PASSWORD not set")?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed catalog from file");

    // Read and validate YAML before any network call
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedCatalog = serde_yaml::from_str(&content)?;

    info!(sweets = seed.sweets.len(), "Parsed seed file");

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Seed file validated successfully");

    // Connect and sign in
    let config = SupabaseConfig::from_env()?;
    let client = SupabaseClient::new(&config)?;

    let session = client.sign_in(&email, password.expose_secret()).await?;
    info!("Signed in as {email}");

    let existing = client.list_sweets(&session.access_token).await?;
    let existing_names: Vec<&str> = existing.iter().map(|s| s.name.as_str()).collect();

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for sweet in &seed.sweets {
        if !allow_duplicates && existing_names.contains(&sweet.name.as_str()) {
            skipped += 1;
            continue;
        }
        client.insert_sweet(&session.access_token, sweet).await?;
        inserted += 1;
    }

    // Print summary
    info!("Seeding complete!");
    info!("  Sweets inserted: {inserted}");
    info!("  Sweets skipped (already listed): {skipped}");

    Ok(())
}

/// Check every sweet in the seed file against the catalog rules.
fn validate_seed(seed: &SeedCatalog) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, sweet) in seed.sweets.iter().enumerate() {
        if let Err(err) = sweet.validate() {
            errors.push(format!("sweet #{} ({}): {err}", index + 1, sweet.name));
        }
    }
    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_file_parses() {
        let yaml = r#"
sweets:
  - name: Jelly Beans
    category: Gummy
    price: "2.99"
    quantity: 50
    description: Assorted fruit-flavored jelly beans
  - name: Rock Candy
    category: Hard
    price: "1.50"
"#;
        let seed: SeedCatalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(seed.sweets.len(), 2);
        assert_eq!(seed.sweets.first().unwrap().quantity, 50);
        // Quantity defaults to zero when the seed file omits it.
        assert_eq!(seed.sweets.get(1).unwrap().quantity, 0);
        assert!(validate_seed(&seed).is_empty());
    }

    #[test]
    fn test_seed_validation_reports_each_bad_entry() {
        let yaml = r#"
sweets:
  - name: ""
    category: Gummy
    price: "2.99"
  - name: Rock Candy
    category: ""
    price: "1.50"
"#;
        let seed: SeedCatalog = serde_yaml::from_str(yaml).unwrap();
        let errors = validate_seed(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors.first().unwrap().contains("name cannot be empty"));
        assert!(errors.get(1).unwrap().contains("category cannot be empty"));
    }
}
