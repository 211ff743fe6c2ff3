//! Catalog dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sweet_shop_core::{CatalogFilter, Sweet, distinct_categories, filter_sweets};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::state::AppState;

use super::{UserView, expire_session};

/// Query parameters for the dashboard filter bar.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub error: Option<String>,
}

impl CatalogQuery {
    /// Translate the raw query string into a filter.
    ///
    /// The selectors submit `all` for their default option; that and an
    /// empty search box mean no filtering. An unrecognized price value is
    /// treated as `all` rather than an error.
    fn to_filter(&self) -> CatalogFilter {
        CatalogFilter {
            query: self.q.clone().filter(|q| !q.is_empty()),
            category: self
                .category
                .clone()
                .filter(|c| !c.is_empty() && c.as_str() != "all"),
            band: self.price.as_deref().and_then(|p| p.parse().ok()),
        }
    }
}

/// Sweet display data for templates.
#[derive(Debug, Clone)]
pub struct SweetView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

impl From<&Sweet> for SweetView {
    fn from(sweet: &Sweet) -> Self {
        Self {
            id: sweet.id.to_string(),
            name: sweet.name.clone(),
            category: sweet.category.clone(),
            price: format_price(sweet.price),
            quantity: sweet.quantity,
            description: sweet.description.clone(),
            image_url: sweet.image_url.clone(),
            in_stock: sweet.in_stock(),
        }
    }
}

/// Format a price for display, e.g. `$2.99`.
#[must_use]
pub fn format_price(price: Decimal) -> String {
    format!("${price:.2}")
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub sweets: Vec<SweetView>,
    pub categories: Vec<String>,
    pub total_count: usize,
    pub query: String,
    pub selected_category: String,
    pub selected_price: String,
    pub filters_active: bool,
    pub error: Option<String>,
}

/// Display the catalog dashboard.
///
/// Reloads the catalog from Supabase on every hit, then filters the fresh
/// snapshot in memory. If the reload fails the previous snapshot is served
/// instead; only an empty snapshot turns a reload failure into an error
/// page.
#[instrument(skip(state, session, user))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Query(params): Query<CatalogQuery>,
) -> Result<Response, AppError> {
    let catalog = match state.catalog().refresh(&user.access_token).await {
        Ok(sweets) => sweets,
        Err(err) if err.is_auth_expired() => return Ok(expire_session(&session).await),
        Err(err) => {
            let stale = state.catalog().snapshot();
            if stale.is_empty() {
                return Err(err.into());
            }
            tracing::warn!(error = %err, "catalog reload failed, serving previous snapshot");
            stale
        }
    };

    let filter = params.to_filter();
    let sweets: Vec<SweetView> = filter_sweets(&catalog, &filter)
        .into_iter()
        .map(SweetView::from)
        .collect();
    let categories = distinct_categories(&catalog);

    Ok(DashboardTemplate {
        user: UserView::from(&user),
        total_count: catalog.len(),
        sweets,
        categories,
        query: params.q.unwrap_or_default(),
        selected_category: params.category.unwrap_or_else(|| "all".to_string()),
        selected_price: params.price.unwrap_or_else(|| "all".to_string()),
        filters_active: filter.is_active(),
        error: params.error,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweet_shop_core::PriceBand;

    fn catalog_query(
        q: Option<&str>,
        category: Option<&str>,
        price: Option<&str>,
    ) -> CatalogQuery {
        CatalogQuery {
            q: q.map(str::to_string),
            category: category.map(str::to_string),
            price: price.map(str::to_string),
            error: None,
        }
    }

    #[test]
    fn test_to_filter_treats_all_and_empty_as_no_filter() {
        let filter = catalog_query(Some(""), Some("all"), Some("all")).to_filter();
        assert_eq!(filter, CatalogFilter::default());
        assert!(!filter.is_active());
    }

    #[test]
    fn test_to_filter_carries_active_inputs() {
        let filter = catalog_query(Some("jelly"), Some("Gummy"), Some("low")).to_filter();
        assert_eq!(filter.query.as_deref(), Some("jelly"));
        assert_eq!(filter.category.as_deref(), Some("Gummy"));
        assert_eq!(filter.band, Some(PriceBand::Low));
    }

    #[test]
    fn test_to_filter_ignores_unknown_price_value() {
        let filter = catalog_query(None, None, Some("bargain")).to_filter();
        assert_eq!(filter.band, None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(299, 2)), "$2.99");
        assert_eq!(format_price(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_price(Decimal::new(105, 1)), "$10.50");
    }
}
