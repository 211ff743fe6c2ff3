//! Sweet management route handlers.
//!
//! Create, update, delete, purchase, and restock. Every mutation runs the
//! write-then-reload cycle in `CatalogService` and ends in a redirect to the
//! dashboard. Form failures re-render the form with the submitted values and
//! a message; delete and purchase failures ride back to the dashboard as a
//! query-string banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sweet_shop_core::{NewSweet, Sweet, SweetChanges, SweetId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::CurrentUser;
use crate::services::{CatalogError, DEFAULT_RESTOCK_AMOUNT, catalog::projected_stock};
use crate::state::AppState;

use super::{UserView, expire_session};

/// Form input for adding or editing a sweet.
///
/// Everything arrives as text; parse failures bounce back to the form with
/// a message instead of a 422.
#[derive(Debug, Default, Deserialize)]
pub struct SweetForm {
    pub name: String,
    pub category: String,
    pub price: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl SweetForm {
    fn from_sweet(sweet: &Sweet) -> Self {
        Self {
            name: sweet.name.clone(),
            category: sweet.category.clone(),
            price: sweet.price.to_string(),
            quantity: sweet.quantity.to_string(),
            description: sweet.description.clone().unwrap_or_default(),
            image_url: sweet.image_url.clone().unwrap_or_default(),
        }
    }

    fn parse_price(&self) -> Result<Decimal, String> {
        self.price
            .trim()
            .parse()
            .map_err(|_| "Price must be a number".to_string())
    }

    /// An empty quantity box means zero, matching the payload default.
    fn parse_quantity(&self) -> Result<u32, String> {
        let text = self.quantity.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse()
            .map_err(|_| "Quantity must be a non-negative whole number".to_string())
    }

    fn to_new_sweet(&self) -> Result<NewSweet, String> {
        Ok(NewSweet {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.parse_price()?,
            quantity: self.parse_quantity()?,
            description: optional(&self.description),
            image_url: optional(&self.image_url),
        })
    }

    /// The edit form submits the whole row, so every field is written.
    /// Blanked optional fields clear the stored value rather than skip it.
    fn to_changes(&self) -> Result<SweetChanges, String> {
        Ok(SweetChanges {
            name: Some(self.name.trim().to_string()),
            category: Some(self.category.trim().to_string()),
            price: Some(self.parse_price()?),
            quantity: Some(self.parse_quantity()?),
            description: Some(optional(&self.description)),
            image_url: Some(optional(&self.image_url)),
        })
    }
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Form input for restocking a sweet.
#[derive(Debug, Deserialize)]
pub struct RestockForm {
    pub quantity: String,
}

impl RestockForm {
    /// A restock must be a positive whole number; anything else is rejected
    /// here, before any remote call.
    fn parse_amount(&self) -> Option<u32> {
        self.quantity.trim().parse().ok().filter(|n| *n > 0)
    }
}

/// Add/edit sweet form template.
#[derive(Template, WebTemplate)]
#[template(path = "sweets/form.html")]
pub struct SweetFormTemplate {
    pub user: UserView,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
    pub description: String,
    pub image_url: String,
    pub error: Option<String>,
}

impl SweetFormTemplate {
    fn add(user: &CurrentUser, form: &SweetForm, error: Option<String>) -> Self {
        Self::with_form(
            user,
            "Add New Sweet",
            "/sweets".to_string(),
            "Add Sweet",
            form,
            error,
        )
    }

    fn edit(user: &CurrentUser, id: SweetId, form: &SweetForm, error: Option<String>) -> Self {
        Self::with_form(
            user,
            "Edit Sweet",
            format!("/sweets/{id}"),
            "Save Changes",
            form,
            error,
        )
    }

    fn with_form(
        user: &CurrentUser,
        heading: &str,
        action: String,
        submit_label: &str,
        form: &SweetForm,
        error: Option<String>,
    ) -> Self {
        Self {
            user: UserView::from(user),
            heading: heading.to_string(),
            action,
            submit_label: submit_label.to_string(),
            name: form.name.clone(),
            category: form.category.clone(),
            price: form.price.clone(),
            quantity: form.quantity.clone(),
            description: form.description.clone(),
            image_url: form.image_url.clone(),
            error,
        }
    }
}

/// Restock form template.
#[derive(Template, WebTemplate)]
#[template(path = "sweets/restock.html")]
pub struct RestockTemplate {
    pub user: UserView,
    pub id: String,
    pub name: String,
    pub current_quantity: u32,
    pub amount: String,
    pub projected: u32,
    pub error: Option<String>,
}

impl RestockTemplate {
    fn new(user: &CurrentUser, sweet: &Sweet, amount: String, error: Option<String>) -> Self {
        // An unparseable amount projects no change; the form shows the
        // message instead.
        let projected = amount
            .trim()
            .parse()
            .map_or(sweet.quantity, |n| projected_stock(sweet.quantity, n));
        Self {
            user: UserView::from(user),
            id: sweet.id.to_string(),
            name: sweet.name.clone(),
            current_quantity: sweet.quantity,
            amount,
            projected,
            error,
        }
    }
}

/// Display the add sweet form.
pub async fn new_sweet_page(RequireAdmin(user): RequireAdmin) -> impl IntoResponse {
    SweetFormTemplate::add(&user, &SweetForm::default(), None)
}

/// Create a sweet, then return to the dashboard.
#[instrument(skip(state, session, user, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<SweetForm>,
) -> Response {
    let new_sweet = match form.to_new_sweet() {
        Ok(sweet) => sweet,
        Err(message) => {
            return SweetFormTemplate::add(&user, &form, Some(message)).into_response();
        }
    };

    match state.catalog().create(&user.access_token, &new_sweet).await {
        Ok(created) => {
            tracing::info!(id = %created.id, name = %created.name, "sweet created");
            add_breadcrumb("catalog", "Sweet created", Some(&[("name", &created.name)]));
            Redirect::to("/").into_response()
        }
        Err(err) if err.is_auth_expired() => expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "failed to create sweet");
            SweetFormTemplate::add(&user, &form, Some(err.user_message())).into_response()
        }
    }
}

/// Display the edit form for a sweet.
#[instrument(skip(state, session, user))]
pub async fn edit_sweet_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<SweetId>,
) -> Result<Response, AppError> {
    let sweet = match state.catalog().find_or_refresh(&user.access_token, id).await {
        Ok(sweet) => sweet,
        Err(err) if err.is_auth_expired() => return Ok(expire_session(&session).await),
        Err(err) => return Err(err.into()),
    };

    Ok(SweetFormTemplate::edit(&user, id, &SweetForm::from_sweet(&sweet), None).into_response())
}

/// Apply edits to a sweet, then return to the dashboard.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<SweetId>,
    Form(form): Form<SweetForm>,
) -> Response {
    let changes = match form.to_changes() {
        Ok(changes) => changes,
        Err(message) => {
            return SweetFormTemplate::edit(&user, id, &form, Some(message)).into_response();
        }
    };

    match state.catalog().update(&user.access_token, id, &changes).await {
        Ok(updated) => {
            tracing::info!(id = %updated.id, name = %updated.name, "sweet updated");
            add_breadcrumb("catalog", "Sweet updated", Some(&[("name", &updated.name)]));
            Redirect::to("/").into_response()
        }
        Err(err) if err.is_auth_expired() => expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, id = %id, "failed to update sweet");
            SweetFormTemplate::edit(&user, id, &form, Some(err.user_message())).into_response()
        }
    }
}

/// Delete a sweet, then return to the dashboard.
///
/// The dashboard asks for confirmation before submitting this form; the
/// handler itself deletes unconditionally.
#[instrument(skip(state, session, user))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<SweetId>,
) -> Response {
    match state.catalog().delete(&user.access_token, id).await {
        Ok(deleted) => {
            tracing::info!(id = %deleted.id, name = %deleted.name, "sweet deleted");
            add_breadcrumb("catalog", "Sweet deleted", Some(&[("name", &deleted.name)]));
            Redirect::to("/").into_response()
        }
        Err(err) if err.is_auth_expired() => expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, id = %id, "failed to delete sweet");
            redirect_with_error(&format!("Error deleting sweet: {}", err.user_message()))
        }
    }
}

/// Purchase one unit of a sweet. Any signed-in user may buy.
#[instrument(skip(state, session, user))]
pub async fn purchase(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<SweetId>,
) -> Response {
    match state.catalog().purchase(&user.access_token, id).await {
        Ok(sweet) => {
            tracing::info!(
                id = %sweet.id,
                name = %sweet.name,
                remaining = sweet.quantity,
                "sweet purchased"
            );
            add_breadcrumb("catalog", "Sweet purchased", Some(&[("name", &sweet.name)]));
            Redirect::to("/").into_response()
        }
        Err(err) if err.is_auth_expired() => expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, id = %id, "failed to purchase sweet");
            redirect_with_error(&format!("Error purchasing sweet: {}", err.user_message()))
        }
    }
}

/// Display the restock form for a sweet.
#[instrument(skip(state, session, user))]
pub async fn restock_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<SweetId>,
) -> Result<Response, AppError> {
    let sweet = match state.catalog().find_or_refresh(&user.access_token, id).await {
        Ok(sweet) => sweet,
        Err(err) if err.is_auth_expired() => return Ok(expire_session(&session).await),
        Err(err) => return Err(err.into()),
    };

    let amount = DEFAULT_RESTOCK_AMOUNT.to_string();
    Ok(RestockTemplate::new(&user, &sweet, amount, None).into_response())
}

/// Add stock to a sweet, then return to the dashboard.
#[instrument(skip(state, session, user, form))]
pub async fn restock(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<SweetId>,
    Form(form): Form<RestockForm>,
) -> Result<Response, AppError> {
    let outcome = match form.parse_amount() {
        Some(amount) => state.catalog().restock(&user.access_token, id, amount).await,
        None => Err(CatalogError::InvalidRestock),
    };

    let failure = match outcome {
        Ok(sweet) => {
            tracing::info!(
                id = %sweet.id,
                name = %sweet.name,
                quantity = sweet.quantity,
                "sweet restocked"
            );
            add_breadcrumb("catalog", "Sweet restocked", Some(&[("name", &sweet.name)]));
            return Ok(Redirect::to("/").into_response());
        }
        Err(err) if err.is_auth_expired() => return Ok(expire_session(&session).await),
        Err(err) => err,
    };

    tracing::warn!(error = %failure, id = %id, "failed to restock sweet");
    let sweet = match state.catalog().find_or_refresh(&user.access_token, id).await {
        Ok(sweet) => sweet,
        Err(err) if err.is_auth_expired() => return Ok(expire_session(&session).await),
        Err(err) => return Err(err.into()),
    };

    Ok(
        RestockTemplate::new(&user, &sweet, form.quantity, Some(failure.user_message()))
            .into_response(),
    )
}

/// Redirect to the dashboard with an error banner message.
fn redirect_with_error(message: &str) -> Response {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message))).into_response()
}
