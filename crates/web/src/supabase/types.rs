//! Wire types for the Supabase REST and auth surfaces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sweet_shop_core::{Sweet, SweetId};
use uuid::Uuid;

use super::SupabaseError;

/// A `sweets` row as PostgREST returns it.
///
/// Quantities arrive as wide integers and are narrowed on conversion. The
/// database constraints keep them non-negative, but a row violating that is
/// rejected here rather than trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct SweetRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SweetRow> for Sweet {
    type Error = SupabaseError;

    fn try_from(row: SweetRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            SupabaseError::Parse(format!(
                "sweet {} has out-of-range quantity {}",
                row.id, row.quantity
            ))
        })?;
        if row.price.is_sign_negative() {
            return Err(SupabaseError::Parse(format!(
                "sweet {} has negative price {}",
                row.id, row.price
            )));
        }
        Ok(Self {
            id: SweetId::new(row.id),
            name: row.name,
            category: row.category,
            price: row.price,
            quantity,
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A `profiles` row, provisioned by a database trigger at sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// A GoTrue token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    pub user: AuthUser,
}

/// The GoTrue user record embedded in grants and sign-up responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outcome of a sign-up call.
///
/// GoTrue returns a full session when email confirmation is disabled for the
/// project, and the bare user record when a confirmation email was sent
/// instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(AuthSession),
    Pending(AuthUser),
}
