//! Session-scoped models.

use serde::{Deserialize, Serialize};
use sweet_shop_core::{Email, UserId};

/// The currently authenticated user, stored in the session.
///
/// The Supabase access token never leaves the server: the browser holds only
/// the opaque session id, and remote calls are made with the token recorded
/// here at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub is_admin: bool,
    pub access_token: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn new(id: UserId, email: Email, is_admin: bool, access_token: String) -> Self {
        Self {
            id,
            email,
            is_admin,
            access_token,
        }
    }
}

/// Session storage keys.
pub mod keys {
    /// Key for the current authenticated user.
    pub const CURRENT_USER: &str = "current_user";
}
