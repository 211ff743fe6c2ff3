//! Catalog orchestration.
//!
//! Every mutation is one remote write followed by a wholesale reload of the
//! in-memory snapshot; nothing is patched locally. The snapshot therefore
//! always reflects a server read, including server-assigned ids and
//! timestamps.

use std::sync::{PoisonError, RwLock};

use sweet_shop_core::{NewSweet, Sweet, SweetChanges, SweetId, SweetValidationError};
use thiserror::Error;

use crate::supabase::{SupabaseClient, SupabaseError};

/// Restock amount the restock form starts from.
pub const DEFAULT_RESTOCK_AMOUNT: u32 = 10;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The target sweet vanished between read and write.
    #[error("sweet not found: {0}")]
    NotFound(String),

    /// Purchase attempted against an out-of-stock sweet.
    #[error("sweet is out of stock")]
    OutOfStock,

    /// Restock amount rejected before any remote call.
    #[error("restock amount must be a positive whole number")]
    InvalidRestock,

    /// Payload rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] SweetValidationError),

    /// The remote write or read failed.
    #[error("persistence error: {0}")]
    Persistence(SupabaseError),
}

impl From<SupabaseError> for CatalogError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

impl CatalogError {
    /// True when the failure is an expired or rejected access token, which
    /// callers handle by ending the session.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Persistence(SupabaseError::Api { status: 401, .. })
        )
    }

    /// Message shown to the user when an operation fails.
    ///
    /// API failures carry Supabase's own message through; transport
    /// failures get a generic line instead of a reqwest debug dump.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Sweet not found".to_string(),
            Self::Persistence(SupabaseError::Api { message, .. }) => message.clone(),
            Self::Persistence(_) => "The sweet shop service is unreachable".to_string(),
            other => other.to_string(),
        }
    }
}

/// Last-read snapshot of the remote catalog.
#[derive(Debug, Default)]
pub struct CatalogStore {
    sweets: RwLock<Vec<Sweet>>,
}

impl CatalogStore {
    /// The sweets from the most recent successful load, in server order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Sweet> {
        self.sweets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the snapshot wholesale.
    pub fn replace(&self, sweets: Vec<Sweet>) {
        *self.sweets.write().unwrap_or_else(PoisonError::into_inner) = sweets;
    }

    /// Look up one sweet in the snapshot.
    #[must_use]
    pub fn find(&self, id: SweetId) -> Option<Sweet> {
        self.sweets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|sweet| sweet.id == id)
            .cloned()
    }
}

/// Catalog reads and writes on behalf of signed-in users.
pub struct CatalogService {
    supabase: SupabaseClient,
    store: CatalogStore,
}

impl CatalogService {
    #[must_use]
    pub fn new(supabase: SupabaseClient) -> Self {
        Self {
            supabase,
            store: CatalogStore::default(),
        }
    }

    /// The last-read snapshot, without touching the network.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Sweet> {
        self.store.snapshot()
    }

    /// Reload the snapshot from the server and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails; the previous snapshot is kept.
    pub async fn refresh(&self, access_token: &str) -> Result<Vec<Sweet>, CatalogError> {
        let sweets = self.supabase.list_sweets(access_token).await?;
        self.store.replace(sweets.clone());
        Ok(sweets)
    }

    /// Create a sweet, then reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload fails validation or the write fails.
    pub async fn create(
        &self,
        access_token: &str,
        sweet: &NewSweet,
    ) -> Result<Sweet, CatalogError> {
        sweet.validate()?;
        let created = self.supabase.insert_sweet(access_token, sweet).await?;
        self.reload_after_write(access_token).await;
        Ok(created)
    }

    /// Apply changes to a sweet, then reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the changes fail validation, the sweet no longer
    /// exists, or the write fails.
    pub async fn update(
        &self,
        access_token: &str,
        id: SweetId,
        changes: &SweetChanges,
    ) -> Result<Sweet, CatalogError> {
        changes.validate()?;
        if changes.is_empty() {
            // nothing to write; serve the stored row
            return self.find_or_refresh(access_token, id).await;
        }
        let updated = self.supabase.update_sweet(access_token, id, changes).await?;
        self.reload_after_write(access_token).await;
        Ok(updated)
    }

    /// Delete a sweet, then reload. Returns the removed row.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweet no longer exists or the write fails.
    pub async fn delete(&self, access_token: &str, id: SweetId) -> Result<Sweet, CatalogError> {
        let deleted = self.supabase.delete_sweet(access_token, id).await?;
        self.reload_after_write(access_token).await;
        Ok(deleted)
    }

    /// Buy one unit: write the stored quantity minus one, then reload.
    ///
    /// The new quantity is computed from the last-read value, so two buyers
    /// racing on the same sweet can settle one unit short. The write itself
    /// never drives stock negative because an out-of-stock sweet is rejected
    /// before the remote call.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OutOfStock`] for an empty sweet, and the
    /// lookup or write failure otherwise.
    pub async fn purchase(&self, access_token: &str, id: SweetId) -> Result<Sweet, CatalogError> {
        let sweet = self.find_or_refresh(access_token, id).await?;
        if sweet.quantity == 0 {
            return Err(CatalogError::OutOfStock);
        }
        let changes = SweetChanges::quantity(sweet.quantity - 1);
        let updated = self
            .supabase
            .update_sweet(access_token, id, &changes)
            .await?;
        self.reload_after_write(access_token).await;
        Ok(updated)
    }

    /// Add stock: write the stored quantity plus `amount`, then reload.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRestock`] for a zero amount, and the
    /// lookup or write failure otherwise.
    pub async fn restock(
        &self,
        access_token: &str,
        id: SweetId,
        amount: u32,
    ) -> Result<Sweet, CatalogError> {
        if amount == 0 {
            return Err(CatalogError::InvalidRestock);
        }
        let sweet = self.find_or_refresh(access_token, id).await?;
        let changes = SweetChanges::quantity(projected_stock(sweet.quantity, amount));
        let updated = self
            .supabase
            .update_sweet(access_token, id, &changes)
            .await?;
        self.reload_after_write(access_token).await;
        Ok(updated)
    }

    /// Find a sweet in the snapshot, reloading once if it is not there.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the sweet is absent even after
    /// a reload.
    pub async fn find_or_refresh(
        &self,
        access_token: &str,
        id: SweetId,
    ) -> Result<Sweet, CatalogError> {
        if let Some(sweet) = self.store.find(id) {
            return Ok(sweet);
        }
        self.refresh(access_token).await?;
        self.store
            .find(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// A reload failure after a successful write leaves the previous
    /// snapshot in place; the write itself already landed.
    async fn reload_after_write(&self, access_token: &str) {
        if let Err(err) = self.refresh(access_token).await {
            tracing::error!(error = %err, "catalog reload after write failed");
        }
    }
}

/// Stock level a restock of `amount` would produce.
#[must_use]
pub const fn projected_stock(current: u32, amount: u32) -> u32 {
    current.saturating_add(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    fn service() -> CatalogService {
        let config = crate::config::SupabaseConfig {
            url: url::Url::parse("http://localhost:54321").unwrap(),
            anon_key: SecretString::from("test-anon-key"),
        };
        CatalogService::new(SupabaseClient::new(&config).unwrap())
    }

    fn sweet(name: &str, quantity: u32) -> Sweet {
        Sweet {
            id: SweetId::new(uuid::Uuid::new_v4()),
            name: name.to_string(),
            category: "Gummy".to_string(),
            price: Decimal::new(299, 2),
            quantity,
            description: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_replaces_wholesale() {
        let store = CatalogStore::default();
        store.replace(vec![sweet("Fudge", 3), sweet("Toffee", 1)]);
        assert_eq!(store.snapshot().len(), 2);

        store.replace(vec![sweet("Nougat", 7)]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().name, "Nougat");
    }

    #[test]
    fn test_store_find_by_id() {
        let store = CatalogStore::default();
        let target = sweet("Fudge", 3);
        let id = target.id;
        store.replace(vec![sweet("Toffee", 1), target]);

        assert_eq!(store.find(id).unwrap().name, "Fudge");
        assert!(store.find(SweetId::new(uuid::Uuid::new_v4())).is_none());
    }

    #[test]
    fn test_projected_stock() {
        assert_eq!(projected_stock(0, 5), 5);
        assert_eq!(projected_stock(50, 10), 60);
        assert_eq!(projected_stock(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn test_is_auth_expired() {
        let expired = CatalogError::Persistence(SupabaseError::Api {
            status: 401,
            message: "JWT expired".to_string(),
        });
        let forbidden = CatalogError::Persistence(SupabaseError::Api {
            status: 403,
            message: "permission denied".to_string(),
        });

        assert!(expired.is_auth_expired());
        assert!(!forbidden.is_auth_expired());
        assert!(!CatalogError::OutOfStock.is_auth_expired());
    }

    #[test]
    fn test_user_message() {
        let api = CatalogError::Persistence(SupabaseError::Api {
            status: 403,
            message: "permission denied for table sweets".to_string(),
        });
        assert_eq!(api.user_message(), "permission denied for table sweets");

        let missing = CatalogError::NotFound("abc".to_string());
        assert_eq!(missing.user_message(), "Sweet not found");

        assert_eq!(
            CatalogError::OutOfStock.user_message(),
            "sweet is out of stock"
        );
        assert_eq!(
            CatalogError::InvalidRestock.user_message(),
            "restock amount must be a positive whole number"
        );
    }

    #[tokio::test]
    async fn test_update_with_no_changes_skips_remote() {
        let service = service();
        let stored = sweet("Fudge", 3);
        let id = stored.id;
        service.store.replace(vec![stored]);

        // No remote call: the unchanged row comes straight from the snapshot.
        let result = service
            .update("token", id, &SweetChanges::default())
            .await
            .unwrap();
        assert_eq!(result.id, id);
        assert_eq!(result.quantity, 3);
    }

    #[tokio::test]
    async fn test_purchase_rejects_out_of_stock() {
        let service = service();
        let stored = sweet("Rock Candy", 0);
        let id = stored.id;
        service.store.replace(vec![stored]);

        let err = service.purchase("token", id).await.unwrap_err();
        assert!(matches!(err, CatalogError::OutOfStock));
    }

    #[tokio::test]
    async fn test_restock_rejects_zero_amount() {
        let service = service();
        let err = service
            .restock("token", SweetId::new(uuid::Uuid::new_v4()), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRestock));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_before_remote() {
        let service = service();
        let new_sweet = NewSweet {
            name: "   ".to_string(),
            category: "Gummy".to_string(),
            price: Decimal::new(299, 2),
            quantity: 0,
            description: None,
            image_url: None,
        };

        let err = service.create("token", &new_sweet).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
