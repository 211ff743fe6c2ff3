//! PostgREST access to the `sweets` and `profiles` tables.

use sweet_shop_core::{NewSweet, Sweet, SweetChanges, SweetId, UserId};
use tracing::instrument;

use super::types::{ProfileRow, SweetRow};
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Fetch the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a row cannot be converted.
    #[instrument(skip(self, access_token))]
    pub async fn list_sweets(&self, access_token: &str) -> Result<Vec<Sweet>, SupabaseError> {
        let url = format!(
            "{}/sweets?select=*&order=created_at.desc",
            self.inner.rest_url
        );
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let rows: Vec<SweetRow> = Self::read_json(response).await?;
        rows.into_iter().map(Sweet::try_from).collect()
    }

    /// Insert one sweet and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an error response.
    #[instrument(skip(self, access_token, sweet), fields(name = %sweet.name))]
    pub async fn insert_sweet(
        &self,
        access_token: &str,
        sweet: &NewSweet,
    ) -> Result<Sweet, SupabaseError> {
        let url = format!("{}/sweets", self.inner.rest_url);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .json(&[sweet])
            .send()
            .await?;
        let rows: Vec<SweetRow> = Self::read_json(response).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::Parse("insert returned no rows".to_string()))?;
        row.try_into()
    }

    /// Patch one sweet by id and return the stored row.
    ///
    /// PostgREST answers a patch that matched nothing with an empty list
    /// rather than an error status; that case surfaces as
    /// [`SupabaseError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row no longer exists.
    #[instrument(skip(self, access_token, changes))]
    pub async fn update_sweet(
        &self,
        access_token: &str,
        id: SweetId,
        changes: &SweetChanges,
    ) -> Result<Sweet, SupabaseError> {
        let url = format!("{}/sweets?id=eq.{id}", self.inner.rest_url);
        let response = self
            .inner
            .client
            .patch(&url)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        let rows: Vec<SweetRow> = Self::read_json(response).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(id.to_string()))?;
        row.try_into()
    }

    /// Delete one sweet by id and return the removed row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row no longer exists.
    #[instrument(skip(self, access_token))]
    pub async fn delete_sweet(
        &self,
        access_token: &str,
        id: SweetId,
    ) -> Result<Sweet, SupabaseError> {
        let url = format!("{}/sweets?id=eq.{id}", self.inner.rest_url);
        let response = self
            .inner
            .client
            .delete(&url)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<SweetRow> = Self::read_json(response).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(id.to_string()))?;
        row.try_into()
    }

    /// Load the caller's profile row, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an error response.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: UserId,
    ) -> Result<Option<ProfileRow>, SupabaseError> {
        let url = format!(
            "{}/profiles?id=eq.{user_id}&select=id,email,is_admin",
            self.inner.rest_url
        );
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let rows: Vec<ProfileRow> = Self::read_json(response).await?;
        Ok(rows.into_iter().next())
    }
}
