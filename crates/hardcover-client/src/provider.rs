//! Backend capability consumed by the gateway

use async_trait::async_trait;

use crate::{Item, Lookup, ProviderResult, ReadingStatus, StatusUpdate};

/// Catalog operations the gateway depends on.
///
/// Implementations own their connection and credential; one instance is
/// created per session and released with [`CatalogProvider::close`].
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search books by title or author name
    async fn search_books(&self, query: &str, limit: u32) -> ProviderResult<Vec<Item>>;

    /// Full record for one book
    async fn get_book_details(&self, id: i64) -> ProviderResult<Lookup<Item>>;

    /// Library entries, optionally filtered to one user. Without a filter the
    /// provider answers for the identity bound to its credential.
    async fn get_user_library(&self, user_id: Option<i64>) -> ProviderResult<Vec<Item>>;

    async fn add_to_library(&self, book_id: i64, status: ReadingStatus) -> ProviderResult<Item>;

    async fn update_reading_status(&self, update: StatusUpdate) -> ProviderResult<Lookup<Item>>;

    /// Release connection resources
    async fn close(&self) {}
}
