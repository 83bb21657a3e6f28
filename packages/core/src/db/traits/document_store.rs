use polodb_core::bson::Document;

use crate::db::{errors::store_error::StoreError, filter::Filter};

use super::scoped_entity::ScopedEntity;

#[cfg(test)]
use mockall::automock;

/**
 * Minimal capabilities a document store must offer for one collection
 */
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DocumentStore<T: ScopedEntity>: Send + Sync {
    async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError>;

    /**
     * Insert document and return it as persisted, with its assigned identifier
     */
    async fn insert_one(&self, data: Document) -> Result<T, StoreError>;

    async fn find_many(&self, filter: Filter) -> Result<Vec<T>, StoreError>;

    /**
     * Atomically merge patch into first match, returning its updated state
     */
    async fn find_one_and_update(
        &self,
        filter: Filter,
        patch: Document,
    ) -> Result<Option<T>, StoreError>;

    /**
     * Atomically remove first match, returning it
     */
    async fn find_one_and_delete(&self, filter: Filter) -> Result<Option<T>, StoreError>;
}
