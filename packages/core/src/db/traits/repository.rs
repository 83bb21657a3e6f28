use polodb_core::bson::Document;

use crate::services::errors::repository_error::RepositoryError;

/**
 * CRUD operations confined to one project scope per call
 */
#[async_trait::async_trait]
pub trait Repository<T> {
    async fn get(
        &self,
        id: &str,
        project_id: &str,
        extra_filter: Option<Document>,
    ) -> Result<T, RepositoryError>;

    async fn create(&self, data: Document) -> Result<T, RepositoryError>;

    async fn find_all(&self, project_id: &str) -> Result<Vec<T>, RepositoryError>;

    async fn update(&self, id: &str, project_id: &str, data: Document)
        -> Result<T, RepositoryError>;

    async fn delete(&self, id: &str, project_id: &str) -> Result<T, RepositoryError>;
}
