use std::sync::Arc;

use log::debug;
use polodb_core::bson::{oid::ObjectId, Document};

use crate::db::{
    client::DbClient,
    filter::Filter,
    identifier,
    polo_store::PoloStore,
    traits::{document_store::DocumentStore, repository::Repository, scoped_entity::ScopedEntity},
};

use super::errors::repository_error::{Operation, RepositoryError};

/**
 * Tenant scoped repository
 *
 * Every read and write is filtered on the caller supplied project, the repository itself owns no
 * entity and keeps no state between calls
 */
pub struct ScopedRepository<T: ScopedEntity> {
    store: Arc<dyn DocumentStore<T>>,
    strict_scope: bool,
}

impl<T: ScopedEntity> ScopedRepository<T> {
    /**
     * New repository over given store, rejecting scope overrides
     */
    pub fn new(store: Arc<dyn DocumentStore<T>>) -> Self {
        Self {
            store,
            strict_scope: true,
        }
    }

    /**
     * Repository over named PoloDB collection
     */
    pub fn for_collection(db_client: &Arc<DbClient>, collection_name: &str) -> Self {
        Self::new(Arc::new(PoloStore::<T>::new(db_client, collection_name)))
    }

    /**
     * Toggle rejection of extra filters replacing _id or projectId
     *
     * When disabled, extra filters win on key collision
     */
    pub fn with_strict_scope(mut self, strict_scope: bool) -> Self {
        self.strict_scope = strict_scope;

        self
    }

    pub fn is_strict_scope(&self) -> bool {
        self.strict_scope
    }

    /**
     * Convert raw string into store native identifier
     */
    pub fn to_identifier(&self, raw: &str) -> Result<ObjectId, RepositoryError> {
        identifier::to_identifier(raw)
    }

    /**
     * Build filter for one entity of a project
     */
    fn scoped_filter(&self, id: &str, project_id: &str) -> Result<Filter, RepositoryError> {
        let object_id = self.to_identifier(id)?;
        let project_object_id = self.to_identifier(project_id)?;

        Ok(Filter::scoped(&object_id, &project_object_id))
    }

    /**
     * Refuse conditions replacing _id or projectId of filter, when scope is strict
     */
    fn ensure_scope_kept(&self, filter: &Filter, conditions: &Document) -> Result<(), RepositoryError> {
        if !self.strict_scope {
            return Ok(());
        }

        match filter.overridden_scope_keys(conditions).into_iter().next() {
            Some(key) => Err(RepositoryError::ScopeOverride { key }),
            None => Ok(()),
        }
    }

    fn not_found(id: &str, project_id: &str, operation: Operation) -> RepositoryError {
        debug!(
            "Record {} in project {} could not be found ({})",
            id, project_id, operation
        );

        RepositoryError::NotFound {
            id: id.to_string(),
            project_id: project_id.to_string(),
            operation,
        }
    }
}

#[async_trait::async_trait]
impl<T: ScopedEntity> Repository<T> for ScopedRepository<T> {
    /**
     * Get one entity of a project, optionally narrowed by extra conditions
     */
    async fn get(
        &self,
        id: &str,
        project_id: &str,
        extra_filter: Option<Document>,
    ) -> Result<T, RepositoryError> {
        debug!("Getting record {} in project {}...", id, project_id);

        let mut filter = self.scoped_filter(id, project_id)?;

        if let Some(extra_filter) = extra_filter {
            self.ensure_scope_kept(&filter, &extra_filter)?;

            filter = filter.merge(&extra_filter);
        }

        let entity = self
            .store
            .find_one(filter)
            .await?
            .ok_or_else(|| Self::not_found(id, project_id, Operation::Get))?;

        debug!("Done getting record {} in project {} !", id, project_id);

        Ok(entity)
    }

    /**
     * Create entity, payload must carry its projectId
     */
    async fn create(&self, data: Document) -> Result<T, RepositoryError> {
        debug!("Creating record...");

        let entity = self.store.insert_one(data).await?;

        debug!(
            "Done creating record {:?} in project {:?} !",
            entity.id(),
            entity.project_id()
        );

        Ok(entity)
    }

    /**
     * Get every entity of a project, in store order
     */
    async fn find_all(&self, project_id: &str) -> Result<Vec<T>, RepositoryError> {
        debug!("Getting all records in project {}...", project_id);

        let project_object_id = self.to_identifier(project_id)?;

        let entities = self
            .store
            .find_many(Filter::project(&project_object_id))
            .await?;

        debug!(
            "Done getting all records in project {} ! ({} found)",
            project_id,
            entities.len()
        );

        Ok(entities)
    }

    /**
     * Overwrite fields present in data, returning updated entity
     *
     * When scope is strict, data may not rewrite _id or move entity to another project
     */
    async fn update(&self, id: &str, project_id: &str, data: Document) -> Result<T, RepositoryError> {
        debug!("Updating record {} in project {}...", id, project_id);

        let filter = self.scoped_filter(id, project_id)?;

        self.ensure_scope_kept(&filter, &data)?;

        let entity = self
            .store
            .find_one_and_update(filter, data)
            .await?
            .ok_or_else(|| Self::not_found(id, project_id, Operation::Update))?;

        debug!("Done updating record {} in project {} !", id, project_id);

        Ok(entity)
    }

    /**
     * Remove entity, returning it
     */
    async fn delete(&self, id: &str, project_id: &str) -> Result<T, RepositoryError> {
        debug!("Deleting record {} in project {}...", id, project_id);

        let filter = self.scoped_filter(id, project_id)?;

        let entity = self
            .store
            .find_one_and_delete(filter)
            .await?
            .ok_or_else(|| Self::not_found(id, project_id, Operation::Delete))?;

        debug!("Done deleting record {} in project {} !", id, project_id);

        Ok(entity)
    }
}

impl<T: ScopedEntity> From<&Arc<DbClient>> for ScopedRepository<T> {
    /**
     * Repository over entity default collection
     */
    fn from(db_client: &Arc<DbClient>) -> Self {
        Self::for_collection(db_client, T::COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use polodb_core::bson::doc;

    use crate::{
        db::{
            documents::record::Record, errors::store_error::StoreError,
            traits::document_store::MockDocumentStore,
        },
        test_utils::{
            db::tests::create_test_db,
            entity::tests::{widget_payload, Widget},
            memory_store::tests::MemoryStore,
        },
    };

    use super::*;

    const MALFORMED_ID: &str = "not-an-object-id";

    fn memory_repository() -> (Arc<MemoryStore<Widget>>, ScopedRepository<Widget>) {
        let store = Arc::new(MemoryStore::<Widget>::new());

        let repository = ScopedRepository::new(Arc::clone(&store) as Arc<dyn DocumentStore<Widget>>);

        (store, repository)
    }

    /**
     * Mock store expecting no call at all
     */
    fn untouched_store() -> MockDocumentStore<Widget> {
        let mut store = MockDocumentStore::<Widget>::new();

        store.expect_find_one().never();
        store.expect_insert_one().never();
        store.expect_find_many().never();
        store.expect_find_one_and_update().never();
        store.expect_find_one_and_delete().never();

        store
    }

    /**
     * It should be strict by default
     */
    #[test]
    fn test_strict_scope_by_default() {
        let (_store, repository) = memory_repository();

        assert!(repository.is_strict_scope());
        assert!(!repository.with_strict_scope(false).is_strict_scope());
    }

    /**
     * It should get created entity back
     */
    #[tokio::test]
    async fn test_create_then_get() {
        let (_store, repository) = memory_repository();

        let project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let fetched = repository
            .get(&id, &project_id.to_hex(), None)
            .await
            .unwrap();

        assert_eq!(fetched, created);
    }

    /**
     * It should not find entity of another project
     */
    #[tokio::test]
    async fn test_get_with_mismatched_scope() {
        let (_store, repository) = memory_repository();

        let project_id = ObjectId::new();
        let other_project_id = ObjectId::new().to_hex();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let err = repository
            .get(&id, &other_project_id, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::NotFound { id: ref err_id, project_id: ref err_project_id, operation: Operation::Get }
                if *err_id == id && *err_project_id == other_project_id
        ));
    }

    /**
     * It should narrow lookup with extra conditions
     */
    #[tokio::test]
    async fn test_get_with_extra_filter() {
        let (_store, repository) = memory_repository();

        let project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let matching = repository
            .get(&id, &project_id.to_hex(), Some(doc! { "name": "foo" }))
            .await
            .unwrap();

        let not_matching = repository
            .get(&id, &project_id.to_hex(), Some(doc! { "name": "bar" }))
            .await
            .unwrap_err();

        assert_eq!(matching, created);
        assert!(matches!(not_matching, RepositoryError::NotFound { .. }));
    }

    /**
     * It should reject extra filter replacing project in strict mode
     */
    #[tokio::test]
    async fn test_get_rejects_scope_override() {
        let repository = ScopedRepository::new(Arc::new(untouched_store()));

        let err = repository
            .get(
                &ObjectId::new().to_hex(),
                &ObjectId::new().to_hex(),
                Some(doc! { "projectId": ObjectId::new() }),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::ScopeOverride { ref key } if key == "projectId"));
    }

    /**
     * It should reject extra filter replacing identifier in strict mode
     */
    #[tokio::test]
    async fn test_get_rejects_identifier_override() {
        let repository = ScopedRepository::new(Arc::new(untouched_store()));

        let err = repository
            .get(
                &ObjectId::new().to_hex(),
                &ObjectId::new().to_hex(),
                Some(doc! { "_id": ObjectId::new(), "name": "foo" }),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::ScopeOverride { ref key } if key == "_id"));
    }

    /**
     * It should refuse to move entity to another project in strict mode
     */
    #[tokio::test]
    async fn test_update_rejects_project_change() {
        let repository = ScopedRepository::new(Arc::new(untouched_store()));

        let err = repository
            .update(
                &ObjectId::new().to_hex(),
                &ObjectId::new().to_hex(),
                doc! { "name": "foo", "projectId": ObjectId::new() },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::ScopeOverride { ref key } if key == "projectId"));
    }

    /**
     * It should move entity to another project when scope is not strict
     */
    #[tokio::test]
    async fn test_update_moves_project_when_permissive() {
        let (_store, repository) = memory_repository();
        let repository = repository.with_strict_scope(false);

        let project_id = ObjectId::new();
        let other_project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let moved = repository
            .update(&id, &project_id.to_hex(), doc! { "projectId": other_project_id })
            .await
            .unwrap();

        assert_eq!(moved.project_id, other_project_id);
        assert!(repository
            .find_all(&project_id.to_hex())
            .await
            .unwrap()
            .is_empty());
    }

    /**
     * It should surface store refusal to rewrite identifier when scope is not strict
     */
    #[tokio::test]
    async fn test_update_identifier_when_permissive() {
        let (_store, repository) = memory_repository();
        let repository = repository.with_strict_scope(false);

        let project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let err = repository
            .update(&id, &project_id.to_hex(), doc! { "_id": ObjectId::new() })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Store(StoreError::PrimaryKeyUpdate)
        ));
        assert_eq!(
            repository.get(&id, &project_id.to_hex(), None).await.unwrap(),
            created
        );
    }

    /**
     * It should let extra filter replace project when scope is not strict
     */
    #[tokio::test]
    async fn test_get_allows_scope_override_when_permissive() {
        let (_store, repository) = memory_repository();
        let repository = repository.with_strict_scope(false);

        let project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let fetched = repository
            .get(
                &id,
                &ObjectId::new().to_hex(),
                Some(doc! { "projectId": project_id }),
            )
            .await
            .unwrap();

        assert_eq!(fetched, created);
    }

    /**
     * It should fail on malformed identifiers before reaching the store
     */
    #[tokio::test]
    async fn test_malformed_identifiers_never_reach_store() {
        let repository = ScopedRepository::new(Arc::new(untouched_store()));

        let valid_id = ObjectId::new().to_hex();

        let results = vec![
            repository.get(MALFORMED_ID, &valid_id, None).await.err(),
            repository.get(&valid_id, MALFORMED_ID, None).await.err(),
            repository.find_all(MALFORMED_ID).await.err(),
            repository
                .update(MALFORMED_ID, &valid_id, doc! { "name": "foo" })
                .await
                .err(),
            repository
                .update(&valid_id, MALFORMED_ID, doc! { "name": "foo" })
                .await
                .err(),
            repository.delete(MALFORMED_ID, &valid_id).await.err(),
            repository.delete(&valid_id, MALFORMED_ID).await.err(),
        ];

        for result in results {
            assert!(matches!(
                result,
                Some(RepositoryError::InvalidIdentifier { ref raw }) if raw == MALFORMED_ID
            ));
        }
    }

    /**
     * It should pass store failures through untouched
     */
    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let mut store = MockDocumentStore::<Widget>::new();

        store
            .expect_insert_one()
            .times(1)
            .returning(|_| Err(StoreError::MissingInsertedDocument("foo".to_string())));

        let repository = ScopedRepository::new(Arc::new(store));

        let err = repository
            .create(widget_payload(&ObjectId::new(), "foo", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::Store(StoreError::MissingInsertedDocument(ref id)) if id == "foo"
        ));
    }

    /**
     * It should query store with scoped filter only
     */
    #[tokio::test]
    async fn test_update_sends_scoped_filter() {
        let id = ObjectId::new();
        let project_id = ObjectId::new();

        let expected_filter = Filter::scoped(&id, &project_id);
        let expected_patch = doc! { "name": "bar" };

        let mut store = MockDocumentStore::<Widget>::new();

        store
            .expect_find_one_and_update()
            .withf(move |filter, patch| *filter == expected_filter && *patch == expected_patch)
            .times(1)
            .returning(|_, _| Ok(None));

        let repository = ScopedRepository::new(Arc::new(store));

        let err = repository
            .update(&id.to_hex(), &project_id.to_hex(), doc! { "name": "bar" })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::NotFound { operation: Operation::Update, .. }
        ));
    }

    /**
     * It should return empty list for project without entities
     */
    #[tokio::test]
    async fn test_find_all_on_empty_project() {
        let (_store, repository) = memory_repository();

        repository
            .create(widget_payload(&ObjectId::new(), "foo", 1))
            .await
            .unwrap();

        let widgets = repository
            .find_all(&ObjectId::new().to_hex())
            .await
            .unwrap();

        assert!(widgets.is_empty());
    }

    /**
     * It should only list entities of requested project, in store order
     */
    #[tokio::test]
    async fn test_find_all_in_project() {
        let (_store, repository) = memory_repository();

        let project_id = ObjectId::new();

        let foo = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();
        repository
            .create(widget_payload(&ObjectId::new(), "bar", 1))
            .await
            .unwrap();
        let baz = repository
            .create(widget_payload(&project_id, "baz", 1))
            .await
            .unwrap();

        let widgets = repository.find_all(&project_id.to_hex()).await.unwrap();

        assert_eq!(widgets, vec![foo, baz]);
    }

    /**
     * It should only change given fields on update
     */
    #[tokio::test]
    async fn test_update_is_partial() {
        let (_store, repository) = memory_repository();

        let project_id = ObjectId::new().to_hex();

        let created = repository
            .create(widget_payload(&ObjectId::parse_str(&project_id).unwrap(), "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let updated = repository
            .update(&id, &project_id, doc! { "quantity": 7 })
            .await
            .unwrap();

        let fetched = repository.get(&id, &project_id, None).await.unwrap();

        let expected = Widget {
            quantity: 7,
            ..created
        };

        assert_eq!(updated, expected);
        assert_eq!(fetched, expected);
    }

    /**
     * It should neither update nor delete entity of another project
     */
    #[tokio::test]
    async fn test_cross_project_writes_are_not_found() {
        let (store, repository) = memory_repository();

        let project_id = ObjectId::new();
        let other_project_id = ObjectId::new().to_hex();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let update_err = repository
            .update(&id, &other_project_id, doc! { "name": "bar" })
            .await
            .unwrap_err();
        let delete_err = repository.delete(&id, &other_project_id).await.unwrap_err();

        assert!(matches!(
            update_err,
            RepositoryError::NotFound { operation: Operation::Update, .. }
        ));
        assert!(matches!(
            delete_err,
            RepositoryError::NotFound { operation: Operation::Delete, .. }
        ));

        let untouched = repository
            .get(&id, &project_id.to_hex(), None)
            .await
            .unwrap();

        assert_eq!(untouched, created);
        assert_eq!(store.len().await, 1);
    }

    /**
     * It should not find deleted entity anymore
     */
    #[tokio::test]
    async fn test_delete_then_get() {
        let (store, repository) = memory_repository();

        let project_id = ObjectId::new().to_hex();

        let created = repository
            .create(widget_payload(&ObjectId::parse_str(&project_id).unwrap(), "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let deleted = repository.delete(&id, &project_id).await.unwrap();

        let err = repository.get(&id, &project_id, None).await.unwrap_err();

        assert_eq!(deleted, created);
        assert!(matches!(
            err,
            RepositoryError::NotFound { operation: Operation::Get, .. }
        ));
        assert_eq!(store.len().await, 0);
    }

    /**
     * It should walk through a record lifecycle on PoloDB
     */
    #[tokio::test]
    async fn test_record_lifecycle_on_polodb() {
        let (_test_dir, db_client) = create_test_db();

        let repository = ScopedRepository::<Record>::from(&db_client);

        let p1 = ObjectId::new();
        let p2 = ObjectId::new().to_hex();

        let payload = Record::builder()
            .set_project_id(&p1)
            .set_field("name", "x")
            .build();

        let created = repository.create(payload).await.unwrap();

        let e1 = created.id().unwrap().to_hex();
        let p1 = p1.to_hex();

        assert_eq!(created.project_id().unwrap().to_hex(), p1);

        // Wrong project
        let err = repository.get(&e1, &p2, None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        let fetched = repository.get(&e1, &p1, None).await.unwrap();
        assert_eq!(fetched, created);

        let updated = repository
            .update(&e1, &p1, doc! { "name": "y" })
            .await
            .unwrap();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.project_id(), created.project_id());
        assert_eq!(updated.as_document().get_str("name").unwrap(), "y");

        let listed = repository.find_all(&p1).await.unwrap();
        assert_eq!(listed, vec![updated.clone()]);

        let deleted = repository.delete(&e1, &p1).await.unwrap();
        assert_eq!(deleted, updated);

        let err = repository.get(&e1, &p1, None).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::NotFound { operation: Operation::Get, .. }
        ));

        assert!(repository.find_all(&p1).await.unwrap().is_empty());
    }

    /**
     * It should keep typed entities isolated per project on PoloDB
     */
    #[tokio::test]
    async fn test_widget_isolation_on_polodb() {
        let (_test_dir, db_client) = create_test_db();

        let repository = ScopedRepository::<Widget>::from(&db_client);

        let project_id = ObjectId::new();
        let other_project_id = ObjectId::new();

        let created = repository
            .create(widget_payload(&project_id, "foo", 1))
            .await
            .unwrap();
        repository
            .create(widget_payload(&other_project_id, "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let err = repository
            .delete(&id, &other_project_id.to_hex())
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(
            repository.find_all(&project_id.to_hex()).await.unwrap(),
            vec![created]
        );
        assert_eq!(
            repository
                .find_all(&other_project_id.to_hex())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    /**
     * It should report only one of concurrent deletions as successful on PoloDB
     */
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_on_polodb() {
        let (_test_dir, db_client) = create_test_db();

        let repository = Arc::new(ScopedRepository::<Widget>::from(&db_client));

        let project_id = ObjectId::new().to_hex();

        let created = repository
            .create(widget_payload(&ObjectId::parse_str(&project_id).unwrap(), "foo", 1))
            .await
            .unwrap();

        let id = created.id.unwrap().to_hex();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                let id = id.clone();
                let project_id = project_id.clone();

                tokio::spawn(async move { repository.delete(&id, &project_id).await })
            })
            .collect();

        let mut deleted_count = 0;
        let mut not_found_count = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => deleted_count += 1,
                Err(RepositoryError::NotFound { operation: Operation::Delete, .. }) => {
                    not_found_count += 1
                }
                Err(err) => panic!("unexpected error: {:?}", err),
            }
        }

        assert_eq!(deleted_count, 1);
        assert_eq!(not_found_count, 15);
    }
}
