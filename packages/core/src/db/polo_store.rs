use std::{marker::PhantomData, sync::Arc};

use log::debug;
use polodb_core::{
    bson::{self, doc, Document},
    CollectionT,
};

use super::{
    client::DbClient,
    errors::store_error::StoreError,
    filter::{Filter, ID_FIELD},
    traits::{document_store::DocumentStore, scoped_entity::ScopedEntity},
};

/**
 * Document store bound to one PoloDB collection
 */
pub struct PoloStore<T> {
    db_client: Arc<DbClient>,
    collection_name: String,
    entity: PhantomData<fn() -> T>,
}

impl<T: ScopedEntity> PoloStore<T> {
    /**
     * Bind store to named collection
     */
    pub fn new(db_client: &Arc<DbClient>, collection_name: &str) -> Self {
        Self {
            db_client: Arc::clone(db_client),
            collection_name: collection_name.to_string(),
            entity: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<T: ScopedEntity> DocumentStore<T> for PoloStore<T> {
    async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        debug!("Searching one document in {}...", self.collection_name);

        let collection = self.db_client.get_collection::<T>(&self.collection_name).await;

        let entity = collection.find_one(filter.into_document())?;

        debug!("Done searching one document in {} !", self.collection_name);

        Ok(entity)
    }

    async fn insert_one(&self, data: Document) -> Result<T, StoreError> {
        debug!("Inserting document into {}...", self.collection_name);

        let entity = self.db_client.run_in_transaction(|txn| {
            let result = txn
                .collection::<Document>(&self.collection_name)
                .insert_one(data)?;

            let inserted_id = result.inserted_id;

            txn.collection::<T>(&self.collection_name)
                .find_one(doc! { ID_FIELD: inserted_id.clone() })?
                .ok_or_else(|| StoreError::MissingInsertedDocument(inserted_id.to_string()))
        })
        .await?;

        debug!("Done inserting document into {} !", self.collection_name);

        Ok(entity)
    }

    async fn find_many(&self, filter: Filter) -> Result<Vec<T>, StoreError> {
        debug!("Searching documents in {}...", self.collection_name);

        let collection = self.db_client.get_collection::<T>(&self.collection_name).await;

        let cursor = collection.find(filter.into_document()).run()?;

        let entities = cursor.collect::<Result<Vec<T>, _>>()?;

        debug!(
            "Done searching documents in {} ! ({} found)",
            self.collection_name,
            entities.len()
        );

        Ok(entities)
    }

    async fn find_one_and_update(
        &self,
        filter: Filter,
        patch: Document,
    ) -> Result<Option<T>, StoreError> {
        debug!("Updating one document in {}...", self.collection_name);

        if patch.contains_key(ID_FIELD) {
            return Err(StoreError::PrimaryKeyUpdate);
        }

        let updated = self.db_client.run_in_transaction(|txn| {
            let raw_collection = txn.collection::<Document>(&self.collection_name);

            let Some(existing) = raw_collection.find_one(filter.into_document())? else {
                return Ok(None);
            };

            let Some(id) = existing.get(ID_FIELD).cloned() else {
                return Ok(None);
            };

            if !patch.is_empty() {
                raw_collection.update_one(doc! { ID_FIELD: id.clone() }, doc! { "$set": patch })?;
            }

            let updated = txn
                .collection::<T>(&self.collection_name)
                .find_one(doc! { ID_FIELD: id })?;

            Ok(updated)
        })
        .await?;

        debug!("Done updating one document in {} !", self.collection_name);

        Ok(updated)
    }

    async fn find_one_and_delete(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        debug!("Deleting one document from {}...", self.collection_name);

        let deleted = self.db_client.run_in_transaction(|txn| {
            let raw_collection = txn.collection::<Document>(&self.collection_name);

            let Some(existing) = raw_collection.find_one(filter.into_document())? else {
                return Ok(None);
            };

            let Some(id) = existing.get(ID_FIELD).cloned() else {
                return Ok(None);
            };

            let entity: T = bson::from_document(existing)?;

            raw_collection.delete_one(doc! { ID_FIELD: id })?;

            Ok(Some(entity))
        })
        .await?;

        debug!("Done deleting one document from {} !", self.collection_name);

        Ok(deleted)
    }
}

impl<T: ScopedEntity> From<&Arc<DbClient>> for PoloStore<T> {
    /**
     * Bind store to entity default collection
     */
    fn from(db_client: &Arc<DbClient>) -> Self {
        PoloStore::new(db_client, T::COLLECTION)
    }
}
