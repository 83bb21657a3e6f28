use std::{path::PathBuf, sync::Arc};

use log::debug;
use polodb_core::{Collection, Database, Transaction};
use serde::Serialize;
use tokio::sync::Mutex;

use super::errors::store_error::StoreError;

/**
 * Shared handle over an opened database
 *
 * Lifecycle is owned by whoever opened it, repositories only borrow it through an Arc
 */
pub struct DbClient {
    instance: Arc<Mutex<Database>>,
}

impl DbClient {
    /**
     * Open database stored at given path, creating it if needed
     */
    pub fn open(db_path: &PathBuf) -> Result<Self, StoreError> {
        debug!("Opening database at {}...", db_path.display());

        let db = Database::open_path(db_path)?;

        debug!("Done opening database at {} !", db_path.display());

        Ok(Self {
            instance: Arc::new(Mutex::new(db)),
        })
    }

    /**
     * Get typed collection by name
     */
    pub async fn get_collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Serialize + Send + Sync,
    {
        self.instance.lock().await.collection(name)
    }

    /**
     * Run operation inside one transaction, committed only when operation succeeds
     *
     * Database stays locked until the transaction ends, so transactional operations never interleave
     */
    pub async fn run_in_transaction<R>(
        &self,
        operation: impl FnOnce(&Transaction) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let db = self.instance.lock().await;

        let txn = db.start_transaction()?;

        match operation(&txn) {
            Ok(value) => {
                txn.commit()?;

                Ok(value)
            }
            Err(err) => {
                debug!("Rolling back transaction...");

                txn.rollback()?;

                Err(err)
            }
        }
    }
}

impl TryFrom<&PathBuf> for DbClient {
    type Error = StoreError;

    /**
     * New instance from DB path
     */
    fn try_from(db_path: &PathBuf) -> Result<Self, Self::Error> {
        DbClient::open(db_path)
    }
}
