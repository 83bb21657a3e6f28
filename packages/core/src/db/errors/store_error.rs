use polodb_core::bson;
use thiserror::Error;

/**
 * Failures raised by a document store, surfaced to callers untouched
 */
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store failure: {0}")]
    Database(#[from] polodb_core::Error),

    #[error("Could not serialize document: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Could not deserialize document: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Document identifier cannot be updated")]
    PrimaryKeyUpdate,

    #[error("Inserted document {0} could not be read back")]
    MissingInsertedDocument(String),
}
