use polodb_core::bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};

/**
 * Entity stored inside a project scope
 */
pub trait ScopedEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /**
     * Default collection holding this entity
     */
    const COLLECTION: &'static str;

    /**
     * Store assigned identifier, missing until entity is persisted
     */
    fn id(&self) -> Option<ObjectId>;

    fn project_id(&self) -> Option<ObjectId>;
}
