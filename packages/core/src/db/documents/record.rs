use super::record_builder::RecordBuilder;
use crate::db::{
    filter::{ID_FIELD, PROJECT_ID_FIELD},
    traits::scoped_entity::ScopedEntity,
};
use polodb_core::bson::{oid::ObjectId, Document};

/**
 * Schemaless entity, stored as is
 */
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct Record {
    document: Document,
}

impl Record {
    /**
     * Return associated builder
     */
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn as_document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl From<Document> for Record {
    fn from(document: Document) -> Self {
        Self { document }
    }
}

impl ScopedEntity for Record {
    const COLLECTION: &'static str = "records";

    fn id(&self) -> Option<ObjectId> {
        self.document.get_object_id(ID_FIELD).ok()
    }

    fn project_id(&self) -> Option<ObjectId> {
        self.document.get_object_id(PROJECT_ID_FIELD).ok()
    }
}
