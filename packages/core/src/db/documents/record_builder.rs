use polodb_core::bson::{oid::ObjectId, Bson, Document};

use crate::db::filter::PROJECT_ID_FIELD;

/**
 * Builds record payloads for create and update calls
 */
#[derive(Debug, Default)]
pub struct RecordBuilder {
    project_id: Option<ObjectId>,
    fields: Document,
}

impl RecordBuilder {
    /**
     * Set owning project
     */
    pub fn set_project_id(&mut self, project_id: &ObjectId) -> &mut Self {
        self.project_id = Some(*project_id);

        self
    }

    /**
     * Set single field
     */
    pub fn set_field(&mut self, key: &str, value: impl Into<Bson>) -> &mut Self {
        self.fields.insert(key, value.into());

        self
    }

    /**
     * Set every field of given document
     */
    pub fn set_fields(&mut self, fields: &Document) -> &mut Self {
        for (key, value) in fields {
            self.fields.insert(key.clone(), value.clone());
        }

        self
    }

    /**
     * Reset builder
     */
    pub fn reset(&mut self) -> &mut Self {
        self.project_id = None;
        self.fields = Document::new();

        self
    }

    /**
     * Build payload
     *
     * Project is written last so a raw projectId field cannot shadow it
     */
    pub fn build(&mut self) -> Document {
        let mut payload = self.fields.clone();

        if let Some(project_id) = self.project_id {
            payload.insert(PROJECT_ID_FIELD, project_id);
        }

        self.reset();

        payload
    }
}
