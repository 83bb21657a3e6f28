use polodb_core::bson::{doc, oid::ObjectId, Document};

pub const ID_FIELD: &str = "_id";

pub const PROJECT_ID_FIELD: &str = "projectId";

/**
 * Keys anchoring a scoped lookup
 */
pub const SCOPE_KEYS: [&str; 2] = [ID_FIELD, PROJECT_ID_FIELD];

/**
 * Query filter sent to document store
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    document: Document,
}

impl Filter {
    /**
     * Filter matching one entity inside a project
     */
    pub fn scoped(id: &ObjectId, project_id: &ObjectId) -> Self {
        Self {
            document: doc! {
                ID_FIELD: *id,
                PROJECT_ID_FIELD: *project_id,
            },
        }
    }

    /**
     * Filter matching every entity of a project
     */
    pub fn project(project_id: &ObjectId) -> Self {
        Self {
            document: doc! {
                PROJECT_ID_FIELD: *project_id,
            },
        }
    }

    /**
     * Merge extra conditions into filter
     *
     * Extra conditions take precedence when a key is present on both sides
     */
    pub fn merge(mut self, extra: &Document) -> Self {
        for (key, value) in extra {
            self.document.insert(key.clone(), value.clone());
        }

        self
    }

    /**
     * Scope keys of this filter which extra conditions would replace
     */
    pub fn overridden_scope_keys(&self, extra: &Document) -> Vec<String> {
        SCOPE_KEYS
            .iter()
            .filter(|key| self.document.contains_key(**key) && extra.contains_key(**key))
            .map(|key| key.to_string())
            .collect()
    }

    pub fn as_document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
