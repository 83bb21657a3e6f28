use strum_macros::Display;
use thiserror::Error;

use crate::db::errors::store_error::StoreError;

/**
 * Scoped operation which may fail to find its entity
 */
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Get,
    Update,
    Delete,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Invalid identifier: {raw}")]
    InvalidIdentifier { raw: String },

    #[error("Record {id} in project {project_id} could not be found ({operation})")]
    NotFound {
        id: String,
        project_id: String,
        operation: Operation,
    },

    #[error("Extra filter may not override scope key {key}")]
    ScopeOverride { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
