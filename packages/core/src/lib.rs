pub mod config;
pub mod db;
pub mod logging;
pub mod services;

pub use db::{
    client::DbClient,
    documents::{record::Record, record_builder::RecordBuilder},
    errors::store_error::StoreError,
    filter::Filter,
    identifier::to_identifier,
    polo_store::PoloStore,
    traits::{document_store::DocumentStore, repository::Repository, scoped_entity::ScopedEntity},
};
pub use polodb_core::bson;
pub use services::{
    errors::repository_error::{Operation, RepositoryError},
    scoped_repository::ScopedRepository,
};
