pub mod document_store;
pub mod repository;
pub mod scoped_entity;
