pub mod errors;
pub mod scoped_repository;
