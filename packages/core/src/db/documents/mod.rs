pub mod record;
pub mod record_builder;
