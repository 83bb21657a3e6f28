pub mod client;
pub mod documents;
pub mod errors;
pub mod filter;
pub mod identifier;
pub mod polo_store;
pub mod traits;
