pub mod block;
pub mod document;
pub mod error;
pub mod parser;
pub mod store;

pub use block::{Block, Inline};
pub use document::Document;
pub use error::StoreError;
pub use store::{DocumentStore, StoreBuilder};
