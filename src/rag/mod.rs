pub mod engine;
pub mod store;
pub mod templates;

pub use engine::RagEngine;
pub use store::{VectorStore, VectorStoreError};
