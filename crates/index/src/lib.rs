pub mod embeddings;
pub mod error;
pub mod pipeline;
pub mod store;

pub use embeddings::EmbeddingClient;
pub use error::IndexError;
pub use pipeline::{IngestConfig, ingest};
pub use store::{INDEX_FORMAT_VERSION, IndexRecord, VectorIndex};
