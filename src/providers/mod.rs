//! Provider abstractions for embedding generation
//!
//! The semantic chunking strategy needs sentence embeddings. The trait keeps
//! the splitter testable with a local fake; the default implementation is a
//! remote HTTP service.

pub mod embedding;
pub mod remote;

pub use embedding::EmbeddingProvider;
pub use remote::RemoteEmbedder;
