//! Document ingestion: loading, chunking, and structural parsing
//!
//! Files (or directories, or web pages) are loaded into uniform records,
//! optionally split into retrieval-sized chunks, or partitioned into typed
//! structural elements by a remote parsing service.

pub mod chunker;
pub mod loader;
pub mod partition;

pub use chunker::{chunk_records, BreakpointThreshold, ChunkStrategy, TextSplitter};
pub use loader::{load_directory, load_single_file, load_web_page, LoaderKind};
pub use partition::{elements_to_records, partition_file, PartitionConfig, PartitionStrategy};
