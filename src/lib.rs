//! # docpipe
//!
//! Document ingestion pipeline: load files, directories, and web pages into
//! uniform text records, split them into retrieval-sized chunks, or parse
//! them into typed structural elements, and persist the results as JSON.
//!
//! ## Example
//!
//! ```no_run
//! use docpipe::config::PipelineOptions;
//! use docpipe::pipeline::process_and_save;
//! use std::path::Path;
//!
//! docpipe::logging::init();
//!
//! let options = PipelineOptions {
//!     chunk_size: Some(500),
//!     chunk_overlap: Some(50),
//!     ..PipelineOptions::default()
//! };
//! process_and_save(
//!     Path::new("report.pdf"),
//!     Path::new("chunks.json"),
//!     "load_and_chunk",
//!     &options,
//! )
//! .unwrap();
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod types;

pub use config::{
    ChunkerConfig, DirectoryConfig, EmbeddingConfig, LoaderConfig, PipelineOptions,
    WebLoaderConfig,
};
pub use error::{Error, Result};
pub use ingestion::{
    chunk_records, load_directory, load_single_file, load_web_page, partition_file,
    BreakpointThreshold, ChunkStrategy, LoaderKind, PartitionConfig, PartitionStrategy,
};
pub use pipeline::process_and_save;
pub use types::{Element, ElementCategory, Metadata, Record};
