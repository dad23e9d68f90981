//! Configuration objects for the pipeline adapters
//!
//! Each adapter kind gets a typed config struct with documented optional
//! fields instead of an open-ended keyword-forwarding map. Defaults match
//! the behavior a bare call should have.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ingestion::{BreakpointThreshold, LoaderKind, PartitionConfig};
use crate::providers::EmbeddingProvider;

/// Single-file loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Wall-clock limit for PDF text extraction; some fonts make the
    /// extractor hang indefinitely
    pub pdf_timeout_secs: u64,
    /// CSV field delimiter
    pub csv_delimiter: u8,
    /// Partition API settings used by the generic structured-extraction
    /// fallback for unmapped extensions
    pub partition: PartitionConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            pdf_timeout_secs: 60,
            csv_delimiter: b',',
            partition: PartitionConfig::default(),
        }
    }
}

/// Directory loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Glob pattern relative to the directory (default: all non-hidden files)
    pub glob_pattern: String,
    /// Descend into subdirectories. When false, a leading `**/` in the
    /// pattern is stripped so only the top level is matched.
    pub recursive: bool,
    /// Log and skip per-file failures instead of aborting the batch
    pub silent_errors: bool,
    /// Load matched files on a small thread pool. Record ordering and error
    /// semantics are identical to the sequential path.
    pub use_multithreading: bool,
    /// Force one loader for every matched file instead of per-file detection
    pub loader_kind: Option<LoaderKind>,
    /// Settings forwarded to each single-file load
    pub loader: LoaderConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            glob_pattern: "**/[!.]*".to_string(),
            recursive: true,
            silent_errors: true,
            use_multithreading: true,
            loader_kind: None,
            loader: LoaderConfig::default(),
        }
    }
}

/// Web page loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebLoaderConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for WebLoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("docpipe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Remote embedding service configuration (semantic chunking default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// API base URL (OpenAI-compatible)
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// API key; falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            dimensions: 1536,
            timeout_secs: 30,
        }
    }
}

/// Chunk adapter configuration
///
/// `separator` applies to the character strategy, `separators` and
/// `keep_separator` to the recursive strategy, `breakpoint` and the embedder
/// fields to the semantic strategy. The code strategies carry their own
/// separator lists.
#[derive(Clone)]
pub struct ChunkerConfig {
    /// Separator for the character strategy
    pub separator: String,
    /// Ordered fallback separators for the recursive strategy, coarsest first
    pub separators: Vec<String>,
    /// Keep separators attached to the following piece when splitting
    pub keep_separator: bool,
    /// Breakpoint rule for the semantic strategy
    pub breakpoint: BreakpointThreshold,
    /// Remote embedding service used when no explicit embedder is supplied
    pub embedding: EmbeddingConfig,
    /// Explicit embedding provider for the semantic strategy
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            separator: "\n".to_string(),
            separators: default_separators(),
            keep_separator: true,
            breakpoint: BreakpointThreshold::default(),
            embedding: EmbeddingConfig::default(),
            embedder: None,
        }
    }
}

impl std::fmt::Debug for ChunkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkerConfig")
            .field("separator", &self.separator)
            .field("separators", &self.separators)
            .field("keep_separator", &self.keep_separator)
            .field("breakpoint", &self.breakpoint)
            .field("embedding", &self.embedding)
            .field("embedder", &self.embedder.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

/// Default recursive separators: paragraph, line, sentence, word, character
pub fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        ".".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

/// Options for the top-level pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Chunking strategy name (load_and_chunk mode)
    pub chunk_strategy: Option<String>,
    /// Target chunk size in characters
    pub chunk_size: Option<usize>,
    /// Overlap between consecutive chunks
    pub chunk_overlap: Option<usize>,
    /// Treat the input path as a directory
    pub is_directory: bool,
    /// Explicit loader for single-file loads; inferred from the extension
    /// when unset
    pub loader_kind: Option<LoaderKind>,
    /// Single-file loader settings
    pub loader: LoaderConfig,
    /// Directory loader settings
    pub directory: DirectoryConfig,
    /// Chunk adapter settings
    pub chunker: ChunkerConfig,
    /// Structural parser settings (parse mode)
    pub partition: PartitionConfig,
}

impl PipelineOptions {
    /// Chunk strategy name, defaulting to recursive
    pub fn chunk_strategy(&self) -> &str {
        self.chunk_strategy.as_deref().unwrap_or("recursive")
    }

    /// Chunk size, defaulting to 1000 characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(1000)
    }

    /// Chunk overlap, defaulting to 100 characters
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap.unwrap_or(100)
    }
}
