//! Text chunking strategies
//!
//! Splits loaded records into retrieval-sized chunks. Strategies share a
//! sliding-window merge: pieces produced by a splitter are packed into
//! chunks up to the size limit, carrying a character-count overlap window
//! into the next chunk. Sizes are measured in characters, not bytes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkerConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, RemoteEmbedder};
use crate::types::Record;

/// Available chunking strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Split on a single separator, then window-merge
    Character,
    /// Try separators coarsest-first, recursing into oversize pieces
    Recursive,
    /// Break at embedding-distance outliers between adjacent sentences
    Semantic,
    /// Recursive with Python syntax boundaries
    CodePython,
    /// Recursive with JavaScript syntax boundaries
    CodeJavascript,
    /// Recursive with Markdown structure boundaries
    CodeMarkdown,
}

impl ChunkStrategy {
    /// Strategy label used in chunk ids and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Recursive => "recursive",
            Self::Semantic => "semantic",
            Self::CodePython => "code_python",
            Self::CodeJavascript => "code_javascript",
            Self::CodeMarkdown => "code_markdown",
        }
    }
}

impl FromStr for ChunkStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "character" => Ok(Self::Character),
            "recursive" => Ok(Self::Recursive),
            "semantic" => Ok(Self::Semantic),
            "code_python" => Ok(Self::CodePython),
            "code_javascript" => Ok(Self::CodeJavascript),
            "code_markdown" => Ok(Self::CodeMarkdown),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Breakpoint rule for the semantic strategy: the distance cutoff above
/// which adjacent sentences start a new chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointThreshold {
    /// Cutoff at the given percentile of observed distances
    Percentile(f64),
    /// Cutoff at mean plus the given multiple of the standard deviation
    StandardDeviation(f64),
    /// Cutoff at mean plus the given multiple of the interquartile range
    Interquartile(f64),
}

impl Default for BreakpointThreshold {
    fn default() -> Self {
        Self::Percentile(0.95)
    }
}

/// A strategy-specific text splitter
pub trait TextSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

/// Build the splitter for a strategy, validating its parameters.
///
/// Size and overlap apply to all strategies except semantic, which sizes
/// chunks by meaning instead. An overlap at or above the chunk size can
/// never make progress and is rejected.
pub fn build_splitter(
    strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
    config: &ChunkerConfig,
) -> Result<Box<dyn TextSplitter>> {
    if strategy != ChunkStrategy::Semantic {
        if chunk_size == 0 {
            return Err(Error::SplitterConstruction(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::SplitterConstruction(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
    }

    match strategy {
        ChunkStrategy::Character => Ok(Box::new(CharacterSplitter {
            separator: config.separator.clone(),
            chunk_size,
            chunk_overlap,
        })),
        ChunkStrategy::Recursive => Ok(Box::new(RecursiveSplitter {
            separators: config.separators.clone(),
            keep_separator: config.keep_separator,
            chunk_size,
            chunk_overlap,
        })),
        ChunkStrategy::CodePython => Ok(Box::new(RecursiveSplitter {
            separators: python_separators(),
            keep_separator: true,
            chunk_size,
            chunk_overlap,
        })),
        ChunkStrategy::CodeJavascript => Ok(Box::new(RecursiveSplitter {
            separators: javascript_separators(),
            keep_separator: true,
            chunk_size,
            chunk_overlap,
        })),
        ChunkStrategy::CodeMarkdown => Ok(Box::new(RecursiveSplitter {
            separators: markdown_separators(),
            keep_separator: true,
            chunk_size,
            chunk_overlap,
        })),
        ChunkStrategy::Semantic => {
            let embedder = match &config.embedder {
                Some(embedder) => Arc::clone(embedder),
                None => Arc::new(
                    RemoteEmbedder::new(&config.embedding)
                        .map_err(|e| Error::SplitterConstruction(e.to_string()))?,
                ),
            };
            Ok(Box::new(SemanticSplitter {
                embedder,
                breakpoint: config.breakpoint,
            }))
        }
    }
}

fn python_separators() -> Vec<String> {
    ["\nclass ", "\ndef ", "\n\tdef ", "\n\n", "\n", " ", ""]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn javascript_separators() -> Vec<String> {
    [
        "\nfunction ",
        "\nconst ",
        "\nlet ",
        "\nvar ",
        "\nclass ",
        "\nif ",
        "\nfor ",
        "\nwhile ",
        "\nswitch ",
        "\ncase ",
        "\ndefault ",
        "\n\n",
        "\n",
        " ",
        "",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn markdown_separators() -> Vec<String> {
    [
        "\n# ", "\n## ", "\n### ", "\n#### ", "\n##### ", "\n###### ", "\n```\n", "\n***\n",
        "\n---\n", "\n___\n", "\n\n", "\n", " ", "",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

struct CharacterSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter for CharacterSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        let pieces = split_keeping(text, &self.separator, false);
        Ok(merge_splits(
            &pieces,
            &self.separator,
            self.chunk_size,
            self.chunk_overlap,
        ))
    }
}

struct RecursiveSplitter {
    separators: Vec<String>,
    keep_separator: bool,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter for RecursiveSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.split_with(text, &self.separators))
    }
}

impl RecursiveSplitter {
    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // first separator that is empty or actually present in the text
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() || text.contains(candidate.as_str()) {
                separator = candidate.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces = split_keeping(text, &separator, self.keep_separator);
        // separators already attached to the pieces must not be re-inserted
        let merge_separator = if self.keep_separator { "" } else { separator.as_str() };

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if piece.chars().count() < self.chunk_size {
                fitting.push(piece);
            } else {
                if !fitting.is_empty() {
                    chunks.extend(merge_splits(
                        &fitting,
                        merge_separator,
                        self.chunk_size,
                        self.chunk_overlap,
                    ));
                    fitting.clear();
                }
                if remaining.is_empty() {
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }
        if !fitting.is_empty() {
            chunks.extend(merge_splits(
                &fitting,
                merge_separator,
                self.chunk_size,
                self.chunk_overlap,
            ));
        }
        chunks
    }
}

/// Split text on a separator. With `keep_separator` the separator stays
/// attached to the front of the following piece so no characters are lost.
/// An empty separator splits into individual characters. Empty pieces are
/// dropped.
fn split_keeping(text: &str, separator: &str, keep_separator: bool) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let parts: Vec<&str> = text.split(separator).collect();
    let pieces: Vec<String> = if keep_separator {
        parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                if i == 0 {
                    part.to_string()
                } else {
                    format!("{separator}{part}")
                }
            })
            .collect()
    } else {
        parts.iter().map(|part| part.to_string()).collect()
    };

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Pack pieces into chunks of at most `chunk_size` characters, sliding a
/// window so consecutive chunks share up to `chunk_overlap` characters of
/// trailing pieces. Joined chunks are trimmed; empty chunks are dropped.
fn merge_splits(
    pieces: &[String],
    separator: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<String> {
    let separator_len = separator.chars().count();
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = piece.chars().count();
        let joined_len = total + len + if window.is_empty() { 0 } else { separator_len };
        if joined_len > chunk_size {
            if total > chunk_size {
                tracing::warn!(
                    "created a chunk of {} characters, longer than the requested {}",
                    total,
                    chunk_size
                );
            }
            if !window.is_empty() {
                if let Some(chunk) = join_window(&window, separator) {
                    chunks.push(chunk);
                }
                // slide forward until the window fits within the overlap
                // and leaves room for the incoming piece
                while total > chunk_overlap
                    || (total + len + if window.is_empty() { 0 } else { separator_len }
                        > chunk_size
                        && total > 0)
                {
                    let extra = if window.len() > 1 { separator_len } else { 0 };
                    if let Some(removed) = window.pop_front() {
                        total -= removed.chars().count() + extra;
                    } else {
                        break;
                    }
                }
            }
        }
        total += len + if window.is_empty() { 0 } else { separator_len };
        window.push_back(piece);
    }
    if let Some(chunk) = join_window(&window, separator) {
        chunks.push(chunk);
    }
    chunks
}

fn join_window(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    (!joined.is_empty()).then_some(joined)
}

struct SemanticSplitter {
    embedder: Arc<dyn EmbeddingProvider>,
    breakpoint: BreakpointThreshold,
}

impl TextSplitter for SemanticSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        let sentences: Vec<String> = text
            .split_sentence_bounds()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if sentences.len() <= 1 {
            let trimmed = text.trim();
            return Ok(if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            });
        }

        let embeddings = self.embedder.embed_batch(&sentences)?;
        let distances: Vec<f64> = embeddings
            .windows(2)
            .map(|pair| cosine_distance(&pair[0], &pair[1]))
            .collect();
        let cutoff = breakpoint_cutoff(&distances, self.breakpoint);

        let mut chunks = Vec::new();
        let mut group: Vec<&str> = Vec::new();
        for (i, sentence) in sentences.iter().enumerate() {
            group.push(sentence);
            let break_here = i < distances.len() && distances[i] > cutoff;
            if break_here {
                chunks.push(group.join(" "));
                group.clear();
            }
        }
        if !group.is_empty() {
            chunks.push(group.join(" "));
        }
        Ok(chunks)
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Distance cutoff for the configured breakpoint rule
fn breakpoint_cutoff(distances: &[f64], breakpoint: BreakpointThreshold) -> f64 {
    match breakpoint {
        BreakpointThreshold::Percentile(p) => percentile(distances, p),
        BreakpointThreshold::StandardDeviation(k) => {
            let mean = mean(distances);
            let variance = distances
                .iter()
                .map(|d| (d - mean) * (d - mean))
                .sum::<f64>()
                / distances.len() as f64;
            mean + k * variance.sqrt()
        }
        BreakpointThreshold::Interquartile(k) => {
            let q1 = percentile(distances, 0.25);
            let q3 = percentile(distances, 0.75);
            mean(distances) + k * (q3 - q1)
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Nearest-rank percentile of an unsorted slice
fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Chunk a batch of records.
///
/// Each record is split independently; chunks never span records. Every
/// chunk inherits a deep copy of its record's metadata plus a `chunk_id` of
/// the form `{source}_{record_index}_{strategy}_{chunk_index}`. All failure
/// modes (unknown strategy, splitter construction, per-record splits) are
/// logged and degrade to skipping, never panicking.
pub fn chunk_records(
    records: &[Record],
    strategy: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    config: &ChunkerConfig,
) -> Vec<Record> {
    if records.is_empty() {
        tracing::warn!("no records to chunk");
        return Vec::new();
    }

    let strategy = match ChunkStrategy::from_str(strategy) {
        Ok(strategy) => strategy,
        Err(e) => {
            tracing::error!("{}", e);
            return Vec::new();
        }
    };

    let splitter = match build_splitter(strategy, chunk_size, chunk_overlap, config) {
        Ok(splitter) => splitter,
        Err(e) => {
            tracing::error!("failed to construct {} splitter: {}", strategy.label(), e);
            return Vec::new();
        }
    };

    tracing::info!(
        "chunking {} record(s) with {} strategy (size {}, overlap {})",
        records.len(),
        strategy.label(),
        chunk_size,
        chunk_overlap
    );

    let mut chunks = Vec::new();
    for (record_index, record) in records.iter().enumerate() {
        let pieces = match splitter.split(&record.content) {
            Ok(pieces) => pieces,
            Err(e) => {
                tracing::error!("failed to chunk record {}: {}", record_index, e);
                continue;
            }
        };

        let source = record.source().unwrap_or("doc").to_string();
        for (chunk_index, piece) in pieces.into_iter().enumerate() {
            let mut chunk = Record::new(piece);
            chunk.metadata = record.metadata.clone();
            chunk.metadata.insert(
                "chunk_id".to_string(),
                serde_json::json!(format!(
                    "{source}_{record_index}_{}_{chunk_index}",
                    strategy.label()
                )),
            );
            chunks.push(chunk);
        }
    }

    tracing::info!("produced {} chunk(s)", chunks.len());
    chunks
}
