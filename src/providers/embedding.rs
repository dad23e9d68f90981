//! Embedding provider trait for generating text embeddings

use crate::error::Result;

/// Trait for generating text embeddings
///
/// The pipeline is synchronous end to end, so providers expose blocking
/// calls. The default batch implementation embeds sequentially;
/// implementations with a native batch endpoint should override it.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text)?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
