//! The uniform record shape every pipeline stage produces

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Record metadata: string keys mapped to JSON values. Using `Value` keeps
/// every metadata entry serializable by construction; the ordered map keeps
/// serialized output byte-stable across runs.
pub type Metadata = BTreeMap<String, Value>;

/// A single unit of ingested content.
///
/// Serializes as `{"page_content": ..., "metadata": {...}}`. Metadata always
/// carries a `source` key (origin path or URL); chunking adds `chunk_id`,
/// structural parsing adds `category` and `element_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Text content (possibly empty, never absent)
    #[serde(rename = "page_content")]
    pub content: String,
    /// Key/value metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Record {
    /// Create a record with empty metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Create a record with a `source` metadata entry
    pub fn with_source(content: impl Into<String>, source: &str) -> Self {
        let mut record = Self::new(content);
        record
            .metadata
            .insert("source".to_string(), Value::String(source.to_string()));
        record
    }

    /// The `source` metadata entry, if present and a string
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    /// Insert `source` only if the record does not already carry one.
    /// A source supplied by the underlying extractor is never overwritten.
    pub fn ensure_source(&mut self, source: &str) {
        self.metadata
            .entry("source".to_string())
            .or_insert_with(|| Value::String(source.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_page_content() {
        let record = Record::with_source("hello", "a.txt");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["page_content"], "hello");
        assert_eq!(json["metadata"]["source"], "a.txt");
    }

    #[test]
    fn test_serialization_is_byte_stable() {
        let build = |keys: &[&str]| {
            let mut record = Record::with_source("stable", "a.txt");
            for key in keys {
                record.metadata.insert(key.to_string(), json!(1));
            }
            record
        };
        // same entries inserted in different orders serialize identically
        let first = build(&["alpha", "beta", "gamma", "delta", "epsilon"]);
        let second = build(&["epsilon", "delta", "gamma", "beta", "alpha"]);

        let a = serde_json::to_string_pretty(&first).unwrap();
        let b = serde_json::to_string_pretty(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ensure_source_preserves_existing() {
        let mut record = Record::new("x");
        record.metadata.insert("source".to_string(), json!("original.pdf"));
        record.ensure_source("fallback.pdf");
        assert_eq!(record.source(), Some("original.pdf"));

        let mut record = Record::new("y");
        record.ensure_source("fallback.pdf");
        assert_eq!(record.source(), Some("fallback.pdf"));
    }
}
