//! Typed layout elements produced by the structural partitioner

use serde_json::json;

use super::record::{Metadata, Record};

/// Category vocabulary for partitioned elements.
///
/// Mirrors the element types returned by the partition API; anything outside
/// the known set is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementCategory {
    Title,
    NarrativeText,
    Text,
    ListItem,
    Table,
    Image,
    Header,
    Footer,
    PageBreak,
    Formula,
    Address,
    EmailAddress,
    FigureCaption,
    CompositeElement,
    Other(String),
}

impl ElementCategory {
    /// Parse an API category string
    pub fn parse(s: &str) -> Self {
        match s {
            "Title" => Self::Title,
            "NarrativeText" => Self::NarrativeText,
            "Text" | "UncategorizedText" => Self::Text,
            "ListItem" => Self::ListItem,
            "Table" => Self::Table,
            "Image" => Self::Image,
            "Header" => Self::Header,
            "Footer" => Self::Footer,
            "PageBreak" => Self::PageBreak,
            "Formula" => Self::Formula,
            "Address" => Self::Address,
            "EmailAddress" => Self::EmailAddress,
            "FigureCaption" => Self::FigureCaption,
            "CompositeElement" => Self::CompositeElement,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical category name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "Title",
            Self::NarrativeText => "NarrativeText",
            Self::Text => "Text",
            Self::ListItem => "ListItem",
            Self::Table => "Table",
            Self::Image => "Image",
            Self::Header => "Header",
            Self::Footer => "Footer",
            Self::PageBreak => "PageBreak",
            Self::Formula => "Formula",
            Self::Address => "Address",
            Self::EmailAddress => "EmailAddress",
            Self::FigureCaption => "FigureCaption",
            Self::CompositeElement => "CompositeElement",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed element from a structural parse: a record-shaped payload whose
/// metadata additionally carries `category`, `element_id`, and for tables
/// `text_as_html`.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element category
    pub category: ElementCategory,
    /// Stable element identifier from the partitioner
    pub element_id: String,
    /// Whitespace-normalized text (markdown form for converted tables)
    pub text: String,
    /// Remaining element metadata (page_number, text_as_html, ...)
    pub metadata: Metadata,
}

impl Element {
    /// Convert into the uniform record shape, folding `category` and
    /// `element_id` into the metadata map.
    pub fn into_record(self) -> Record {
        let mut metadata = self.metadata;
        metadata.insert("category".to_string(), json!(self.category.as_str()));
        metadata.insert("element_id".to_string(), json!(self.element_id));
        Record {
            content: self.text,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_and_unknown() {
        assert_eq!(ElementCategory::parse("Table"), ElementCategory::Table);
        assert_eq!(ElementCategory::parse("UncategorizedText"), ElementCategory::Text);
        assert_eq!(
            ElementCategory::parse("Banner"),
            ElementCategory::Other("Banner".to_string())
        );
        assert_eq!(ElementCategory::parse("Banner").as_str(), "Banner");
    }

    #[test]
    fn test_into_record_carries_category_and_id() {
        let element = Element {
            category: ElementCategory::Title,
            element_id: "abc123".to_string(),
            text: "Heading".to_string(),
            metadata: Metadata::new(),
        };
        let record = element.into_record();
        assert_eq!(record.content, "Heading");
        assert_eq!(record.metadata["category"], "Title");
        assert_eq!(record.metadata["element_id"], "abc123");
    }
}
