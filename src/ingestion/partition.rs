//! Structural document parsing via a partition HTTP API
//!
//! Posts a file to an Unstructured-compatible `/general` endpoint and maps
//! the returned elements into typed [`Element`]s. Element text is whitespace-
//! normalized; tables keep their HTML rendering in metadata and, when the
//! `table-markdown` feature is enabled, get a markdown rendering as the
//! element text.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{Element, ElementCategory, Metadata};

/// Partition strategy forwarded to the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Let the service pick per document
    #[default]
    Auto,
    /// Model-based layout detection
    HiRes,
    /// OCR every page
    OcrOnly,
    /// Rule-based extraction only
    Fast,
}

impl PartitionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::HiRes => "hi_res",
            Self::OcrOnly => "ocr_only",
            Self::Fast => "fast",
        }
    }
}

/// Partition API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Partition strategy
    pub strategy: PartitionStrategy,
    /// Ask the service for table structure as HTML
    pub infer_table_structure: bool,
    /// Ask the service to extract embedded images
    pub extract_images: bool,
    /// OCR language hints
    pub languages: Vec<String>,
    /// Endpoint URL
    pub api_url: String,
    /// API key sent as the `unstructured-api-key` header
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Extra form parameters, overriding generated ones on name collision
    pub extra_params: Vec<(String, String)>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::Auto,
            infer_table_structure: true,
            extract_images: false,
            languages: Vec::new(),
            api_url: "https://api.unstructured.io/general/v0/general".to_string(),
            api_key: None,
            timeout_secs: 120,
            extra_params: Vec::new(),
        }
    }
}

/// One element of the API response
#[derive(Debug, Deserialize)]
struct ApiElement {
    #[serde(rename = "type")]
    category: String,
    #[serde(default)]
    element_id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: ApiElementMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ApiElementMetadata {
    #[serde(default)]
    text_as_html: Option<String>,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(flatten)]
    rest: Metadata,
}

/// Partition a file into structural elements. Failures (missing file,
/// transport, bad response) are logged and yield an empty vector.
pub fn partition_file(path: &Path, config: &PartitionConfig) -> Vec<Element> {
    match try_partition_file(path, config) {
        Ok(elements) => elements,
        Err(e) => {
            tracing::error!("failed to partition {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

pub(crate) fn try_partition_file(path: &Path, config: &PartitionConfig) -> Result<Vec<Element>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let data = std::fs::read(path)?;

    tracing::info!(
        "partitioning '{}' with {} strategy",
        path.display(),
        config.strategy.as_str()
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let mut form = reqwest::blocking::multipart::Form::new().part(
        "files",
        reqwest::blocking::multipart::Part::bytes(data).file_name(file_name),
    );
    for (name, value) in build_params(config) {
        form = form.text(name, value);
    }

    let mut request = client.post(&config.api_url).multipart(form);
    if let Some(api_key) = &config.api_key {
        request = request.header("unstructured-api-key", api_key.as_str());
    }

    let response = request.send()?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        return Err(Error::file_parse(
            path.display().to_string(),
            format!("partition API returned {status}: {body}"),
        ));
    }

    let api_elements: Vec<ApiElement> = response.json()?;
    let source = path.display().to_string();
    let elements: Vec<Element> = api_elements
        .into_iter()
        .map(|element| convert_element(element, &source))
        .collect();

    tracing::info!("partitioned '{}' into {} element(s)", source, elements.len());
    Ok(elements)
}

/// Form parameters for the request: generated defaults first, then
/// `extra_params`. An extra parameter with the same name replaces the
/// generated one.
fn build_params(config: &PartitionConfig) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("strategy".to_string(), config.strategy.as_str().to_string()),
        (
            "infer_table_structure".to_string(),
            config.infer_table_structure.to_string(),
        ),
    ];
    if config.extract_images {
        params.push((
            "extract_image_block_types".to_string(),
            "[\"Image\"]".to_string(),
        ));
    }
    for language in &config.languages {
        params.push(("languages".to_string(), language.clone()));
    }

    for (name, value) in &config.extra_params {
        params.retain(|(existing, _)| existing != name);
        params.push((name.clone(), value.clone()));
    }
    params
}

/// Map an API element to the typed form: normalized text, category folded
/// into the enum, structural metadata carried over, and a source entry
/// pointing at the local path.
fn convert_element(element: ApiElement, source: &str) -> Element {
    let category = ElementCategory::parse(&element.category);
    let mut text = clean_extra_whitespace(&element.text);
    let mut metadata = element.metadata.rest;

    // a source supplied by the service is preserved, never overwritten
    metadata
        .entry("source".to_string())
        .or_insert_with(|| json!(source));
    if let Some(page) = element.metadata.page_number {
        metadata.insert("page_number".to_string(), json!(page));
    }
    if let Some(filename) = element.metadata.filename {
        metadata.insert("filename".to_string(), json!(filename));
    }

    if category == ElementCategory::Table {
        if let Some(html) = element.metadata.text_as_html {
            metadata.insert("text_as_html".to_string(), json!(html));
            #[cfg(feature = "table-markdown")]
            {
                if let Some(markdown) = table_html_to_markdown(&html) {
                    text = markdown;
                }
            }
            #[cfg(not(feature = "table-markdown"))]
            {
                tracing::warn!("table markdown rendering disabled, keeping plain table text");
            }
        }
    }

    if category == ElementCategory::Image {
        tracing::debug!("image element passed through without captioning");
    }

    Element {
        category,
        element_id: element
            .element_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        text,
        metadata,
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces
fn clean_extra_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render an HTML table as a markdown pipe table. Returns `None` when the
/// fragment contains no rows.
#[cfg(feature = "table-markdown")]
fn table_html_to_markdown(html: &str) -> Option<String> {
    let fragment = scraper::Html::parse_fragment(html);
    let row_selector = scraper::Selector::parse("tr").unwrap();
    let cell_selector = scraper::Selector::parse("th, td").unwrap();

    let mut lines = Vec::new();
    for (row_index, row) in fragment.select(&row_selector).enumerate() {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| clean_extra_whitespace(&cell.text().collect::<String>()))
            .collect();
        if cells.is_empty() {
            continue;
        }
        lines.push(format!("| {} |", cells.join(" | ")));
        if row_index == 0 {
            lines.push(format!(
                "|{}|",
                cells.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
            ));
        }
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Flatten elements into plain records, folding category and element id
/// into metadata.
pub fn elements_to_records(elements: Vec<Element>) -> Vec<crate::types::Record> {
    elements.into_iter().map(Element::into_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_extra_whitespace() {
        assert_eq!(
            clean_extra_whitespace("  a \n\n b\tc  "),
            "a b c"
        );
        assert_eq!(clean_extra_whitespace(""), "");
    }

    #[test]
    fn test_build_params_defaults() {
        let params = build_params(&PartitionConfig::default());
        assert!(params.contains(&("strategy".to_string(), "auto".to_string())));
        assert!(params.contains(&("infer_table_structure".to_string(), "true".to_string())));
    }

    #[test]
    fn test_build_params_extra_overrides() {
        let config = PartitionConfig {
            extra_params: vec![
                ("strategy".to_string(), "hi_res".to_string()),
                ("coordinates".to_string(), "true".to_string()),
            ],
            ..PartitionConfig::default()
        };
        let params = build_params(&config);
        assert!(!params.contains(&("strategy".to_string(), "auto".to_string())));
        assert!(params.contains(&("strategy".to_string(), "hi_res".to_string())));
        assert!(params.contains(&("coordinates".to_string(), "true".to_string())));
    }

    #[test]
    fn test_partition_missing_file_yields_empty() {
        let elements = partition_file(
            Path::new("no/such/file.pdf"),
            &PartitionConfig::default(),
        );
        assert!(elements.is_empty());
    }

    #[test]
    fn test_convert_element_normalizes_and_sources() {
        let element = ApiElement {
            category: "NarrativeText".to_string(),
            element_id: Some("abc".to_string()),
            text: "hello   \n world".to_string(),
            metadata: ApiElementMetadata {
                page_number: Some(3),
                ..ApiElementMetadata::default()
            },
        };
        let converted = convert_element(element, "report.pdf");
        assert_eq!(converted.category, ElementCategory::NarrativeText);
        assert_eq!(converted.element_id, "abc");
        assert_eq!(converted.text, "hello world");
        assert_eq!(converted.metadata["source"], "report.pdf");
        assert_eq!(converted.metadata["page_number"], 3);
    }

    #[test]
    fn test_convert_element_keeps_response_source() {
        let mut rest = Metadata::new();
        rest.insert("source".to_string(), json!("upstream.pdf"));
        let element = ApiElement {
            category: "NarrativeText".to_string(),
            element_id: Some("abc".to_string()),
            text: "text".to_string(),
            metadata: ApiElementMetadata {
                rest,
                ..ApiElementMetadata::default()
            },
        };
        let converted = convert_element(element, "local.pdf");
        assert_eq!(converted.metadata["source"], "upstream.pdf");
    }

    #[test]
    fn test_convert_element_generates_missing_id() {
        let element = ApiElement {
            category: "Title".to_string(),
            element_id: None,
            text: "Heading".to_string(),
            metadata: ApiElementMetadata::default(),
        };
        let converted = convert_element(element, "doc.pdf");
        assert!(!converted.element_id.is_empty());
    }

    #[cfg(feature = "table-markdown")]
    #[test]
    fn test_table_element_renders_markdown() {
        let html = "<table><tr><th>name</th><th>age</th></tr>\
                    <tr><td>alice</td><td>30</td></tr></table>";
        let element = ApiElement {
            category: "Table".to_string(),
            element_id: Some("t1".to_string()),
            text: "name age alice 30".to_string(),
            metadata: ApiElementMetadata {
                text_as_html: Some(html.to_string()),
                ..ApiElementMetadata::default()
            },
        };
        let converted = convert_element(element, "doc.pdf");
        assert_eq!(
            converted.text,
            "| name | age |\n| --- | --- |\n| alice | 30 |"
        );
        assert_eq!(converted.metadata["text_as_html"], html);
    }

    #[cfg(feature = "table-markdown")]
    #[test]
    fn test_table_html_without_rows() {
        assert_eq!(table_html_to_markdown("<p>not a table</p>"), None);
    }
}
