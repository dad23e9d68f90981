//! Multi-format file loading
//!
//! Maps a file path (or directory, or URL) to uniform records. The loader
//! for a file is picked from a fixed extension table unless the caller names
//! one explicitly; unmapped extensions fall back to the structural partition
//! API. All entry points log failures and return empty results instead of
//! raising; strict directory mode is the only path that propagates errors.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::config::{DirectoryConfig, LoaderConfig, WebLoaderConfig};
use crate::error::{Error, Result};
use crate::types::{Element, Record};

use super::partition;

/// Loader implementations selectable by extension or by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    /// Plain text (also used for source code files)
    Text,
    /// PDF text extraction
    Pdf,
    /// Markdown rendered to plain text
    Markdown,
    /// CSV rows joined into readable lines
    Csv,
    /// Word document paragraphs
    Docx,
    /// PowerPoint slides
    Pptx,
    /// RFC-822 email message
    Email,
    /// HTML body text
    Html,
    /// Generic structured-extraction fallback via the partition API
    Unstructured,
}

impl LoaderKind {
    /// The fixed extension table. Unmapped extensions return `None`;
    /// callers fall back to [`LoaderKind::Unstructured`].
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "md" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "eml" => Some(Self::Email),
            "py" => Some(Self::Text),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Loader name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Email => "email",
            Self::Html => "html",
            Self::Unstructured => "unstructured",
        }
    }
}

/// Pick a loader for a path: the extension table first, then the generic
/// fallback with a logged warning.
fn resolve_loader(path: &Path) -> LoaderKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match LoaderKind::for_extension(ext) {
        Some(kind) => kind,
        None => {
            tracing::warn!(
                "no default loader for '.{}' extension, falling back to the partition API",
                ext
            );
            LoaderKind::Unstructured
        }
    }
}

/// Load a single file into records.
///
/// A missing file or a failed parse is logged and yields an empty vector;
/// callers detect failure by checking for emptiness. Every returned record
/// carries a `source` metadata entry (preserved if the extractor already
/// supplied one).
pub fn load_single_file(
    path: &Path,
    loader_kind: Option<LoaderKind>,
    config: &LoaderConfig,
) -> Vec<Record> {
    match try_load_single_file(path, loader_kind, config) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("failed to load file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Fallible single-file load, used by strict directory mode and the wrapper
pub(crate) fn try_load_single_file(
    path: &Path,
    loader_kind: Option<LoaderKind>,
    config: &LoaderConfig,
) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let kind = loader_kind.unwrap_or_else(|| resolve_loader(path));
    let source = path.display().to_string();
    tracing::info!("loading file '{}' with {} loader", source, kind.name());

    let mut records = match kind {
        LoaderKind::Unstructured => {
            let elements = partition::try_partition_file(path, &config.partition)?;
            elements.into_iter().map(Element::into_record).collect()
        }
        _ => {
            let data = std::fs::read(path)?;
            match kind {
                LoaderKind::Text => extract_text(&data),
                LoaderKind::Pdf => extract_pdf(&source, &data, config.pdf_timeout_secs)?,
                LoaderKind::Markdown => extract_markdown(&data),
                LoaderKind::Csv => extract_csv(&source, &data, config.csv_delimiter)?,
                LoaderKind::Docx => extract_docx(&source, &data)?,
                LoaderKind::Pptx => extract_pptx(&source, &data)?,
                LoaderKind::Email => extract_email(&data),
                LoaderKind::Html => extract_html(&data),
                LoaderKind::Unstructured => unreachable!(),
            }
        }
    };

    for record in &mut records {
        record.ensure_source(&source);
    }

    tracing::info!("loaded {} record(s) from '{}'", records.len(), source);
    Ok(records)
}

/// Load every file in a directory that matches the glob pattern.
///
/// A missing directory or an invalid pattern is logged and yields
/// `Ok(empty)`. With `silent_errors` (the default) a per-file failure is
/// logged and that file is skipped; without it the first failure aborts the
/// batch with an error.
pub fn load_directory(dir: &Path, config: &DirectoryConfig) -> Result<Vec<Record>> {
    if !dir.is_dir() {
        tracing::error!("directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let pattern = if config.recursive {
        config.glob_pattern.clone()
    } else {
        config.glob_pattern.trim_start_matches("**/").to_string()
    };
    let full_pattern = dir.join(&pattern).display().to_string();

    let entries = match glob::glob(&full_pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("invalid glob pattern '{}': {}", full_pattern, e);
            return Ok(Vec::new());
        }
    };

    let mut files: Vec<_> = entries
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("skipping unreadable path: {}", e);
                None
            }
        })
        .collect();
    files.sort();

    tracing::info!(
        "found {} file(s) matching '{}' in {}",
        files.len(),
        pattern,
        dir.display()
    );

    let results = load_files(&files, config);

    let mut all_records = Vec::new();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(records) => all_records.extend(records),
            Err(e) if config.silent_errors => {
                tracing::warn!("error loading file {}: {}", path.display(), e);
            }
            Err(e) => {
                tracing::error!("aborting directory load at {}: {}", path.display(), e);
                return Err(e);
            }
        }
    }

    tracing::info!(
        "loaded {} record(s) from directory {}",
        all_records.len(),
        dir.display()
    );
    Ok(all_records)
}

/// Load files in matched order, fanning the batch out over a small thread
/// pool when enabled. Results come back in the same order as `files`, so
/// record ordering and strict-mode first-error semantics match the
/// sequential path.
fn load_files(files: &[PathBuf], config: &DirectoryConfig) -> Vec<Result<Vec<Record>>> {
    if !config.use_multithreading || files.len() < 2 {
        return files
            .iter()
            .map(|path| try_load_single_file(path, config.loader_kind, &config.loader))
            .collect();
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(files.len());
    let per_worker = files.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(per_worker)
            .map(|batch| {
                let handle = scope.spawn(move || {
                    batch
                        .iter()
                        .map(|path| {
                            try_load_single_file(path, config.loader_kind, &config.loader)
                        })
                        .collect::<Vec<_>>()
                });
                (handle, batch)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(handle, batch)| {
                handle.join().unwrap_or_else(|_| {
                    batch
                        .iter()
                        .map(|path| {
                            Err(Error::Internal(format!(
                                "loader thread panicked on {}",
                                path.display()
                            )))
                        })
                        .collect()
                })
            })
            .collect()
    })
}

/// Fetch a web page and extract its body text into a single record.
/// Transport or status failures are logged and yield an empty vector.
pub fn load_web_page(url: &str, config: &WebLoaderConfig) -> Vec<Record> {
    match try_load_web_page(url, config) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("failed to load web page {}: {}", url, e);
            Vec::new()
        }
    }
}

fn try_load_web_page(url: &str, config: &WebLoaderConfig) -> Result<Vec<Record>> {
    tracing::info!("fetching web page '{}'", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(Error::Internal(format!(
            "request for {} returned {}",
            url,
            response.status()
        )));
    }
    let html = response.text()?;

    let mut record = Record::new(body_text(&html));
    if let Some(title) = page_title(&html) {
        record.metadata.insert("title".to_string(), json!(title));
    }
    record.ensure_source(url);
    Ok(vec![record])
}

fn extract_text(data: &[u8]) -> Vec<Record> {
    vec![Record::new(String::from_utf8_lossy(data).to_string())]
}

fn extract_pdf(source: &str, data: &[u8], timeout_secs: u64) -> Result<Vec<Record>> {
    let raw = pdf_text_with_timeout(data, timeout_secs)
        .map_err(|e| Error::file_parse(source, e))?;

    let content = normalize_pdf_text(&raw);
    if content.trim().is_empty() {
        return Err(Error::file_parse(
            source,
            "no text content could be extracted; the PDF may be image-based",
        ));
    }

    let mut record = Record::new(content);
    if let Ok(doc) = lopdf::Document::load_mem(data) {
        record
            .metadata
            .insert("total_pages".to_string(), json!(doc.get_pages().len()));
    }
    Ok(vec![record])
}

/// Run PDF text extraction on a worker thread with a deadline. Some fonts
/// make the extractor spin; the thread is abandoned on timeout.
fn pdf_text_with_timeout(data: &[u8], timeout_secs: u64) -> Result<String> {
    let owned = data.to_vec();
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let _ = tx.send(pdf_extract::extract_text_from_mem(&owned));
    });

    match rx.recv_timeout(Duration::from_secs(timeout_secs)) {
        Ok(Ok(text)) => {
            let _ = handle.join();
            Ok(text)
        }
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(Error::Internal(format!("pdf text extraction failed: {e}")))
        }
        Err(_) => Err(Error::Internal(format!(
            "pdf text extraction timed out after {timeout_secs}s"
        ))),
    }
}

/// Substitute glyphs the extractor leaves as codepoints, strip nulls, and
/// drop blank lines.
fn normalize_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_markdown(data: &[u8]) -> Vec<Record> {
    use pulldown_cmark::{Event, Parser, TagEnd};

    let source_text = String::from_utf8_lossy(data);
    let mut out = String::new();

    for event in Parser::new(&source_text) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => {
                out.push_str("\n\n");
            }
            Event::End(TagEnd::Item) | Event::End(TagEnd::CodeBlock) => out.push('\n'),
            _ => {}
        }
    }

    vec![Record::new(out.trim().to_string())]
}

fn extract_csv(source: &str, data: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(data);

    let mut content = String::new();
    if let Ok(headers) = reader.headers() {
        content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
        content.push('\n');
    }

    let mut row_count = 0usize;
    for result in reader.records() {
        let row = result.map_err(|e| Error::file_parse(source, e))?;
        content.push_str(&row.iter().collect::<Vec<_>>().join(" | "));
        content.push('\n');
        row_count += 1;
    }

    let mut record = Record::new(content);
    record.metadata.insert("row_count".to_string(), json!(row_count));
    Ok(vec![record])
}

fn extract_docx(source: &str, data: &[u8]) -> Result<Vec<Record>> {
    let doc = docx_rs::read_docx(data).map_err(|e| Error::file_parse(source, e))?;

    let mut content = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(text) = child {
                            content.push_str(&text.text);
                        }
                    }
                }
            }
            content.push('\n');
        }
        // tables and embedded objects are left to the structural parser
    }

    Ok(vec![Record::new(content.trim_end().to_string())])
}

fn extract_pptx(source: &str, data: &[u8]) -> Result<Vec<Record>> {
    let cursor = std::io::Cursor::new(data);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| Error::file_parse(source, e))?;

    // slide parts are ppt/slides/slide<N>.xml, ordered by N
    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    slide_names.sort_by_key(|name| {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(0)
    });

    let mut records = Vec::new();
    for (idx, name) in slide_names.iter().enumerate() {
        let Ok(mut file) = archive.by_name(name) else {
            continue;
        };
        let mut xml = String::new();
        if file.read_to_string(&mut xml).is_err() {
            continue;
        }
        let text = slide_text_from_xml(&xml);
        if text.is_empty() {
            continue;
        }
        let mut record = Record::new(text);
        record
            .metadata
            .insert("slide_number".to_string(), json!(idx + 1));
        records.push(record);
    }

    if records.is_empty() {
        return Err(Error::file_parse(source, "no slide text extracted"));
    }
    Ok(records)
}

/// Pull the text runs (`<a:t>`) out of a slide XML part, one line per
/// paragraph.
fn slide_text_from_xml(xml: &str) -> String {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    // text runs keep significant leading/trailing spaces, so no trim_text;
    // only text inside <a:t> is collected
    let mut reader = Reader::from_str(xml);

    let mut lines: Vec<String> = Vec::new();
    let mut current_line = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                in_text_run = true;
            }
            Ok(Event::Text(e)) => {
                if in_text_run {
                    if let Ok(text) = e.unescape() {
                        current_line.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    let line = current_line.trim().to_string();
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    current_line.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    if !current_line.trim().is_empty() {
        lines.push(current_line.trim().to_string());
    }
    lines.join("\n")
}

/// Minimal RFC-822 extraction: headers until the first blank line (with
/// continuation unfolding), the rest is the body. Multipart bodies are kept
/// raw.
fn extract_email(data: &[u8]) -> Vec<Record> {
    let raw = String::from_utf8_lossy(data).replace("\r\n", "\n");
    let (header_block, body) = raw.split_once("\n\n").unwrap_or((raw.as_str(), ""));

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in header_block.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    let mut record = Record::new(body.trim().to_string());
    for key in ["subject", "from", "to", "date"] {
        if let Some((_, value)) = headers.iter().find(|(name, _)| name == key) {
            record.metadata.insert(key.to_string(), json!(value));
        }
    }
    vec![record]
}

fn extract_html(data: &[u8]) -> Vec<Record> {
    let html = String::from_utf8_lossy(data);
    vec![Record::new(body_text(&html))]
}

/// Space-joined text of the document body
fn body_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let body_selector = scraper::Selector::parse("body").unwrap();

    let mut content = String::new();
    if let Some(body) = document.select(&body_selector).next() {
        for text in body.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(trimmed);
            }
        }
    }
    content
}

fn page_title(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let title_selector = scraper::Selector::parse("title").unwrap();
    let title = document
        .select(&title_selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!title.is_empty()).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(LoaderKind::for_extension("txt"), Some(LoaderKind::Text));
        assert_eq!(LoaderKind::for_extension("PDF"), Some(LoaderKind::Pdf));
        assert_eq!(LoaderKind::for_extension("md"), Some(LoaderKind::Markdown));
        assert_eq!(LoaderKind::for_extension("csv"), Some(LoaderKind::Csv));
        assert_eq!(LoaderKind::for_extension("docx"), Some(LoaderKind::Docx));
        assert_eq!(LoaderKind::for_extension("pptx"), Some(LoaderKind::Pptx));
        assert_eq!(LoaderKind::for_extension("eml"), Some(LoaderKind::Email));
        assert_eq!(LoaderKind::for_extension("py"), Some(LoaderKind::Text));
        assert_eq!(LoaderKind::for_extension("xyz"), None);
    }

    #[test]
    fn test_unmapped_extension_falls_back_to_unstructured() {
        assert_eq!(
            resolve_loader(Path::new("notes.xyz")),
            LoaderKind::Unstructured
        );
        assert_eq!(resolve_loader(Path::new("notes.txt")), LoaderKind::Text);
    }

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "sample.txt", "line one\nline two".as_bytes());

        let records = load_single_file(&path, None, &LoaderConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "line one\nline two");
        assert_eq!(records[0].source(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let records = load_single_file(
            Path::new("does/not/exist.txt"),
            None,
            &LoaderConfig::default(),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "table.csv", b"name,age\nalice,30\nbob,25\n");

        let records = load_single_file(&path, None, &LoaderConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "name | age\nalice | 30\nbob | 25\n");
        assert_eq!(records[0].metadata["row_count"], 2);
    }

    #[test]
    fn test_load_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "doc.md",
            "# Heading\n\nFirst paragraph.\n\n- item one\n- item two\n".as_bytes(),
        );

        let records = load_single_file(&path, None, &LoaderConfig::default());
        assert_eq!(records.len(), 1);
        assert!(records[0].content.contains("Heading"));
        assert!(records[0].content.contains("First paragraph."));
        assert!(records[0].content.contains("item one"));
        assert!(!records[0].content.contains('#'));
    }

    #[test]
    fn test_load_email() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "message.eml",
            concat!(
                "From: alice@example.com\r\n",
                "To: bob@example.com\r\n",
                "Subject: quarterly\r\n",
                " report\r\n",
                "\r\n",
                "Body text here.\r\n"
            )
            .as_bytes(),
        );

        let records = load_single_file(&path, None, &LoaderConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Body text here.");
        assert_eq!(records[0].metadata["subject"], "quarterly report");
        assert_eq!(records[0].metadata["from"], "alice@example.com");
    }

    #[test]
    fn test_load_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "page.html",
            b"<html><head><title>T</title></head><body><p>Hello</p><p>World</p></body></html>",
        );

        let records = load_single_file(&path, None, &LoaderConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Hello World");
    }

    #[test]
    fn test_explicit_loader_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        // a .md file loaded verbatim as text keeps its markers
        let path = write_file(dir.path(), "doc.md", b"# Raw heading");

        let records = load_single_file(&path, Some(LoaderKind::Text), &LoaderConfig::default());
        assert_eq!(records[0].content, "# Raw heading");
    }

    #[test]
    fn test_directory_silent_errors_skips_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.txt", b"valid contents");
        // not a zip archive, so the docx loader fails on it
        write_file(dir.path(), "broken.docx", b"not a docx");

        let config = DirectoryConfig::default();
        let records = load_directory(dir.path(), &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "valid contents");
    }

    #[test]
    fn test_directory_strict_mode_propagates() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.txt", b"valid contents");
        write_file(dir.path(), "broken.docx", b"not a docx");

        let config = DirectoryConfig {
            silent_errors: false,
            ..DirectoryConfig::default()
        };
        assert!(load_directory(dir.path(), &config).is_err());
    }

    #[test]
    fn test_directory_skips_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "seen.txt", b"visible");
        write_file(dir.path(), ".hidden.txt", b"invisible");

        let records = load_directory(dir.path(), &DirectoryConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "visible");
    }

    #[test]
    fn test_directory_glob_filter() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.txt", b"text a");
        write_file(dir.path(), "b.csv", b"h\nv\n");

        let config = DirectoryConfig {
            glob_pattern: "**/*.txt".to_string(),
            ..DirectoryConfig::default()
        };
        let records = load_directory(dir.path(), &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "text a");
    }

    #[test]
    fn test_directory_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_file(dir.path(), "top.txt", b"top");
        write_file(&dir.path().join("nested"), "deep.txt", b"deep");

        let recursive = load_directory(dir.path(), &DirectoryConfig::default()).unwrap();
        assert_eq!(recursive.len(), 2);

        let flat_config = DirectoryConfig {
            recursive: false,
            ..DirectoryConfig::default()
        };
        let flat = load_directory(dir.path(), &flat_config).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].content, "top");
    }

    #[test]
    fn test_multithreaded_load_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write_file(dir.path(), &format!("f{i}.txt"), format!("body {i}").as_bytes());
        }

        let threaded = load_directory(dir.path(), &DirectoryConfig::default()).unwrap();
        let sequential = load_directory(
            dir.path(),
            &DirectoryConfig {
                use_multithreading: false,
                ..DirectoryConfig::default()
            },
        )
        .unwrap();

        assert_eq!(threaded.len(), 8);
        assert_eq!(threaded, sequential);
        // matched-file order is preserved
        assert_eq!(threaded[0].content, "body 0");
        assert_eq!(threaded[7].content, "body 7");
    }

    #[test]
    fn test_multithreaded_strict_mode_propagates() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.txt", b"valid contents");
        write_file(dir.path(), "broken.docx", b"not a docx");

        let config = DirectoryConfig {
            silent_errors: false,
            use_multithreading: true,
            ..DirectoryConfig::default()
        };
        assert!(load_directory(dir.path(), &config).is_err());
    }

    #[test]
    fn test_missing_directory_returns_empty() {
        let records =
            load_directory(Path::new("no/such/dir"), &DirectoryConfig::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_normalize_pdf_text() {
        let raw = "  first\u{00A0}line  \n\n\u{2018}quoted\u{2019}\n\0\n";
        assert_eq!(normalize_pdf_text(raw), "first line\n'quoted'");
    }

    #[test]
    fn test_slide_text_from_xml() {
        let xml = r#"<p:sld xmlns:a="urn:a" xmlns:p="urn:p">
            <p:txBody><a:p><a:r><a:t>Hello</a:t></a:r><a:r><a:t> slide</a:t></a:r></a:p>
            <a:p><a:r><a:t>Second line</a:t></a:r></a:p></p:txBody></p:sld>"#;
        assert_eq!(slide_text_from_xml(xml), "Hello slide\nSecond line");
    }
}
