//! End-to-end pipeline: load, optionally chunk or parse, save to JSON
//!
//! The orchestrator ties the adapters together behind a string mode switch
//! and persists the resulting records as pretty-printed JSON. Nothing is
//! written when processing produced no records.

use std::path::Path;

use crate::config::PipelineOptions;
use crate::error::Result;
use crate::ingestion::{chunk_records, elements_to_records, load_directory, load_single_file,
    partition_file};
use crate::types::Record;

/// Run the pipeline on `input` and save the resulting records to `output`.
///
/// Modes:
/// - `load_only`: load the file (or directory) into records
/// - `load_and_chunk`: load, then split into chunks
/// - `parse`: structural partition of a single file
///
/// Every failure path is logged; the only condition that aborts with an
/// error is a strict-mode directory load hitting a broken file. An empty
/// result is logged and leaves the output file untouched.
pub fn process_and_save(
    input: &Path,
    output: &Path,
    mode: &str,
    options: &PipelineOptions,
) -> Result<()> {
    tracing::info!(
        "processing {} in {} mode -> {}",
        input.display(),
        mode,
        output.display()
    );

    let records = match mode {
        "load_only" | "load_and_chunk" => {
            let records = if options.is_directory {
                load_directory(input, &options.directory)?
            } else {
                load_single_file(input, options.loader_kind, &options.loader)
            };

            if mode == "load_and_chunk" && !records.is_empty() {
                chunk_records(
                    &records,
                    options.chunk_strategy(),
                    options.chunk_size(),
                    options.chunk_overlap(),
                    &options.chunker,
                )
            } else {
                records
            }
        }
        "parse" => elements_to_records(partition_file(input, &options.partition)),
        other => {
            tracing::error!(
                "unknown mode '{}', expected load_only, load_and_chunk, or parse",
                other
            );
            return Ok(());
        }
    };

    if records.is_empty() {
        tracing::warn!("no records produced for {}, nothing saved", input.display());
        return Ok(());
    }

    write_records(&records, output)?;
    tracing::info!("saved {} record(s) to {}", records.len(), output.display());
    Ok(())
}

/// Serialize records as pretty-printed JSON, creating parent directories as
/// needed.
pub fn write_records(records: &[Record], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(output, json)?;
    Ok(())
}

/// Read records back from a JSON file written by [`write_records`]
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
