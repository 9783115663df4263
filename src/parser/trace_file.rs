//! Trace file loading.
//!
//! Accepts plain or gzip-compressed JSON. Compression is detected from a
//! `.gz` extension or, failing that, from the gzip magic number.

use super::event::TraceData;
use crate::utils::config::GZIP_MAGIC;
use crate::utils::error::LoadError;
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Load and parse a trace file
///
/// **Public** - main entry point for trace loading
///
/// # Arguments
/// * `path` - Path to a `.json` or `.json.gz` trace
///
/// # Errors
/// * `LoadError::Open` - File cannot be opened
/// * `LoadError::Read` - I/O or gzip stream error, including a corrupt
///   gzip stream hit mid-parse
/// * `LoadError::JsonError` - Invalid trace JSON
pub fn load_trace_file(path: impl AsRef<Path>) -> Result<TraceData, LoadError> {
    let path = path.as_ref();

    info!("Loading trace from: {}", path.display());

    let mut file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let gzipped = has_gz_extension(path) || starts_with_gzip_magic(&mut file)?;
    let reader = BufReader::new(file);

    let trace = if gzipped {
        debug!("Detected gzip-compressed trace");
        parse_trace_reader(GzDecoder::new(reader))?
    } else {
        parse_trace_reader(reader)?
    };

    info!("Loaded {} trace events", trace.trace_events.len());

    Ok(trace)
}

/// Parse trace JSON from any reader
///
/// Failures of the underlying reader surface as `LoadError::Read`.
pub fn parse_trace_reader<R: Read>(reader: R) -> Result<TraceData, LoadError> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            LoadError::Read(e.into())
        } else {
            LoadError::JsonError(e)
        }
    })
}

/// Parse trace JSON from a string
pub fn parse_trace_str(contents: &str) -> Result<TraceData, LoadError> {
    Ok(serde_json::from_str(contents)?)
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Peek at the first two bytes, then rewind
fn starts_with_gzip_magic(file: &mut File) -> Result<bool, LoadError> {
    let mut header = [0u8; 2];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    file.seek(SeekFrom::Start(0))?;

    Ok(filled == header.len() && header == GZIP_MAGIC)
}
