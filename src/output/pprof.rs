//! pprof profile writer.
//!
//! pprof tools expect gzip-compressed `profile.proto` bytes, usually in a
//! `.pb.gz` file.

use super::{ensure_parent_dir, validate_output_path};
use crate::utils::error::OutputError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Gzip encoded profile bytes and write them to a file
///
/// **Public** - main entry point for profile output
///
/// # Arguments
/// * `profile_bytes` - Output of `Profile::encode`
/// * `output_path` - Destination, conventionally `*.pb.gz`
///
/// # Returns
/// Number of compressed bytes written
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent
///   cannot be created
pub fn write_pprof(profile_bytes: &[u8], output_path: impl AsRef<Path>) -> Result<u64, OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing profile to: {}", output_path.display());

    validate_output_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    encoder.write_all(profile_bytes).map_err(OutputError::WriteFailed)?;
    let mut writer = encoder.finish().map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    let written = std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
    debug!(
        "Compressed {} profile bytes to {} bytes",
        profile_bytes.len(),
        written
    );

    Ok(written)
}

/// Read a gzip-compressed profile back into raw `profile.proto` bytes
///
/// **Public** - useful for verification and testing
pub fn read_pprof(input_path: impl AsRef<Path>) -> Result<Vec<u8>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let mut bytes = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut bytes)
        .map_err(OutputError::WriteFailed)?;

    Ok(bytes)
}
