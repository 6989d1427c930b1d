//! `.docx` container adapter.
//!
//! A Word document is a zip archive; only `word/document.xml` is ever read or
//! rewritten. Every other entry is raw-copied (no recompression) in its
//! original order.

use std::io::{Cursor, Read as _, Write as _};

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ReplaceError, ReplaceResult};

/// Path of the main document part inside the archive.
pub const PAYLOAD_ENTRY: &str = "word/document.xml";

fn missing_payload() -> ReplaceError {
    ReplaceError::Archive(format!("missing {PAYLOAD_ENTRY}"))
}

/// Read the main document part out of `archive`.
///
/// # Errors
///
/// Returns [`ReplaceError::Archive`] if the bytes are not a zip archive or
/// the entry is absent, and [`ReplaceError::MalformedDocument`] if the entry
/// is not UTF-8.
pub fn extract_payload(archive: &[u8]) -> ReplaceResult<String> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut entry = zip.by_name(PAYLOAD_ENTRY).map_err(|e| match e {
        ZipError::FileNotFound => missing_payload(),
        other => other.into(),
    })?;

    let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ReplaceError::Archive(format!("failed to read {PAYLOAD_ENTRY}: {e}")))?;

    debug!(bytes = bytes.len(), "extracted document payload");

    String::from_utf8(bytes).map_err(|_| {
        ReplaceError::MalformedDocument(format!("{PAYLOAD_ENTRY} is not valid UTF-8"))
    })
}

/// Rebuild `archive` with `payload` as its main document part.
///
/// # Errors
///
/// Returns [`ReplaceError::Archive`] if the archive cannot be read or
/// written, or has no main document part.
pub fn inject_payload(archive: &[u8], payload: &str) -> ReplaceResult<Vec<u8>> {
    let mut source = ZipArchive::new(Cursor::new(archive))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(archive.len())));
    let mut found = false;

    for i in 0..source.len() {
        let entry = source.by_index_raw(i)?;
        if entry.name() != PAYLOAD_ENTRY {
            writer.raw_copy_file(entry)?;
            continue;
        }

        let method = match entry.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        drop(entry);

        writer.start_file(PAYLOAD_ENTRY, SimpleFileOptions::default().compression_method(method))?;
        writer
            .write_all(payload.as_bytes())
            .map_err(|e| ReplaceError::Archive(format!("failed to write {PAYLOAD_ENTRY}: {e}")))?;
        found = true;
    }

    if !found {
        return Err(missing_payload());
    }

    let bytes = writer.finish()?.into_inner();
    debug!(bytes = bytes.len(), "repacked document archive");
    Ok(bytes)
}
