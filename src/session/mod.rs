//! Document session: one loaded document, its edits, and a single undo step.
//!
//! The session owns the only mutable state in the crate. Every mutating
//! operation computes its result on a copy first and commits only on
//! success, so a failed replace never leaves the document half-changed.

pub mod decode;
pub mod diff;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::docx::{self, FragmentHit};
use crate::engine::{self, Pattern, ReplacementOptions, ReplacementPair};
use crate::error::{ReplaceError, ReplaceResult};
use crate::util::atomic::atomic_write;

/// Suffix inserted before the extension of derived output paths.
pub const OUTPUT_SUFFIX: &str = "_modified";

/// Extensions loaded as plain text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "csv", "tsv", "log", "json", "xml", "html", "htm", "yaml",
    "yml", "ini", "cfg", "conf",
];

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    PlainText,
    WordDocument,
}

impl DocumentKind {
    /// Pick the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> ReplaceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if ext == "docx" {
            Ok(Self::WordDocument)
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::PlainText)
        } else {
            Err(ReplaceError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

/// `report.docx` → `report_modified.docx`; `README` → `README_modified`.
pub fn derive_output_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    path.with_file_name(name)
}

/// A loaded document and its edit history.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    kind: DocumentKind,
    /// Source archive for Word documents; `None` for plain text.
    archive: Option<Vec<u8>>,
    original: String,
    current: String,
    undo: Option<String>,
}

impl Document {
    /// Build a document from raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::UnsupportedFormat`], [`ReplaceError::Archive`],
    /// or [`ReplaceError::MalformedDocument`] when the bytes cannot be loaded.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> ReplaceResult<Self> {
        let kind = DocumentKind::from_path(path)?;
        let (archive, payload) = match kind {
            DocumentKind::PlainText => (None, decode::decode_text(&bytes)),
            DocumentKind::WordDocument => {
                let payload = docx::extract_payload(&bytes)?;
                docx::flatten(&payload)?;
                (Some(bytes), payload)
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            kind,
            archive,
            original: payload.clone(),
            current: payload,
            undo: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Current payload: the text itself, or `word/document.xml`.
    pub fn payload(&self) -> &str {
        &self.current
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// The user-visible text with all markup removed.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::MalformedDocument`] if the payload no longer
    /// parses.
    pub fn logical_text(&self) -> ReplaceResult<String> {
        logical_text(self.kind, &self.current)
    }

    /// Logical text with one line per paragraph, for previews and diffs.
    ///
    /// # Errors
    ///
    /// Same as [`Document::logical_text`].
    pub fn display_text(&self) -> ReplaceResult<String> {
        display_text(self.kind, &self.current)
    }

    /// Output file contents for the current state.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::Archive`] if the Word archive cannot be rebuilt.
    pub fn render(&self) -> ReplaceResult<Vec<u8>> {
        match &self.archive {
            None => Ok(self.current.clone().into_bytes()),
            Some(archive) => docx::inject_payload(archive, &self.current),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn logical_text(kind: DocumentKind, payload: &str) -> ReplaceResult<String> {
    match kind {
        DocumentKind::PlainText => Ok(payload.to_owned()),
        DocumentKind::WordDocument => Ok(docx::flatten(payload)?.logical_text),
    }
}

fn display_text(kind: DocumentKind, payload: &str) -> ReplaceResult<String> {
    match kind {
        DocumentKind::PlainText => Ok(payload.to_owned()),
        DocumentKind::WordDocument => Ok(docx::flatten(payload)?.display_text()),
    }
}

/// Summary returned by [`Session::apply`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Replacements per applied pair, in order.
    pub counts: Vec<usize>,
    pub total: usize,
    /// Unified diff of the display text before and after.
    pub diff: String,
}

/// One match reported by [`Session::find`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundMatch {
    /// Paragraph index in a Word document; the span offsets index into that
    /// paragraph's text. `None` for plain text, where offsets are absolute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<usize>,
    #[serde(flatten)]
    pub span: engine::MatchSpan,
}

/// Summary returned by [`Session::find`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReport {
    pub count: usize,
    pub matches: Vec<FoundMatch>,
    /// Per-fragment hits (Word documents only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<FragmentHit>,
}

/// Single-document editing session.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded document.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`] if nothing is loaded.
    pub fn document(&self) -> ReplaceResult<&Document> {
        self.document.as_ref().ok_or(ReplaceError::NoDocument)
    }

    fn document_mut(&mut self) -> ReplaceResult<&mut Document> {
        self.document.as_mut().ok_or(ReplaceError::NoDocument)
    }

    /// Load `path`, replacing any current document.
    ///
    /// Files larger than `max_bytes` are rejected before their content is
    /// read. On any failure the previous document stays loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::FileTooLarge`], [`ReplaceError::Io`], or any
    /// error from [`Document::from_bytes`].
    pub fn load(&mut self, path: &Path, max_bytes: u64) -> ReplaceResult<&Document> {
        let io_err = |source| ReplaceError::Io {
            path: path.to_path_buf(),
            source,
        };

        DocumentKind::from_path(path)?;
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > max_bytes {
            return Err(ReplaceError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max: max_bytes,
            });
        }

        let bytes = std::fs::read(path).map_err(io_err)?;
        let document = Document::from_bytes(path, bytes)?;
        info!(path = %path.display(), kind = ?document.kind, size, "document loaded");
        Ok(&*self.document.insert(document))
    }

    /// Discard the loaded document (no-op if none).
    pub fn close(&mut self) -> bool {
        let closed = self.document.take().is_some();
        if closed {
            info!("document closed");
        }
        closed
    }

    /// Apply `pairs` in order to the current document.
    ///
    /// On success with at least one change, the pre-change payload becomes
    /// the single undo snapshot. With no change the document and its undo
    /// snapshot are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`], [`ReplaceError::InvalidPattern`],
    /// or [`ReplaceError::MalformedDocument`]; the document is unchanged.
    pub fn apply(
        &mut self,
        pairs: &[ReplacementPair],
        options: &ReplacementOptions,
    ) -> ReplaceResult<ApplyReport> {
        let document = self.document_mut()?;

        let (payload, counts) = match document.kind {
            DocumentKind::PlainText => {
                let outcome = engine::apply_pairs_to_text(&document.current, pairs, options)?;
                (outcome.text, outcome.counts)
            }
            DocumentKind::WordDocument => {
                let outcome = docx::apply_pairs_to_payload(&document.current, pairs, options)?;
                (outcome.payload, outcome.counts)
            }
        };
        let total = counts.iter().sum();

        if payload == document.current {
            debug!(total, "replace produced no change");
            return Ok(ApplyReport {
                counts,
                total,
                diff: String::new(),
            });
        }

        let before = display_text(document.kind, &document.current)?;
        let after = display_text(document.kind, &payload)?;
        let diff = diff::unified_diff(&document.file_name(), &before, &after);

        document.undo = Some(std::mem::replace(&mut document.current, payload));
        info!(total, pairs = counts.len(), "replacements applied");

        Ok(ApplyReport { counts, total, diff })
    }

    /// Restore the payload captured before the last replace.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`] or [`ReplaceError::NothingToUndo`].
    pub fn undo(&mut self) -> ReplaceResult<()> {
        let document = self.document_mut()?;
        let snapshot = document.undo.take().ok_or(ReplaceError::NothingToUndo)?;
        document.current = snapshot;
        info!("undo applied");
        Ok(())
    }

    /// Return to the payload as loaded, dropping the undo snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`].
    pub fn reset(&mut self) -> ReplaceResult<()> {
        let document = self.document_mut()?;
        document.current = document.original.clone();
        document.undo = None;
        info!("document reset to original");
        Ok(())
    }

    /// Find matches of `find` in the current document.
    ///
    /// Word documents are scanned paragraph by paragraph, like replace; the
    /// reported spans index into each paragraph's text and `hits` maps them
    /// onto text fragments.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`] or [`ReplaceError::InvalidPattern`].
    pub fn find(&self, find: &str, options: &ReplacementOptions) -> ReplaceResult<FindReport> {
        let document = self.document()?;
        let pattern = Pattern::compile(find, options)?;

        match document.kind {
            DocumentKind::PlainText => {
                let matches: Vec<_> = engine::scan(&document.current, &pattern)
                    .map(|span| FoundMatch { block: None, span })
                    .collect();
                Ok(FindReport {
                    count: matches.len(),
                    matches,
                    hits: Vec::new(),
                })
            }
            DocumentKind::WordDocument => {
                let flat = docx::flatten(&document.current)?;
                let matches: Vec<_> = flat
                    .blocks
                    .iter()
                    .enumerate()
                    .flat_map(|(index, b)| {
                        engine::scan(&b.text(), &pattern)
                            .map(|span| FoundMatch {
                                block: Some(index),
                                span,
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                let hits = docx::highlights(&flat.blocks, &pattern).collect();
                Ok(FindReport {
                    count: matches.len(),
                    matches,
                    hits,
                })
            }
        }
    }

    /// Unified diff of the document as loaded against its current state.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`] or
    /// [`ReplaceError::MalformedDocument`].
    pub fn diff(&self) -> ReplaceResult<String> {
        let document = self.document()?;
        let before = display_text(document.kind, &document.original)?;
        let after = document.display_text()?;
        Ok(diff::unified_diff(&document.file_name(), &before, &after))
    }

    /// Write the current document to `output`, or next to the source with
    /// [`OUTPUT_SUFFIX`] when `output` is `None`. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::NoDocument`], [`ReplaceError::Archive`], or
    /// [`ReplaceError::Io`].
    pub fn save(&self, output: Option<&Path>) -> ReplaceResult<PathBuf> {
        let document = self.document()?;
        let target = output.map_or_else(|| derive_output_path(&document.path), Path::to_path_buf);
        let bytes = document.render()?;
        atomic_write(&target, &bytes)?;
        info!(path = %target.display(), bytes = bytes.len(), "document saved");
        Ok(target)
    }
}
