//! Source file access and content fingerprinting.
//!
//! Every entry's body lives in a source file at a fixed location derived
//! from language and id: `{source_dir}/{lang}/{id}.html.source`. The file's
//! raw bytes serve two purposes: they are the rendered body of the entry
//! page, and they are the input to the content digest the ledger uses for
//! change detection.
//!
//! The digest is MD5 — 128 bits is plenty for detecting edits, and the
//! ledger's on-disk field is named `md5`, so ledgers written by earlier
//! versions of the tool keep validating.

use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use thiserror::Error;

use crate::entry::Language;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source file missing: {0}")]
    Missing(PathBuf),
    #[error("source file is empty: {0}")]
    Empty(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An entry's source file, read once.
///
/// The same raw bytes are the digest input and, as UTF-8, the rendered body.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Raw file content — authored HTML, rendered verbatim.
    pub bytes: Vec<u8>,
    /// Hex digest of the raw bytes.
    pub digest: String,
}

impl SourceFile {
    /// Body text for rendering.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Path of an entry's source file: `{source_dir}/{lang}/{id}.html.source`.
pub fn source_path(source_dir: &Path, language: Language, id: &str) -> PathBuf {
    source_dir
        .join(language.code())
        .join(format!("{id}.html.source"))
}

/// MD5 hex digest of a byte slice.
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// Read and validate an entry's source file.
///
/// Fails with [`SourceError::Missing`] when the file does not exist and
/// [`SourceError::Empty`] when it exists but has no content — an empty page
/// cannot be rendered.
pub fn read_source(
    source_dir: &Path,
    language: Language,
    id: &str,
) -> Result<SourceFile, SourceError> {
    let path = source_path(source_dir, language, id);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SourceError::Missing(path));
        }
        Err(e) => return Err(SourceError::Io { path, source: e }),
    };
    if bytes.is_empty() {
        return Err(SourceError::Empty(path));
    }
    Ok(SourceFile {
        digest: digest(&bytes),
        bytes,
    })
}
