//! Source files discovered by the batch driver.

use std::path::{Path, PathBuf};

use comic_utils::signature::{self, Signature};

use crate::error::{ConvertError, Result};

/// Input formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComicFormat {
    Pdf,
    Cbz,
    Cbr,
}

impl ComicFormat {
    /// Parse from file extension. Matching is case-sensitive: only the exact
    /// lowercase forms are accepted.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "cbz" => Some(Self::Cbz),
            "cbr" => Some(Self::Cbr),
            _ => None,
        }
    }

    /// Format of a path, judged by its extension alone.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Cbz => "cbz",
            Self::Cbr => "cbr",
        }
    }
}

impl std::fmt::Display for ComicFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

/// A candidate input file and what its bytes say it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Format claimed by the file name.
    pub declared: ComicFormat,
    /// Container type read from the leading bytes.
    pub sniffed: Signature,
    /// File name without its extension.
    pub base_name: String,
}

impl SourceFile {
    /// Inspect `path`: parse its extension and sniff its content.
    ///
    /// An unreadable file is not an error here; it sniffs as
    /// [`Signature::Unknown`] and fails later during extraction.
    pub fn inspect(path: &Path) -> Result<Self> {
        let declared = ComicFormat::from_path(path).ok_or_else(|| {
            ConvertError::UnsupportedFormat(format!("{}", path.display()))
        })?;
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| ConvertError::Other(format!("No file name: {}", path.display())))?;

        let sniffed = match signature::sniff(path) {
            Ok(sig) => sig,
            Err(e) => {
                log::warn!("Could not read signature of {}: {}", path.display(), e);
                Signature::Unknown
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            declared,
            sniffed,
            base_name,
        })
    }

    /// Directory holding the source file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Where the normalized PDF for this source is written.
    pub fn output_path(&self) -> PathBuf {
        self.dir().join(format!("{}.pdf", self.base_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_case_sensitive() {
        assert_eq!(ComicFormat::from_extension("cbz"), Some(ComicFormat::Cbz));
        assert_eq!(ComicFormat::from_extension("pdf"), Some(ComicFormat::Pdf));
        assert_eq!(ComicFormat::from_extension("CBZ"), None);
        assert_eq!(ComicFormat::from_extension("Pdf"), None);
        assert_eq!(ComicFormat::from_extension("zip"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            ComicFormat::from_path(Path::new("/x/Saga #1.cbr")),
            Some(ComicFormat::Cbr)
        );
        assert_eq!(ComicFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Issue 01.cbr");
        std::fs::write(&path, b"PK\x03\x04\x14\x00\x00\x00").unwrap();

        let source = SourceFile::inspect(&path).unwrap();
        assert_eq!(source.declared, ComicFormat::Cbr);
        assert_eq!(source.sniffed, Signature::Zip);
        assert_eq!(source.base_name, "Issue 01");
        assert_eq!(source.output_path(), dir.path().join("Issue 01.pdf"));
    }

    #[test]
    fn test_inspect_rejects_unknown_extension() {
        let err = SourceFile::inspect(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_inspect_unreadable_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceFile::inspect(&dir.path().join("gone.cbz")).unwrap();
        assert_eq!(source.sniffed, Signature::Unknown);
    }
}
