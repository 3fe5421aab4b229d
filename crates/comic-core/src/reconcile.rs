//! Extension reconciliation: make an archive's extension match its content.
//!
//! Only CBZ and CBR files are considered. PDFs and archives whose content
//! is not recognised keep their names.

use std::fs;
use std::path::PathBuf;

use comic_utils::signature::Signature;

use crate::error::{ConvertError, Result};
use crate::source::{ComicFormat, SourceFile};

/// What reconciliation did to a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Unchanged,
    Renamed { from: PathBuf, to: PathBuf },
}

/// The format a file should be labelled with, if different from `declared`.
pub fn corrected_format(declared: ComicFormat, sniffed: Signature) -> Option<ComicFormat> {
    match (declared, sniffed) {
        (ComicFormat::Cbr, s) if s.is_zip() => Some(ComicFormat::Cbz),
        (ComicFormat::Cbz, s) if s.is_rar() => Some(ComicFormat::Cbr),
        _ => None,
    }
}

/// Path the file would be renamed to, without touching the filesystem.
pub fn planned_rename(source: &SourceFile) -> Option<PathBuf> {
    corrected_format(source.declared, source.sniffed)
        .map(|format| source.path.with_extension(format.extension()))
}

/// Rename `source` to the extension its content calls for.
///
/// Returns the source to use from here on. An existing file at the corrected
/// name is never overwritten; that case and a rename that cannot be
/// confirmed afterwards are both errors.
pub fn reconcile(source: &SourceFile) -> Result<(SourceFile, Reconciliation)> {
    let Some(format) = corrected_format(source.declared, source.sniffed) else {
        return Ok((source.clone(), Reconciliation::Unchanged));
    };
    let target = source.path.with_extension(format.extension());

    if target.exists() {
        return Err(ConvertError::Rename {
            from: source.path.clone(),
            to: target,
            reason: "a file with the corrected name already exists".to_string(),
        });
    }

    fs::rename(&source.path, &target).map_err(|e| ConvertError::Rename {
        from: source.path.clone(),
        to: target.clone(),
        reason: e.to_string(),
    })?;

    if !target.is_file() {
        return Err(ConvertError::RenameVerification {
            from: source.path.clone(),
            to: target,
        });
    }

    log::info!(
        "{} is really {}; renamed to {}",
        source.path.display(),
        source.sniffed,
        target.display()
    );

    let reconciled = SourceFile {
        path: target.clone(),
        declared: format,
        ..source.clone()
    };
    Ok((
        reconciled,
        Reconciliation::Renamed {
            from: source.path.clone(),
            to: target,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZIP_BYTES: &[u8] = b"PK\x03\x04\x14\x00\x00\x00\x08\x00\x00\x00\x00\x00\x00\x00";
    const RAR4_BYTES: &[u8] = b"Rar!\x1a\x07\x00\xcf\x90\x73\x00\x00\x0d\x00\x00\x00";
    const RAR5_BYTES: &[u8] = b"Rar!\x1a\x07\x01\x00\x33\x92\xb5\xe5\x0a\x01\x05\x06";

    fn source_with(dir: &std::path::Path, name: &str, bytes: &[u8]) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        SourceFile::inspect(&path).unwrap()
    }

    #[test]
    fn test_corrected_format_table() {
        assert_eq!(
            corrected_format(ComicFormat::Cbr, Signature::Zip),
            Some(ComicFormat::Cbz)
        );
        assert_eq!(
            corrected_format(ComicFormat::Cbz, Signature::Rar4),
            Some(ComicFormat::Cbr)
        );
        assert_eq!(
            corrected_format(ComicFormat::Cbz, Signature::Rar5),
            Some(ComicFormat::Cbr)
        );
        assert_eq!(corrected_format(ComicFormat::Cbz, Signature::Zip), None);
        assert_eq!(corrected_format(ComicFormat::Cbr, Signature::Rar4), None);
        assert_eq!(corrected_format(ComicFormat::Cbz, Signature::Unknown), None);
        assert_eq!(corrected_format(ComicFormat::Pdf, Signature::Zip), None);
    }

    #[test]
    fn test_zip_labelled_cbr_becomes_cbz() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with(dir.path(), "book.cbr", ZIP_BYTES);

        let (fixed, outcome) = reconcile(&source).unwrap();
        assert_eq!(fixed.path, dir.path().join("book.cbz"));
        assert_eq!(fixed.declared, ComicFormat::Cbz);
        assert!(fixed.path.is_file());
        assert!(!dir.path().join("book.cbr").exists());
        assert_eq!(
            outcome,
            Reconciliation::Renamed {
                from: dir.path().join("book.cbr"),
                to: dir.path().join("book.cbz"),
            }
        );
    }

    #[test]
    fn test_rar_labelled_cbz_becomes_cbr() {
        for bytes in [RAR4_BYTES, RAR5_BYTES] {
            let dir = tempfile::tempdir().unwrap();
            let source = source_with(dir.path(), "book.cbz", bytes);
            let (fixed, _) = reconcile(&source).unwrap();
            assert_eq!(fixed.path, dir.path().join("book.cbr"));
            assert_eq!(fixed.declared, ComicFormat::Cbr);
        }
    }

    #[test]
    fn test_correct_name_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with(dir.path(), "book.cbz", ZIP_BYTES);
        let (fixed, outcome) = reconcile(&source).unwrap();
        assert_eq!(outcome, Reconciliation::Unchanged);
        assert_eq!(fixed, source);
        assert!(planned_rename(&source).is_none());
    }

    #[test]
    fn test_pdf_never_reconciled() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with(dir.path(), "book.pdf", ZIP_BYTES);
        let (_, outcome) = reconcile(&source).unwrap();
        assert_eq!(outcome, Reconciliation::Unchanged);
        assert!(dir.path().join("book.pdf").exists());
    }

    #[test]
    fn test_existing_target_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("book.cbz"), b"other").unwrap();
        let source = source_with(dir.path(), "book.cbr", ZIP_BYTES);

        let err = reconcile(&source).unwrap_err();
        assert!(matches!(err, ConvertError::Rename { .. }));
        assert_eq!(fs::read(dir.path().join("book.cbz")).unwrap(), b"other");
        assert!(dir.path().join("book.cbr").exists());
    }

    #[test]
    fn test_planned_rename() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_with(dir.path(), "v1.2.cbr", ZIP_BYTES);
        assert_eq!(planned_rename(&source), Some(dir.path().join("v1.2.cbz")));
        assert!(dir.path().join("v1.2.cbr").exists());
    }
}
