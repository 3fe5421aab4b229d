//! Container identification from leading magic bytes.
//!
//! The result depends only on file content; the file name is never consulted.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes read from a file for classification.
pub const SIGNATURE_LEN: usize = 16;

const ZIP_PREFIX: &[u8] = b"PK\x03";
const ZIP_FOURTH: &[u8] = &[0x04, 0x06, 0x08];

const RAR4_MAGIC: &[u8] = b"Rar!";
const RAR5_MAGIC: &[u8] = b"Rar!\x1a\x07\x01\x00";
/// RAR5 marker preceded by a 4-byte little-endian length word, as some
/// repackagers emit it.
const RAR5_PREFIXED_MAGIC: &[u8] = &[
    0x06, 0x00, 0x00, 0x00, 0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x01, 0x00,
];

/// The true container type of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Zip,
    Rar4,
    Rar5,
    Unknown,
}

impl Signature {
    pub fn is_rar(self) -> bool {
        matches!(self, Self::Rar4 | Self::Rar5)
    }

    pub fn is_zip(self) -> bool {
        self == Self::Zip
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Zip => "ZIP",
            Self::Rar4 => "RAR4",
            Self::Rar5 => "RAR5",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Classify a byte prefix.
pub fn classify(prefix: &[u8]) -> Signature {
    if prefix.starts_with(RAR5_PREFIXED_MAGIC) || prefix.starts_with(RAR5_MAGIC) {
        return Signature::Rar5;
    }
    if prefix.starts_with(RAR4_MAGIC) {
        return Signature::Rar4;
    }
    if prefix.len() >= 4 && prefix.starts_with(ZIP_PREFIX) && ZIP_FOURTH.contains(&prefix[3]) {
        return Signature::Zip;
    }
    Signature::Unknown
}

/// Read up to [`SIGNATURE_LEN`] bytes of `path` and classify them.
///
/// Files shorter than the window are classified on whatever could be read.
pub fn sniff(path: &Path) -> io::Result<Signature> {
    let file = File::open(path)?;
    let mut prefix = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64).read_to_end(&mut prefix)?;
    Ok(classify(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_zip_variants() {
        assert_eq!(classify(b"PK\x03\x04rest-of-header"), Signature::Zip);
        assert_eq!(classify(b"PK\x03\x06"), Signature::Zip);
        assert_eq!(classify(b"PK\x03\x08"), Signature::Zip);
        assert_eq!(classify(b"PK\x03\x05"), Signature::Unknown);
        assert_eq!(classify(b"PK\x03"), Signature::Unknown);
    }

    #[test]
    fn test_classify_rar() {
        assert_eq!(classify(b"Rar!\x1a\x07\x00\xcf\x90"), Signature::Rar4);
        assert_eq!(classify(b"Rar!\x1a\x07\x01\x00\x33\x92"), Signature::Rar5);
        let mut prefixed = RAR5_PREFIXED_MAGIC.to_vec();
        prefixed.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(classify(&prefixed), Signature::Rar5);
        assert!(classify(&prefixed).is_rar());
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify(b"%PDF-1.7"), Signature::Unknown);
        assert_eq!(classify(b""), Signature::Unknown);
        assert_eq!(classify(b"\xff\xd8\xff\xe0"), Signature::Unknown);
    }

    #[test]
    fn test_sniff_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.cbr");
        std::fs::write(&path, b"PK\x03\x04\x14\x00\x00\x00\x08\x00").unwrap();
        assert_eq!(sniff(&path).unwrap(), Signature::Zip);
    }

    #[test]
    fn test_sniff_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.cbz");
        std::fs::write(&path, b"Ra").unwrap();
        assert_eq!(sniff(&path).unwrap(), Signature::Unknown);
    }

    #[test]
    fn test_sniff_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sniff(&dir.path().join("absent.cbz")).is_err());
    }
}
