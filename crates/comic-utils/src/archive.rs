//! ZIP archive utilities for reading comic book archives.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::read::ZipArchive;

use crate::fsutil;

/// Folder that macOS Finder adds to archives; never holds pages.
const RESOURCE_FORK_DIR: &str = "__MACOSX";

/// Extract all file entries from a ZIP archive into `output_dir`, flattened.
///
/// Entries are written in archive index order. Nested paths are flattened
/// with [`fsutil::flatten_name`] and name collisions get a `~N` suffix.
/// Directory entries, resource forks and entries whose names would escape
/// `output_dir` are skipped.
pub fn extract_zip_flat(zip_path: &Path, output_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(rel) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe entry name: {}", entry.name());
            continue;
        };
        let top = rel.components().next().map(|c| c.as_os_str().to_os_string());
        if top.as_deref() == Some(OsStr::new(RESOURCE_FORK_DIR)) {
            continue;
        }
        let Some(flat) = fsutil::flatten_name(&rel) else {
            continue;
        };

        let out_path = fsutil::unique_path(output_dir, &flat);
        let mut outfile = File::create(&out_path)?;
        io::copy(&mut entry, &mut outfile)?;
        extracted.push(out_path);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_zip_flat() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("book.cbz");
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        write_zip(
            &zip_path,
            &[
                ("ch1/", ""),
                ("ch1/01.jpg", "one"),
                ("ch2/01.jpg", "two"),
                ("__MACOSX/ch1/._01.jpg", "fork"),
                ("cover.png", "cover"),
            ],
        );

        let extracted = extract_zip_flat(&zip_path, &out).unwrap();
        let names: Vec<String> = extracted
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ch1_01.jpg", "ch2_01.jpg", "cover.png"]);
        assert_eq!(std::fs::read(out.join("ch2_01.jpg")).unwrap(), b"two");
        assert!(!out.join("ch1").exists());
    }

    #[test]
    fn test_extract_zip_flat_collision() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("book.cbz");
        write_zip(&zip_path, &[("a/b.jpg", "1"), ("a_b.jpg", "2")]);

        let extracted = extract_zip_flat(&zip_path, dir.path()).unwrap();
        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[1], dir.path().join("a_b~1.jpg"));
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.cbz");
        std::fs::write(&path, b"Rar!\x1a\x07\x00 not a zip").unwrap();
        assert!(extract_zip_flat(&path, dir.path()).is_err());
    }
}
