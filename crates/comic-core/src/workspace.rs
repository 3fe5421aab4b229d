//! Per-file scratch directories.
//!
//! A [`WorkingSet`] belongs to exactly one source file's run. It holds the
//! raw extracted entries, the numbered JPEG pages and the single-page PDFs,
//! each in its own subdirectory, and is removed recursively when dropped.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

const RAW_DIR: &str = "raw";
const PAGES_DIR: &str = "pages";
const SHEETS_DIR: &str = "sheets";

pub struct WorkingSet {
    dir: TempDir,
}

impl WorkingSet {
    /// Create a fresh working set under `root`.
    pub fn create_in(root: &Path, base_name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!(".comic2pdf-{}-", sanitize(base_name)))
            .tempdir_in(root)?;
        for sub in [RAW_DIR, PAGES_DIR, SHEETS_DIR] {
            fs::create_dir(dir.path().join(sub))?;
        }
        log::debug!("Working set: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Extractor output, flat.
    pub fn raw_dir(&self) -> PathBuf {
        self.dir.path().join(RAW_DIR)
    }

    /// Numbered JPEG pages.
    pub fn pages_dir(&self) -> PathBuf {
        self.dir.path().join(PAGES_DIR)
    }

    /// Single-page PDFs.
    pub fn sheets_dir(&self) -> PathBuf {
        self.dir.path().join(SHEETS_DIR)
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .take(32)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
