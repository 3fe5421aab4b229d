//! Normalized pages.

use std::path::PathBuf;

/// Minimum digits in a page file name; larger numbers widen naturally.
pub const PAGE_NUMBER_WIDTH: usize = 3;

/// A numbered JPEG page inside a working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based, gap-free ordinal.
    pub number: u32,
    pub path: PathBuf,
}

/// File stem for page `number`: `001`, `042`, `1000`.
pub fn page_stem(number: u32) -> String {
    format!("{:0width$}", number, width = PAGE_NUMBER_WIDTH)
}

/// JPEG file name for page `number`.
pub fn page_file_name(number: u32) -> String {
    format!("{}.jpg", page_stem(number))
}
