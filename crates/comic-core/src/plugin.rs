//! Plugin traits for extractors, the page normalizer and the assembler.

use std::path::Path;

use crate::error::Result;
use crate::options::ConversionOptions;
use crate::page::Page;
use crate::source::ComicFormat;
use crate::workspace::WorkingSet;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Input format plugin: unpacks a source file into a flat directory of entries.
pub trait InputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// File formats this plugin handles.
    fn supported_formats(&self) -> &[ComicFormat];

    /// Write every image-bearing entry of `input_path` into `output_dir`
    /// without subdirectories.
    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        options: &ConversionOptions,
    ) -> Result<()>;
}

/// Turns raw extracted entries into numbered pages.
pub trait Transform: Send + Sync {
    /// Human-readable name of this transform.
    fn name(&self) -> &str;

    /// Read the working set's raw entries and produce its pages, in order.
    /// An empty result means no entry was an image.
    fn apply(&self, work: &WorkingSet, options: &ConversionOptions) -> Result<Vec<Page>>;
}

/// A page that could not be placed into the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub number: u32,
    pub reason: String,
}

/// What an output plugin managed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub pages_written: usize,
    pub skipped: Vec<PageFailure>,
}

/// Output plugin: assembles pages into the final document.
pub trait OutputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// Write `pages` to `output_path`. Either the whole document is written
    /// or nothing is; individual pages may be skipped and are listed in the
    /// report.
    fn convert(
        &self,
        pages: &[Page],
        work: &WorkingSet,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<AssemblyReport>;
}
