//! PDF output plugin: assembles numbered JPEG pages into one PDF.
//!
//! Each page is first wrapped in its own single-page PDF inside the working
//! set, then the sheets are merged in page order. A page that cannot be
//! wrapped is left out and reported; the document is written as long as one
//! page survives. The final file appears atomically: it is written next to
//! its destination under a temporary name and renamed into place.

pub mod jpeg;
pub mod merge;
pub mod sheet;

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::Document;

use comic_core::error::{ConvertError, Result};
use comic_core::options::ConversionOptions;
use comic_core::page::{page_stem, Page};
use comic_core::plugin::{AssemblyReport, OutputPlugin, PageFailure};
use comic_core::workspace::WorkingSet;

pub use merge::{concatenate, Merger};
pub use sheet::{wrap_file, wrap_jpeg};

pub struct PdfOutputPlugin;

impl OutputPlugin for PdfOutputPlugin {
    fn name(&self) -> &str {
        "PDF Output"
    }

    fn convert(
        &self,
        pages: &[Page],
        work: &WorkingSet,
        output_path: &Path,
        _options: &ConversionOptions,
    ) -> Result<AssemblyReport> {
        log::info!("Writing PDF: {}", output_path.display());

        let sheets_dir = work.sheets_dir();
        let mut report = AssemblyReport::default();
        let mut sheets: Vec<PathBuf> = Vec::with_capacity(pages.len());

        for page in pages {
            let sheet = sheets_dir.join(format!("{}.pdf", page_stem(page.number)));
            match wrap_file(&page.path, &sheet) {
                Ok(()) => sheets.push(sheet),
                Err(reason) => {
                    log::warn!("Page {} could not be wrapped: {}", page.number, reason);
                    report.skipped.push(PageFailure {
                        number: page.number,
                        reason,
                    });
                }
            }
        }

        if sheets.is_empty() {
            return Err(ConvertError::NoPages(output_path.to_path_buf()));
        }

        let title = output_path.file_stem().map(|s| s.to_string_lossy());
        let mut doc = concatenate(&sheets, title.as_deref()).map_err(ConvertError::Pdf)?;
        write_atomically(&mut doc, output_path)?;

        report.pages_written = sheets.len();
        log::debug!(
            "{} page(s) written, {} left out",
            report.pages_written,
            report.skipped.len()
        );
        Ok(report)
    }
}

/// Save `doc` to `path` so that `path` either keeps its old content or holds
/// the complete new document.
fn write_atomically(doc: &mut Document, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".comic2pdf-")
        .suffix(".pdf.part")
        .tempfile_in(dir)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        doc.save_to(&mut writer)
            .map_err(|e| ConvertError::Pdf(format!("Failed to write PDF: {}", e)))?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ConvertError::Io(e.error))?;
    Ok(())
}
