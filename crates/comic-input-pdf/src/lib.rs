//! PDF input plugin: pulls embedded raster images out of PDF files.
//!
//! Uses `pdfimages` (poppler-utils). JPEG streams are written unchanged as
//! `.jpg`; everything else comes out as PNM and is transcoded later by the
//! page normalizer. Output names carry a zero-padded running index, so name
//! order is page order.
//!
//! `pdfimages` also dumps transparency masks as separate images. Those are
//! identified from `pdfimages -list` and removed, so they never become pages.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use comic_core::error::{ConvertError, Result};
use comic_core::options::ConversionOptions;
use comic_core::plugin::InputPlugin;
use comic_core::source::ComicFormat;
use comic_utils::tools;

/// Executable name on `PATH`.
pub const PDFIMAGES: &str = "pdfimages";

/// Prefix for extracted image files inside the output directory.
const IMAGE_PREFIX: &str = "img";

pub struct PdfInputPlugin {
    program: Option<PathBuf>,
}

impl PdfInputPlugin {
    /// Resolve `pdfimages` once.
    pub fn detect() -> Self {
        Self {
            program: tools::find_executable(PDFIMAGES),
        }
    }

    pub fn with_program(program: Option<PathBuf>) -> Self {
        Self { program }
    }
}

impl InputPlugin for PdfInputPlugin {
    fn name(&self) -> &str {
        "PDF Input"
    }

    fn supported_formats(&self) -> &[ComicFormat] {
        &[ComicFormat::Pdf]
    }

    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        _options: &ConversionOptions,
    ) -> Result<()> {
        let program = self.program.as_ref().ok_or_else(|| {
            ConvertError::ToolMissing(format!(
                "{} (poppler-utils). Install with: brew install poppler (macOS) \
                 or apt install poppler-utils (Linux)",
                PDFIMAGES
            ))
        })?;

        log::info!("Reading PDF: {}", input_path.display());

        let prefix = output_dir.join(IMAGE_PREFIX);
        let output = Command::new(program)
            .arg("-j")
            .arg(input_path.as_os_str())
            .arg(prefix.as_os_str())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ConvertError::Pdf(format!("Failed to run {}: {}", PDFIMAGES, e)))?;

        if tools::interrupted(&output.status) {
            log::debug!("{} was interrupted", PDFIMAGES);
            return Err(ConvertError::Cancelled);
        }
        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                tool: PDFIMAGES.to_string(),
                status: output.status.to_string(),
                stderr: tools::stderr_summary(&output),
            });
        }

        remove_masks(program, input_path, output_dir)?;

        let count = std::fs::read_dir(output_dir)?.count();
        log::info!("Extracted {} embedded images", count);
        Ok(())
    }
}

/// Delete extracted files that `pdfimages -list` marks as masks. If the
/// listing cannot be produced every image is kept.
fn remove_masks(program: &Path, input_path: &Path, output_dir: &Path) -> Result<()> {
    let listing = match Command::new(program)
        .arg("-list")
        .arg(input_path.as_os_str())
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(output) if tools::interrupted(&output.status) => {
            return Err(ConvertError::Cancelled);
        }
        Ok(output) => {
            log::warn!(
                "{} -list failed ({}), keeping all images",
                PDFIMAGES,
                output.status
            );
            return Ok(());
        }
        Err(e) => {
            log::warn!("{} -list could not run: {}", PDFIMAGES, e);
            return Ok(());
        }
    };

    let masks = mask_indices(&String::from_utf8_lossy(&listing.stdout));
    if masks.is_empty() {
        return Ok(());
    }
    for entry in std::fs::read_dir(output_dir)? {
        let path = entry?.path();
        if image_index(&path).is_some_and(|n| masks.contains(&n)) {
            log::debug!("Dropping mask image {}", path.display());
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Image numbers whose `type` column is `smask` or `mask`. Stencil masks are
/// painted content and stay.
///
/// The listing has two header lines, then one row per image:
/// `page num type width height color comp bpc enc ...`.
fn mask_indices(listing: &str) -> Vec<u32> {
    listing
        .lines()
        .skip(2)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _page = cols.next()?;
            let num = cols.next()?.parse().ok()?;
            match cols.next()? {
                "smask" | "mask" => Some(num),
                _ => None,
            }
        })
        .collect()
}

/// Running index of an extracted file named `img-NNN.ext`.
fn image_index(path: &Path) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(IMAGE_PREFIX)?
        .strip_prefix('-')?
        .parse()
        .ok()
}
