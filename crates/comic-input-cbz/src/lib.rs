//! CBZ input plugin: unpacks ZIP-based comic archives.

use std::path::Path;

use comic_core::error::{ConvertError, Result};
use comic_core::options::ConversionOptions;
use comic_core::plugin::InputPlugin;
use comic_core::source::ComicFormat;
use comic_utils::archive;

pub struct CbzInputPlugin;

impl InputPlugin for CbzInputPlugin {
    fn name(&self) -> &str {
        "CBZ Input"
    }

    fn supported_formats(&self) -> &[ComicFormat] {
        &[ComicFormat::Cbz]
    }

    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        _options: &ConversionOptions,
    ) -> Result<()> {
        log::info!("Reading CBZ: {}", input_path.display());
        let extracted = archive::extract_zip_flat(input_path, output_dir).map_err(|e| {
            ConvertError::Archive(format!("Failed to extract {}: {}", input_path.display(), e))
        })?;
        log::info!("Extracted {} entries", extracted.len());
        Ok(())
    }
}
