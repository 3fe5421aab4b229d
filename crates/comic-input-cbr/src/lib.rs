//! CBR input plugin: unpacks RAR-based comic archives with an external
//! decoder.
//!
//! The decoder is chosen once, when the plugin is built, from a preference
//! list (`unrar` first, then `7z` by default). Entries are extracted with
//! their paths and then flattened into the output directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use comic_core::error::{ConvertError, Result};
use comic_core::options::{ConversionOptions, RarDecoderKind};
use comic_core::plugin::InputPlugin;
use comic_core::source::ComicFormat;
use comic_utils::{fsutil, tools};

/// A RAR decoder resolved on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarDecoder {
    pub kind: RarDecoderKind,
    pub program: PathBuf,
}

impl RarDecoder {
    /// First decoder from `preferences` that is installed.
    pub fn detect(preferences: &[RarDecoderKind]) -> Option<Self> {
        preferences.iter().find_map(|kind| {
            tools::find_executable(kind.program()).map(|program| Self {
                kind: *kind,
                program,
            })
        })
    }

    /// Command-line arguments to extract `archive` with paths into `dest`.
    fn args(&self, archive: &Path, dest: &Path) -> Vec<OsString> {
        match self.kind {
            RarDecoderKind::Unrar => {
                // unrar treats the destination as a directory only with a
                // trailing separator.
                let mut dest = dest.as_os_str().to_os_string();
                dest.push(std::path::MAIN_SEPARATOR_STR);
                vec![
                    "x".into(),
                    "-o+".into(),
                    "-y".into(),
                    "-p-".into(),
                    "-idq".into(),
                    archive.as_os_str().to_os_string(),
                    dest,
                ]
            }
            RarDecoderKind::SevenZip => {
                let mut out = OsString::from("-o");
                out.push(dest.as_os_str());
                vec![
                    "x".into(),
                    "-y".into(),
                    "-bd".into(),
                    out,
                    archive.as_os_str().to_os_string(),
                ]
            }
        }
    }
}

pub struct CbrInputPlugin {
    decoder: Option<RarDecoder>,
}

impl CbrInputPlugin {
    /// Probe for a decoder using the configured preference list.
    pub fn detect(options: &ConversionOptions) -> Self {
        let decoder = RarDecoder::detect(&options.rar_decoders);
        match decoder {
            Some(ref d) => log::debug!("RAR decoder: {} ({})", d.kind, d.program.display()),
            None => log::warn!(
                "No RAR decoder found (tried {}); CBR files will fail",
                options
                    .rar_decoders
                    .iter()
                    .map(|k| k.program())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
        Self { decoder }
    }

    pub fn with_decoder(decoder: Option<RarDecoder>) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> Option<&RarDecoder> {
        self.decoder.as_ref()
    }
}

impl InputPlugin for CbrInputPlugin {
    fn name(&self) -> &str {
        "CBR Input"
    }

    fn supported_formats(&self) -> &[ComicFormat] {
        &[ComicFormat::Cbr]
    }

    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        _options: &ConversionOptions,
    ) -> Result<()> {
        let decoder = self
            .decoder
            .as_ref()
            .ok_or_else(|| ConvertError::ToolMissing("unrar or 7z".to_string()))?;

        log::info!(
            "Reading CBR with {}: {}",
            decoder.kind,
            input_path.display()
        );

        let output = Command::new(&decoder.program)
            .args(decoder.args(input_path, output_dir))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ConvertError::Archive(format!("Failed to run {}: {}", decoder.kind, e))
            })?;

        if tools::interrupted(&output.status) {
            log::debug!("{} was interrupted", decoder.kind);
            return Err(ConvertError::Cancelled);
        }
        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                tool: decoder.kind.to_string(),
                status: output.status.to_string(),
                stderr: tools::stderr_summary(&output),
            });
        }

        let files = fsutil::flatten_tree(output_dir)?;
        log::info!("Extracted {} entries", files.len());
        Ok(())
    }
}
