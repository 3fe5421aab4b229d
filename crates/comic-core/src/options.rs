//! Conversion options shared across the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// All options controlling a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // -- General --
    pub verbose: u8,
    /// Report planned work without renaming, extracting or writing anything.
    pub dry_run: bool,

    // -- Pages --
    /// JPEG quality (1-100) used when transcoding non-JPEG pages.
    pub jpeg_quality: u8,
    pub page_order: PageOrder,

    // -- Working directories --
    /// Parent for per-file scratch directories. Defaults to the source
    /// file's own directory.
    pub work_root: Option<PathBuf>,

    // -- External tools --
    /// Executables that must resolve on `PATH` before a batch starts.
    pub required_tools: Vec<String>,
    /// RAR decoders in order of preference; the first one found is used.
    pub rar_decoders: Vec<RarDecoderKind>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            dry_run: false,
            jpeg_quality: 90,
            page_order: PageOrder::Natural,
            work_root: None,
            required_tools: vec!["pdfimages".to_string()],
            rar_decoders: vec![RarDecoderKind::Unrar, RarDecoderKind::SevenZip],
        }
    }
}

/// How extracted entries are ordered before pages are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageOrder {
    /// Digit runs compare by value: `p2` before `p10`.
    #[default]
    Natural,
    /// Plain byte-wise name order.
    Lexical,
    /// Whatever order the filesystem lists the extracted files in.
    Enumeration,
}

impl PageOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "natural" => Some(Self::Natural),
            "lexical" => Some(Self::Lexical),
            "enumeration" => Some(Self::Enumeration),
            _ => None,
        }
    }
}

/// External programs able to unpack RAR archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RarDecoderKind {
    #[serde(rename = "unrar")]
    Unrar,
    #[serde(rename = "7z")]
    SevenZip,
}

impl RarDecoderKind {
    /// Executable name looked up on `PATH`.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Unrar => "unrar",
            Self::SevenZip => "7z",
        }
    }
}

impl std::fmt::Display for RarDecoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}
