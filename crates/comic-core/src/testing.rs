//! Stub plugins and helpers for pipeline and batch tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{ConvertError, Result};
use crate::notify::Notifier;
use crate::options::ConversionOptions;
use crate::page::{page_file_name, Page};
use crate::pipeline::PipelineBuilder;
use crate::plugin::{AssemblyReport, InputPlugin, OutputPlugin, Transform};
use crate::source::ComicFormat;
use crate::workspace::WorkingSet;

/// CBZ extractor: reads `pages:N` from the source and writes N raw entries;
/// fails on sources containing `broken`.
pub struct StubInput;

impl InputPlugin for StubInput {
    fn name(&self) -> &str {
        "Stub CBZ Input"
    }

    fn supported_formats(&self) -> &[ComicFormat] {
        &[ComicFormat::Cbz]
    }

    fn extract(&self, input: &Path, output_dir: &Path, _opts: &ConversionOptions) -> Result<()> {
        fake_extract(input, output_dir)
    }
}

/// CBR extractor behaving like [`StubInput`] that also records every path it
/// was asked to extract.
#[derive(Default, Clone)]
pub struct StubCbrInput {
    pub extracted: Arc<Mutex<Vec<PathBuf>>>,
}

impl InputPlugin for StubCbrInput {
    fn name(&self) -> &str {
        "Stub CBR Input"
    }

    fn supported_formats(&self) -> &[ComicFormat] {
        &[ComicFormat::Cbr]
    }

    fn extract(&self, input: &Path, output_dir: &Path, _opts: &ConversionOptions) -> Result<()> {
        self.extracted.lock().unwrap().push(input.to_path_buf());
        fake_extract(input, output_dir)
    }
}

fn fake_extract(input: &Path, output_dir: &Path) -> Result<()> {
    let text = String::from_utf8_lossy(&fs::read(input)?).into_owned();
    if text.contains("broken") {
        return Err(ConvertError::ToolFailed {
            tool: "stub".to_string(),
            status: "exit status: 2".to_string(),
            stderr: "corrupt archive".to_string(),
        });
    }
    let count: u32 = text
        .split("pages:")
        .nth(1)
        .and_then(|rest| rest.trim().parse().ok())
        .unwrap_or(0);
    for i in 0..count {
        fs::write(output_dir.join(format!("p{}.img", i)), b"img")?;
    }
    Ok(())
}

/// Numbers every raw entry in name order.
pub struct StubNormalizer;

impl Transform for StubNormalizer {
    fn name(&self) -> &str {
        "Stub Normalizer"
    }

    fn apply(&self, work: &WorkingSet, _opts: &ConversionOptions) -> Result<Vec<Page>> {
        let mut raw: Vec<PathBuf> = fs::read_dir(work.raw_dir())?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        raw.sort();
        let mut pages = Vec::new();
        for (i, path) in raw.iter().enumerate() {
            let number = i as u32 + 1;
            let target = work.pages_dir().join(page_file_name(number));
            fs::rename(path, &target)?;
            pages.push(Page {
                number,
                path: target,
            });
        }
        Ok(pages)
    }
}

/// Writes the page file names, one per line.
pub struct StubOutput;

impl OutputPlugin for StubOutput {
    fn name(&self) -> &str {
        "Stub Output"
    }

    fn convert(
        &self,
        pages: &[Page],
        _work: &WorkingSet,
        output_path: &Path,
        _opts: &ConversionOptions,
    ) -> Result<AssemblyReport> {
        if pages.is_empty() {
            return Err(ConvertError::NoPages(output_path.to_path_buf()));
        }
        let listing: String = pages
            .iter()
            .filter_map(|p| p.path.file_name())
            .map(|n| format!("{}\n", n.to_string_lossy()))
            .collect();
        fs::write(output_path, listing)?;
        Ok(AssemblyReport {
            pages_written: pages.len(),
            skipped: Vec::new(),
        })
    }
}

pub fn stub_builder() -> PipelineBuilder {
    stub_builder_with(StubCbrInput::default())
}

/// Stub pipeline whose CBR extractor is `cbr`, so callers can inspect it.
pub fn stub_builder_with(cbr: StubCbrInput) -> PipelineBuilder {
    PipelineBuilder::new()
        .input(Box::new(StubInput))
        .input(Box::new(cbr))
        .normalizer(Box::new(StubNormalizer))
        .output(Box::new(StubOutput))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn of_level(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn pick_directory(&self) -> Option<PathBuf> {
        None
    }
}

/// Sorted names of everything directly inside `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
