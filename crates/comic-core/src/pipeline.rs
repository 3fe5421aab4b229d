//! Per-file pipeline orchestrator.
//!
//! One source file runs through four stages, strictly in sequence:
//!   reconcile (0-10%) → extract (10-40%) → normalize (40-70%) → assemble (70-100%)
//! Cancellation is checked between stages. All scratch output lives in a
//! [`WorkingSet`] that is removed on every exit path.

use std::path::{Path, PathBuf};

use log::info;

use crate::cancel::CancelToken;
use crate::error::{ConvertError, Result};
use crate::notify::Notifier;
use crate::options::ConversionOptions;
use crate::plugin::{
    AssemblyReport, InputPlugin, OutputPlugin, PageFailure, ProgressReporter, Transform,
};
use crate::reconcile::{self, Reconciliation};
use crate::source::{ComicFormat, SourceFile};
use crate::workspace::WorkingSet;

/// Result of converting one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Source path after any extension correction.
    pub source: PathBuf,
    pub renamed_from: Option<PathBuf>,
    pub output: PathBuf,
    pub pages: usize,
    pub skipped_pages: Vec<PageFailure>,
}

/// A file that could not be converted.
///
/// `source` is where the file lives now: if reconciliation renamed it before
/// a later stage failed, this is the corrected path.
#[derive(Debug)]
pub struct FileFailure {
    pub source: PathBuf,
    pub renamed_from: Option<PathBuf>,
    pub error: ConvertError,
}

/// What a run would do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source: SourceFile,
    pub rename_to: Option<PathBuf>,
    pub extractor: Option<String>,
    pub output: PathBuf,
}

/// Position of the current file within a batch, for progress scaling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgressSlot {
    pub index: usize,
    pub total: usize,
}

impl ProgressSlot {
    fn single() -> Self {
        Self { index: 0, total: 1 }
    }

    fn overall(&self, fraction: f64) -> f64 {
        (self.index as f64 + fraction) / self.total.max(1) as f64
    }
}

/// The conversion pipeline orchestrator.
pub struct Pipeline {
    input_plugins: Vec<Box<dyn InputPlugin>>,
    normalizer: Box<dyn Transform>,
    output_plugin: Box<dyn OutputPlugin>,
    progress_reporter: Option<ProgressReporter>,
}

impl Pipeline {
    pub fn new(normalizer: Box<dyn Transform>, output_plugin: Box<dyn OutputPlugin>) -> Self {
        Self {
            input_plugins: Vec::new(),
            normalizer,
            output_plugin,
            progress_reporter: None,
        }
    }

    /// Register an extractor. The first plugin claiming a format wins.
    pub fn add_input_plugin(&mut self, plugin: Box<dyn InputPlugin>) {
        self.input_plugins.push(plugin);
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    fn input_plugin_for(&self, format: ComicFormat) -> Option<&dyn InputPlugin> {
        self.input_plugins
            .iter()
            .find(|p| p.supported_formats().contains(&format))
            .map(|p| p.as_ref())
    }

    /// Work out what converting `input_path` would involve, touching nothing.
    pub fn plan(&self, input_path: &Path) -> Result<Plan> {
        let source = SourceFile::inspect(input_path)?;
        let rename_to = reconcile::planned_rename(&source);
        let format = rename_to
            .as_deref()
            .and_then(ComicFormat::from_path)
            .unwrap_or(source.declared);
        let extractor = self.input_plugin_for(format).map(|p| p.name().to_string());
        let output = source.output_path();
        Ok(Plan {
            source,
            rename_to,
            extractor,
            output,
        })
    }

    /// Run the full pipeline for a single file.
    pub fn run(
        &self,
        input_path: &Path,
        options: &ConversionOptions,
        cancel: &CancelToken,
        notifier: &dyn Notifier,
    ) -> Result<Conversion> {
        self.run_slot(input_path, options, cancel, notifier, ProgressSlot::single())
            .map_err(|failure| failure.error)
    }

    pub(crate) fn run_slot(
        &self,
        input_path: &Path,
        options: &ConversionOptions,
        cancel: &CancelToken,
        notifier: &dyn Notifier,
        slot: ProgressSlot,
    ) -> std::result::Result<Conversion, FileFailure> {
        let unrenamed = |error: ConvertError| FileFailure {
            source: input_path.to_path_buf(),
            renamed_from: None,
            error,
        };
        cancel.check().map_err(unrenamed)?;
        self.report_progress(
            slot,
            0.0,
            &format!("Processing {}", display_name(input_path)),
        );

        // Stage 1: reconcile
        let source = SourceFile::inspect(input_path).map_err(unrenamed)?;
        let (source, reconciliation) = reconcile::reconcile(&source).map_err(unrenamed)?;
        let renamed_from = match reconciliation {
            Reconciliation::Renamed { from, .. } => Some(from),
            Reconciliation::Unchanged => None,
        };

        match self.convert_source(&source, options, cancel, notifier, slot) {
            Ok((output, report)) => Ok(Conversion {
                source: source.path,
                renamed_from,
                output,
                pages: report.pages_written,
                skipped_pages: report.skipped,
            }),
            Err(error) => Err(FileFailure {
                source: source.path,
                renamed_from,
                error,
            }),
        }
    }

    /// Stages 2-4 on an already reconciled source, inside a fresh working set
    /// that is removed whatever the outcome.
    fn convert_source(
        &self,
        source: &SourceFile,
        options: &ConversionOptions,
        cancel: &CancelToken,
        notifier: &dyn Notifier,
        slot: ProgressSlot,
    ) -> Result<(PathBuf, AssemblyReport)> {
        let work_root = options
            .work_root
            .clone()
            .unwrap_or_else(|| source.dir().to_path_buf());
        let work = WorkingSet::create_in(&work_root, &source.base_name)?;

        let name = display_name(&source.path);
        let outcome = self.run_stages(source, &work, options, cancel, notifier, slot);

        let work_dir = work.root().to_path_buf();
        if let Err(e) = work.close() {
            log::warn!("Could not remove working set {}: {}", work_dir.display(), e);
            notifier.warning(&format!(
                "{}: scratch directory {} could not be removed: {}",
                name,
                work_dir.display(),
                e
            ));
        }
        outcome
    }

    fn run_stages(
        &self,
        source: &SourceFile,
        work: &WorkingSet,
        options: &ConversionOptions,
        cancel: &CancelToken,
        notifier: &dyn Notifier,
        slot: ProgressSlot,
    ) -> Result<(PathBuf, AssemblyReport)> {
        let plugin = self.input_plugin_for(source.declared).ok_or_else(|| {
            ConvertError::UnsupportedFormat(format!(
                "no extractor for {} ({})",
                source.declared,
                source.path.display()
            ))
        })?;

        let name = display_name(&source.path);

        // Stage 2: extract
        cancel.check()?;
        info!("Running {} on {}...", plugin.name(), source.path.display());
        self.report_progress(slot, 0.10, &format!("Extracting {}", name));
        plugin.extract(&source.path, &work.raw_dir(), options)?;

        // Stage 3: normalize
        cancel.check()?;
        info!("Running {}...", self.normalizer.name());
        self.report_progress(slot, 0.40, &format!("Normalizing pages of {}", name));
        let pages = self.normalizer.apply(work, options)?;
        if pages.is_empty() {
            return Err(ConvertError::NoImages(source.path.clone()));
        }
        info!("{} page(s) normalized", pages.len());

        // Stage 4: assemble
        cancel.check()?;
        let output = source.output_path();
        info!("Running {}...", self.output_plugin.name());
        self.report_progress(slot, 0.70, &format!("Assembling {}", output.display()));
        let report = self.output_plugin.convert(&pages, work, &output, options)?;

        for failure in &report.skipped {
            notifier.warning(&format!(
                "{}: page {} left out: {}",
                name, failure.number, failure.reason
            ));
        }

        self.report_progress(slot, 1.0, &format!("Finished {}", name));
        info!(
            "{} written ({} page(s))",
            output.display(),
            report.pages_written
        );
        Ok((output, report))
    }

    pub(crate) fn report_progress(&self, slot: ProgressSlot, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(slot.overall(fraction), message);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    input_plugins: Vec<Box<dyn InputPlugin>>,
    normalizer: Option<Box<dyn Transform>>,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            input_plugins: Vec::new(),
            normalizer: None,
            output_plugin: None,
            progress_reporter: None,
        }
    }

    pub fn input(mut self, plugin: Box<dyn InputPlugin>) -> Self {
        self.input_plugins.push(plugin);
        self
    }

    pub fn normalizer(mut self, transform: Box<dyn Transform>) -> Self {
        self.normalizer = Some(transform);
        self
    }

    pub fn output(mut self, plugin: Box<dyn OutputPlugin>) -> Self {
        self.output_plugin = Some(plugin);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let normalizer = self
            .normalizer
            .ok_or_else(|| ConvertError::Pipeline("No page normalizer specified".to_string()))?;
        let output_plugin = self
            .output_plugin
            .ok_or_else(|| ConvertError::Pipeline("No output plugin specified".to_string()))?;

        let mut pipeline = Pipeline::new(normalizer, output_plugin);
        for p in self.input_plugins {
            pipeline.add_input_plugin(p);
        }
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
