//! Wiring for the `comic2pdf` binary: configuration, console notifier,
//! interrupt handling and the real plugin set.

pub mod config;
pub mod console;
pub mod interrupt;

use std::path::Path;

use comic_core::batch::{self, BatchSummary};
use comic_core::cancel::CancelToken;
use comic_core::error::{ConvertError, Result};
use comic_core::notify::Notifier;
use comic_core::options::ConversionOptions;
use comic_core::pipeline::{Pipeline, PipelineBuilder};
use comic_core::plugin::ProgressReporter;
use comic_input_cbr::CbrInputPlugin;
use comic_input_cbz::CbzInputPlugin;
use comic_input_pdf::PdfInputPlugin;
use comic_output_pdf::PdfOutputPlugin;
use comic_transforms::PageNormalizer;
use comic_utils::tools;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// 128 + SIGINT.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Fail if any configured tool is missing from `PATH`.
pub fn check_required_tools(options: &ConversionOptions) -> Result<()> {
    let missing = tools::missing_executables(&options.required_tools);
    if missing.is_empty() {
        return Ok(());
    }
    Err(ConvertError::Precondition(format!(
        "required tool(s) not found on PATH: {}",
        missing.join(", ")
    )))
}

/// Pipeline with every extractor, the page normalizer and the PDF assembler.
pub fn build_pipeline(
    options: &ConversionOptions,
    reporter: Option<ProgressReporter>,
) -> Result<Pipeline> {
    let mut builder = PipelineBuilder::new()
        .input(Box::new(PdfInputPlugin::detect()))
        .input(Box::new(CbzInputPlugin))
        .input(Box::new(CbrInputPlugin::detect(options)))
        .normalizer(Box::new(PageNormalizer))
        .output(Box::new(PdfOutputPlugin));
    if let Some(reporter) = reporter {
        builder = builder.progress_reporter(reporter);
    }
    builder.build()
}

/// Progress reporter that logs at `info`.
pub fn log_progress() -> ProgressReporter {
    Box::new(|frac, msg| {
        if frac < 1.0 {
            log::info!("[{:3.0}%] {}", frac * 100.0, msg);
        } else {
            log::info!("Done!");
        }
    })
}

/// Convert every comic in `dir`.
pub fn convert_directory(
    dir: &Path,
    options: &ConversionOptions,
    cancel: &CancelToken,
    notifier: &dyn Notifier,
    reporter: Option<ProgressReporter>,
) -> Result<BatchSummary> {
    let pipeline = build_pipeline(options, reporter)?;
    batch::run_batch(&pipeline, dir, options, cancel, notifier)
}

/// Process exit code for a finished or failed batch.
pub fn exit_code(outcome: &Result<BatchSummary>) -> i32 {
    match outcome {
        Ok(summary) if summary.cancelled => EXIT_INTERRUPTED,
        Ok(_) => EXIT_OK,
        Err(e) if e.is_cancelled() => EXIT_INTERRUPTED,
        Err(_) => EXIT_FAILURE,
    }
}
