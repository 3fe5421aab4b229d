//! Batch driver: run the pipeline over every candidate in a directory.
//!
//! Files are processed one at a time. A failure in one file is reported as a
//! warning and counted; the batch moves on. Only an unreadable directory or
//! cancellation stops it early.

use std::fs;
use std::path::{Path, PathBuf};

use comic_utils::fsutil;

use crate::cancel::CancelToken;
use crate::error::{ConvertError, Result};
use crate::notify::Notifier;
use crate::options::ConversionOptions;
use crate::pipeline::{Pipeline, ProgressSlot};
use crate::source::ComicFormat;

/// Tally of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub processed: usize,
    pub renamed: usize,
    pub failures: Vec<(PathBuf, String)>,
    pub cancelled: bool,
}

impl BatchSummary {
    /// Human-readable summary line.
    pub fn message(&self) -> String {
        let mut msg = format!(
            "Found {} file(s), converted {}.",
            self.found, self.processed
        );
        if self.renamed > 0 {
            msg.push_str(&format!(" Corrected {} extension(s).", self.renamed));
        }
        if !self.failures.is_empty() {
            msg.push_str(&format!(" {} failed.", self.failures.len()));
        }
        msg
    }
}

/// Files in `dir` (not recursive) with a recognised extension, sorted by path.
///
/// An unreadable or missing directory is a precondition failure.
pub fn find_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConvertError::Precondition(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let entries = fs::read_dir(dir).map_err(|e| {
        ConvertError::Precondition(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if ComicFormat::from_path(&path).is_some() {
            candidates.push(path);
        }
    }
    candidates.sort_by(|a, b| fsutil::natural_cmp_paths(a, b));
    Ok(candidates)
}

/// Convert every candidate in `dir`.
///
/// Emits one warning per failed file and a final info summary, unless the
/// run was cancelled, in which case nothing further is reported.
pub fn run_batch(
    pipeline: &Pipeline,
    dir: &Path,
    options: &ConversionOptions,
    cancel: &CancelToken,
    notifier: &dyn Notifier,
) -> Result<BatchSummary> {
    let candidates = find_candidates(dir)?;
    let mut summary = BatchSummary {
        found: candidates.len(),
        ..Default::default()
    };

    if candidates.is_empty() {
        notifier.info(&format!(
            "No .pdf, .cbz or .cbr files found in {}. Nothing to do.",
            dir.display()
        ));
        return Ok(summary);
    }

    log::info!("Found {} candidate file(s) in {}", summary.found, dir.display());

    for (index, path) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        if options.dry_run {
            report_plan(pipeline, path);
            continue;
        }

        let slot = ProgressSlot {
            index,
            total: candidates.len(),
        };
        match pipeline.run_slot(path, options, cancel, notifier, slot) {
            Ok(conversion) => {
                summary.processed += 1;
                if conversion.renamed_from.is_some() {
                    summary.renamed += 1;
                }
            }
            // Child tools die with the same interrupt, so any error after a
            // cancel request counts as the cancel itself.
            Err(failure) if failure.error.is_cancelled() || cancel.is_cancelled() => {
                summary.cancelled = true;
                break;
            }
            Err(failure) => {
                if failure.renamed_from.is_some() {
                    summary.renamed += 1;
                }
                log::warn!("{}: {}", failure.source.display(), failure.error);
                notifier.warning(&failure_message(&failure.source, &failure.error));
                summary
                    .failures
                    .push((failure.source, failure.error.to_string()));
            }
        }
    }

    if summary.cancelled {
        log::info!("Batch interrupted after {} file(s)", summary.processed);
        return Ok(summary);
    }

    if options.dry_run {
        notifier.info(&format!(
            "Dry run: {} file(s) would be converted.",
            summary.found
        ));
    } else {
        notifier.info(&summary.message());
    }
    Ok(summary)
}

fn report_plan(pipeline: &Pipeline, path: &Path) {
    match pipeline.plan(path) {
        Ok(plan) => {
            if let Some(ref to) = plan.rename_to {
                log::info!(
                    "[dry run] would rename {} to {} ({} content)",
                    path.display(),
                    to.display(),
                    plan.source.sniffed
                );
            }
            match plan.extractor {
                Some(name) => log::info!(
                    "[dry run] would extract {} with {} into {}",
                    path.display(),
                    name,
                    plan.output.display()
                ),
                None => log::warn!("[dry run] no extractor for {}", path.display()),
            }
        }
        Err(e) => log::warn!("[dry run] {}: {}", path.display(), e),
    }
}

fn failure_message(path: &Path, err: &ConvertError) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if err.is_no_content() {
        format!("{} was skipped: {}", name, err)
    } else {
        format!("{} could not be converted: {}", name, err)
    }
}
