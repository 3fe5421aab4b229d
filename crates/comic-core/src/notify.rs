//! The user-facing side of a batch run.

use std::path::PathBuf;

/// Receives everything the user should see. Implementations decide how:
/// console lines, dialogs, or a test recorder.
pub trait Notifier {
    /// Processing cannot continue.
    fn error(&self, message: &str);

    /// Something went wrong for one file or page; the batch carries on.
    fn warning(&self, message: &str);

    /// Completion summaries and "nothing to do".
    fn info(&self, message: &str);

    /// Ask for an input directory. `None` means the user cancelled.
    fn pick_directory(&self) -> Option<PathBuf>;
}
