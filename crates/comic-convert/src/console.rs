//! Terminal implementation of the user-facing notifier.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use comic_core::notify::Notifier;

/// Errors and warnings go to the log; info summaries go to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn error(&self, message: &str) {
        log::error!("{}", message);
    }

    fn warning(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn pick_directory(&self) -> Option<PathBuf> {
        prompt_directory(&mut io::stdin().lock(), &mut io::stderr())
    }
}

/// Ask for a directory on `output` and read one line from `input`.
///
/// An empty answer, EOF or a read error is a cancellation.
pub fn prompt_directory<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Option<PathBuf> {
    let _ = write!(output, "Directory containing PDF/CBZ/CBR files: ");
    let _ = output.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let answer = line.trim();
            if answer.is_empty() {
                None
            } else {
                Some(PathBuf::from(answer))
            }
        }
    }
}
