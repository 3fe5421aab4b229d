//! Lookup of external command-line tools on the search path.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

/// Resolve `name` on `PATH`, returning the absolute path when found.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(PathBuf::from(first))
    }
}

/// Names from `required` that do not resolve on `PATH`.
pub fn missing_executables<S: AsRef<str>>(required: &[S]) -> Vec<String> {
    required
        .iter()
        .map(|s| s.as_ref())
        .filter(|name| find_executable(name).is_none())
        .map(str::to_string)
        .collect()
}

/// Signal number of an interactive interrupt (Ctrl-C).
#[cfg(unix)]
const SIGINT: i32 = 2;

/// True when the child was terminated by Ctrl-C rather than exiting on its
/// own. The terminal delivers the interrupt to the child too, often before
/// the parent's own handler has run.
#[cfg(unix)]
pub fn interrupted(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
pub fn interrupted(_status: &ExitStatus) -> bool {
    false
}

/// Last few non-empty lines of a process's stderr, joined for a log line.
pub fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join(" | ")
}
