//! Ctrl-C handling.
//!
//! The first interrupt sets the batch's cancel token, so the current file
//! stops at the next stage boundary and nothing further is reported. A second
//! interrupt exits immediately.

use std::thread;

use comic_core::cancel::CancelToken;

use crate::EXIT_INTERRUPTED;

/// Listen for Ctrl-C on a background thread with its own runtime.
pub fn install(cancel: CancelToken) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::debug!("Ctrl-C listener unavailable: {}", e);
                    return;
                }
                log::debug!("Interrupt received, stopping");
                cancel.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(EXIT_INTERRUPTED);
                }
            })
        })?;
    Ok(())
}
