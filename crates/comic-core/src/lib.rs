//! Core types and orchestration for normalizing comic archives into PDF.

pub mod batch;
pub mod cancel;
pub mod error;
pub mod notify;
pub mod options;
pub mod page;
pub mod pipeline;
pub mod plugin;
pub mod reconcile;
pub mod source;
pub mod workspace;

#[cfg(test)]
mod testing;
