//! Transforms applied between extraction and assembly.

pub mod normalize;

pub use normalize::PageNormalizer;
