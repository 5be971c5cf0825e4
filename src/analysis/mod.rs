//! Analysis module for exporting likelihood output.

pub mod export;

pub use export::{ExportManifest, ExportSystem};
