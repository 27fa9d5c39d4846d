//! Hospital department load analyzer.
//!
//! A linear pipeline: load a visits CSV, count distinct patients per
//! department, attach the percentage split, render a bar chart, and derive
//! a short stats report. The CLI and the demo server are both thin
//! dispatchers over the same [`pipeline::Analyzer`] boundary.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod server;

pub use error::{AnalyzeError, Result};
