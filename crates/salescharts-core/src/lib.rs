pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod render;
pub mod reports;
pub mod theme;
pub mod warehouse;

pub use error::{ReportError, Result};
pub use reports::{ReportKind, ReportOutput};
