use std::env;
use std::path::PathBuf;

use crate::error::{ReportError, Result};

pub const DATABASE_URL_VARS: [&str; 2] = ["DATABASE_URL", "SALESCHARTS_DATABASE_URL"];

pub const DEFAULT_OUTPUT_DIR: &str = "charts";
pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 700;

/// Where the warehouse lives.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub database_url: String,
}

impl WarehouseConfig {
    /// Uses `explicit` when given, otherwise the first of `DATABASE_URL` /
    /// `SALESCHARTS_DATABASE_URL` that is set.
    pub fn resolve(explicit: Option<String>) -> Result<Self> {
        if let Some(database_url) = explicit {
            return Ok(Self { database_url });
        }

        DATABASE_URL_VARS
            .iter()
            .find_map(|name| env::var(name).ok())
            .map(|database_url| Self { database_url })
            .ok_or_else(|| {
                ReportError::Config(format!(
                    "{} (or {}) must be set",
                    DATABASE_URL_VARS[0], DATABASE_URL_VARS[1]
                ))
            })
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub write_csv: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            write_csv: false,
        }
    }
}

impl RenderConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
