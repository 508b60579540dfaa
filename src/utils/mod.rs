//! Utility functions and helpers.

pub mod http;

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Ensure a directory exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
