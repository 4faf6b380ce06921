pub mod redact;
pub mod verify;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Read the given file, or everything from stdin when no file is named.
pub fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}
