// src/deploy/env_file.rs

//! `.env` materialisation.

use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::{DeploydError, Result};

/// Mode of the written env file: it usually holds secrets.
pub const ENV_FILE_MODE: u32 = 0o600;

/// Encode a JSON object as `KEY="value"` lines.
///
/// - blank keys, and keys containing `=` or whitespace, are skipped;
/// - `null` becomes an empty value, strings are taken verbatim and any other
///   value is written as its JSON text;
/// - backslashes, double quotes and newlines are escaped.
///
/// The result always ends with a newline.
pub fn encode_env(vars: &Map<String, Value>) -> String {
    let mut lines = Vec::with_capacity(vars.len());
    for (key, value) in vars {
        if key.trim().is_empty() {
            continue;
        }
        if key.contains('=') || key.chars().any(char::is_whitespace) {
            warn!(key = %key.escape_debug(), "skipping env key that cannot be written to .env");
            continue;
        }
        let raw = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("{key}=\"{}\"", escape_value(&raw)));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn escape_value(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Replace `path` with `data` in one step.
///
/// The data goes to a temporary file next to `path` first, so readers see
/// either the old or the new content, never a partial write. Parent
/// directories are created as needed.
pub fn atomic_write(path: &Path, data: &[u8], mode: u32) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        DeploydError::ConfigError(format!("{} has no parent directory", path.display()))
    })?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(Permissions::from_mode(mode))?;
    tmp.persist(path).map_err(|e| DeploydError::IoError(e.error))?;

    debug!(path = %path.display(), bytes = data.len(), "wrote file atomically");
    Ok(())
}
