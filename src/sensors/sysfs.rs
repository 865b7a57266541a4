//! Small helpers for reading single-value sysfs attributes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::SensorError;

/// Trimmed file contents, or `None` if the attribute does not exist.
pub fn read_attr(path: &Path) -> Result<Option<String>, SensorError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SensorError::Io { path: path.to_path_buf(), source }),
    }
}

pub fn read_value<T: FromStr>(path: &Path) -> Result<Option<T>, SensorError> {
    match read_attr(path)? {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| SensorError::Parse { path: path.to_path_buf(), value: s }),
    }
}

/// Entries of `dir`, sorted by name. A missing directory yields an empty list.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, SensorError> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(SensorError::Io { path: dir.to_path_buf(), source }),
    };
    let mut out: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    out.sort_by_key(|p| natural_key(p));
    Ok(out)
}

/// Sort key so `temp10` follows `temp2` and `card10` follows `card2`.
fn natural_key(p: &Path) -> (String, u64, String) {
    let name = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let prefix: String = name.chars().take_while(|c| !c.is_ascii_digit()).collect();
    let rest = &name[prefix.len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let n = digits.parse().unwrap_or(0);
    (prefix, n, rest[digits.len()..].to_string())
}

pub fn file_name(p: &Path) -> &str {
    p.file_name().and_then(|s| s.to_str()).unwrap_or("")
}
