//! Append-only sample log: one 4-space-indented JSON object per sample,
//! each followed by a newline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use crate::error::LogError;
use crate::sample::Sample;

pub struct SampleLogger {
    path: PathBuf,
}

impl SampleLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Open, append, close. The file is created on first use.
    pub fn append(&self, sample: &Sample) -> Result<(), LogError> {
        let mut buf = render(sample)?;
        buf.push(b'\n');
        let io_err = |source| LogError::Io { path: self.path.clone(), source };
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).map_err(io_err)?;
        file.write_all(&buf).map_err(io_err)?;
        debug!("appended {} bytes to {}", buf.len(), self.path.display());
        Ok(())
    }
}

pub fn render(sample: &Sample) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sample.serialize(&mut ser)?;
    Ok(buf)
}
