use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::emitter::EmittedArtifacts;
use crate::errors::{EmitError, Result};

/// Where artifacts land below the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub out_dir: PathBuf,
    /// Directory for per-record documents, relative to `out_dir`.
    pub schema_dir: PathBuf,
    /// File name of the aggregate module, relative to `out_dir`.
    pub aggregate_file: PathBuf,
}

impl OutputLayout {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            schema_dir: PathBuf::from("schema"),
            aggregate_file: PathBuf::from("generated_schemas.rs"),
        }
    }

    pub fn document_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(&self.schema_dir).join(file_name)
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.out_dir.join(&self.aggregate_file)
    }
}

/// Paths written by [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub documents: Vec<PathBuf>,
    pub aggregate: Option<PathBuf>,
}

pub fn write_artifacts(artifacts: &EmittedArtifacts, layout: &OutputLayout) -> Result<WrittenArtifacts> {
    let mut written = WrittenArtifacts::default();

    for document in &artifacts.documents {
        let path = layout.document_path(&document.file_name);
        write_bytes_atomic(&path, document.text.as_bytes())?;
        tracing::info!(
            event = "document_written",
            collection = %document.collection,
            path = %path.display()
        );
        written.documents.push(path);
    }

    if let Some(aggregate) = &artifacts.aggregate {
        let path = layout.aggregate_path();
        write_bytes_atomic(&path, aggregate.render_module().as_bytes())?;
        tracing::info!(
            event = "aggregate_written",
            entries = aggregate.entries().len(),
            path = %path.display()
        );
        written.aggregate = Some(path);
    }

    Ok(written)
}

pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = non_empty_parent(path) {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = non_empty_parent(path) {
        sync_dir(parent)?;
    }

    Ok(())
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| EmitError::InvalidPath(path.display().to_string()))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
