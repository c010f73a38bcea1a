use std::fs;
use std::path::{Path, PathBuf};

use mongoschema_core::{DeclarationGraph, DeclarationProvider};
use serde_json::Value;

use crate::errors::{DescriptorError, Result};
use crate::validate::{ValidatedDescriptor, validate_descriptor};

/// On-disk encoding of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Toml,
}

impl DescriptorFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(DescriptorFormat::Json),
            Some("toml") => Ok(DescriptorFormat::Toml),
            _ => Err(DescriptorError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse descriptor text into a JSON value; TOML is converted so both
/// formats share the same structural check.
pub fn parse_descriptor_value(text: &str, format: DescriptorFormat) -> Result<Value> {
    match format {
        DescriptorFormat::Json => Ok(serde_json::from_str(text)?),
        DescriptorFormat::Toml => {
            let value: toml::Value = toml::from_str(text)?;
            Ok(serde_json::to_value(value)?)
        }
    }
}

/// Declaration provider backed by a descriptor file.
#[derive(Debug, Clone)]
pub struct DescriptorProvider {
    path: PathBuf,
    format: DescriptorFormat,
    source: String,
}

impl DescriptorProvider {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = DescriptorFormat::from_path(&path)?;
        let source = path.display().to_string();
        Ok(Self {
            path,
            format,
            source,
        })
    }

    /// Read, check and map the descriptor. Warnings are logged and returned.
    pub fn load(&self) -> Result<ValidatedDescriptor> {
        let text = fs::read_to_string(&self.path)?;
        let value = parse_descriptor_value(&text, self.format)?;
        let validated = validate_descriptor(&value).map_err(DescriptorError::Invalid)?;

        for issue in &validated.warnings {
            tracing::warn!(
                event = "descriptor_warning",
                code = %issue.code,
                path = %issue.path,
                message = %issue.message
            );
        }
        tracing::debug!(
            event = "descriptor_loaded",
            path = %self.source,
            records = validated.descriptor.records.len(),
            enums = validated.descriptor.enums.len()
        );

        Ok(validated)
    }
}

impl DeclarationProvider for DescriptorProvider {
    type Error = DescriptorError;

    fn source(&self) -> &str {
        &self.source
    }

    fn declarations(&self) -> Result<DeclarationGraph> {
        Ok(self.load()?.graph)
    }
}
