use std::io;
use std::path::{Path, PathBuf};

use mongoschema_emit::{EmitOptions, OutputLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mongoschema.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("toml decode error in {path}: {source}")]
    TomlDecode {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSettings {
    pub out_dir: PathBuf,
    /// Sub-directory of `out_dir` for per-record documents.
    pub schema_dir: PathBuf,
    pub document_suffix: String,
    pub aggregate_file: PathBuf,
    /// Fail the run when any record is deferred.
    pub strict: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("generated"),
            schema_dir: PathBuf::from("schema"),
            document_suffix: "Schema".to_string(),
            aggregate_file: PathBuf::from("generated_schemas.rs"),
            strict: false,
        }
    }
}

impl GeneratorSettings {
    /// Flags win over file values; `strict` can only be switched on.
    pub fn apply_overrides(&mut self, out_dir: Option<PathBuf>, strict: bool) {
        if let Some(out_dir) = out_dir {
            self.out_dir = out_dir;
        }
        self.strict |= strict;
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout {
            out_dir: self.out_dir.clone(),
            schema_dir: self.schema_dir.clone(),
            aggregate_file: self.aggregate_file.clone(),
        }
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            document_suffix: self.document_suffix.clone(),
        }
    }

    fn validate(self) -> SettingsResult<Self> {
        if self.document_suffix.contains(['/', '\\']) {
            return Err(SettingsError::Invalid(format!(
                "document_suffix must not contain path separators: {}",
                self.document_suffix
            )));
        }
        if self.aggregate_file.file_name().is_none() {
            return Err(SettingsError::Invalid(format!(
                "aggregate_file has no file name: {}",
                self.aggregate_file.display()
            )));
        }
        Ok(self)
    }
}

/// Load settings from `explicit`, or from [`DEFAULT_CONFIG_FILE`] when it
/// exists, or fall back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> SettingsResult<GeneratorSettings> {
    match explicit {
        Some(path) => read_settings(path),
        None => load_optional(Path::new(DEFAULT_CONFIG_FILE)),
    }
}

fn load_optional(path: &Path) -> SettingsResult<GeneratorSettings> {
    if path.exists() {
        read_settings(path)
    } else {
        Ok(GeneratorSettings::default())
    }
}

fn read_settings(path: &Path) -> SettingsResult<GeneratorSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: GeneratorSettings =
        toml::from_str(&content).map_err(|source| SettingsError::TomlDecode {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mongoschema.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let (_dir, path) = write_config("out_dir = \"build/schemas\"\nstrict = true\n");
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.out_dir, PathBuf::from("build/schemas"));
        assert!(settings.strict);
        assert_eq!(settings.document_suffix, "Schema");
        assert_eq!(settings.aggregate_file, PathBuf::from("generated_schemas.rs"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_optional(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(settings, GeneratorSettings::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_suffix() {
        let (_dir, path) = write_config("output = \"x\"\n");
        assert!(matches!(
            load_settings(Some(&path)),
            Err(SettingsError::TomlDecode { .. })
        ));

        let (_dir, path) = write_config("document_suffix = \"a/b\"\n");
        assert!(matches!(
            load_settings(Some(&path)),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn flags_override_file_values() {
        let mut settings = GeneratorSettings {
            strict: true,
            ..GeneratorSettings::default()
        };
        settings.apply_overrides(Some(PathBuf::from("out")), false);
        assert_eq!(settings.out_dir, PathBuf::from("out"));
        assert!(settings.strict);
        assert_eq!(
            settings.layout().document_path("UserSchema.json"),
            Path::new("out").join("schema").join("UserSchema.json")
        );
    }
}
