//! Container settings.
//!
//! ```toml
//! dump_file = "storage/autoload.json"
//!
//! [autoload]
//! namespace = "App"
//! base_path = "src"
//! extension = "rs"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{IocError, IocResult};

/// Default extension recognized by directory autoloading.
pub const DEFAULT_EXTENSION: &str = "rs";

/// Autoload settings: the root namespace mapped onto a base directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutoloadSettings {
	/// Root namespace. Identifiers starting with it are local modules.
	pub namespace: Option<String>,
	/// Directory the root namespace maps to.
	pub base_path: PathBuf,
	/// File extension recognized when walking a directory.
	pub extension: String,
}

impl Default for AutoloadSettings {
	fn default() -> Self {
		Self {
			namespace: None,
			base_path: PathBuf::from("."),
			extension: DEFAULT_EXTENSION.to_string(),
		}
	}
}

/// Container settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IocSettings {
	/// Autoload configuration.
	pub autoload: AutoloadSettings,
	/// Persisted autoload dump loaded when the container is built.
	pub dump_file: Option<PathBuf>,
}

impl IocSettings {
	/// Parses settings from a TOML document.
	pub fn from_toml_str(contents: &str) -> IocResult<Self> {
		let settings: Self = toml::from_str(contents)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> IocResult<Self> {
		let contents = std::fs::read_to_string(path.as_ref())?;
		Self::from_toml_str(&contents)
	}

	/// Sets the root namespace and its base directory.
	pub fn with_namespace(mut self, namespace: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
		self.autoload.namespace = Some(namespace.into());
		self.autoload.base_path = base_path.into();
		self
	}

	/// Rejects an empty root namespace, which every identifier would match.
	pub fn validate(&self) -> IocResult<()> {
		if self.autoload.namespace.as_deref() == Some("") {
			return Err(IocError::Settings(
				"autoload namespace must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Sets the dump file loaded at build time.
	pub fn with_dump_file(mut self, file: impl Into<PathBuf>) -> Self {
		self.dump_file = Some(file.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let settings = IocSettings::default();
		assert!(settings.autoload.namespace.is_none());
		assert_eq!(settings.autoload.base_path, PathBuf::from("."));
		assert_eq!(settings.autoload.extension, "rs");
		assert!(settings.dump_file.is_none());
	}

	#[test]
	fn test_from_toml_str_fills_missing_fields() {
		// Arrange
		let toml = r#"
			[autoload]
			namespace = "App"
			base_path = "src/app"
		"#;

		// Act
		let settings = IocSettings::from_toml_str(toml).unwrap();

		// Assert
		assert_eq!(settings.autoload.namespace.as_deref(), Some("App"));
		assert_eq!(settings.autoload.base_path, PathBuf::from("src/app"));
		assert_eq!(settings.autoload.extension, DEFAULT_EXTENSION);
	}

	#[test]
	fn test_from_toml_str_rejects_bad_types() {
		let err = IocSettings::from_toml_str("dump_file = 3").unwrap_err();
		assert!(matches!(err, IocError::Toml(_)));
	}

	#[test]
	fn test_empty_namespace_is_rejected() {
		let err = IocSettings::from_toml_str("[autoload]\nnamespace = \"\"\n").unwrap_err();
		assert!(matches!(err, IocError::Settings(_)));
		assert!(IocSettings::default().with_namespace("", "src").validate().is_err());
		assert!(IocSettings::default().with_namespace("App", "src").validate().is_ok());
	}

	#[test]
	fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("ioc.toml");
		std::fs::write(&path, "dump_file = \"autoload.json\"\n").unwrap();

		let settings = IocSettings::from_file(&path).unwrap();
		assert_eq!(settings.dump_file, Some(PathBuf::from("autoload.json")));
	}

	#[test]
	fn test_from_missing_file_is_io_error() {
		let err = IocSettings::from_file("/nonexistent/ioc.toml").unwrap_err();
		assert!(matches!(err, IocError::Io(_)));
	}
}
