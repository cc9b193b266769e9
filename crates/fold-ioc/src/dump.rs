//! Persisted autoload tables.
//!
//! A dump is a pretty-printed JSON object mapping namespaces to module paths:
//!
//! ```json
//! {
//!   "App/Http/Users": "src/Http/Users.rs"
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::IocResult;
use crate::registry::AutoloadTable;

/// Writes `table` to `file` as pretty JSON, creating parent directories.
pub fn write_dump_file(table: &AutoloadTable, file: impl AsRef<Path>) -> IocResult<()> {
	let file = file.as_ref();
	if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	let json = serde_json::to_string_pretty(table)?;
	fs::write(file, json)?;
	tracing::debug!(file = %file.display(), entries = table.len(), "autoload dump written");
	Ok(())
}

/// Reads a dump written by [`write_dump_file`].
pub fn read_dump_file(file: impl AsRef<Path>) -> IocResult<AutoloadTable> {
	let contents = fs::read_to_string(file.as_ref())?;
	Ok(serde_json::from_str(&contents)?)
}

/// Like [`read_dump_file`], but a missing file yields an empty table.
pub fn read_dump_file_or_default(file: impl AsRef<Path>) -> IocResult<AutoloadTable> {
	let file = file.as_ref();
	match fs::read_to_string(file) {
		Ok(contents) => Ok(serde_json::from_str(&contents)?),
		Err(err) if err.kind() == ErrorKind::NotFound => {
			tracing::debug!(file = %file.display(), "autoload dump not found, starting empty");
			Ok(AutoloadTable::new())
		}
		Err(err) => Err(err.into()),
	}
}
