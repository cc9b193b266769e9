//! Directory autoloading.
//!
//! Walks a source directory and maps every module file to a namespace: the
//! file path with the base path swapped for the root namespace and the
//! extension dropped. With base path `src` and root namespace `App`,
//! `src/Http/Users.rs` becomes `App/Http/Users`.

use std::path::{Component, Path};

use fold_ioc::AutoloadTable;
use fold_ioc::dump::{read_dump_file, write_dump_file};

use crate::registrar::{Registrar, RegistrarResult};

/// Builds the autoload table for every `extension` file under `directory`.
///
/// Entries are sorted by path. Walk failures (unreadable directories,
/// missing root) are returned as IO errors.
pub fn generate_directory_hash(
	directory: impl AsRef<Path>,
	base_path: impl AsRef<Path>,
	root_namespace: &str,
	extension: &str,
) -> RegistrarResult<AutoloadTable> {
	let base_path = base_path.as_ref();
	let mut hash = AutoloadTable::new();

	for entry in walkdir::WalkDir::new(directory.as_ref())
		.follow_links(true)
		.sort_by_file_name()
	{
		let entry = entry.map_err(std::io::Error::from)?;
		let path = entry.path();

		if !entry.file_type().is_file()
			|| path.extension().and_then(|s| s.to_str()) != Some(extension)
		{
			continue;
		}

		let namespace = namespace_for(path, base_path, root_namespace);
		tracing::trace!(%namespace, path = %path.display(), "autoload entry");
		hash.insert(namespace, path.to_string_lossy().into_owned());
	}

	Ok(hash)
}

fn namespace_for(path: &Path, base_path: &Path, root_namespace: &str) -> String {
	let stem = path.with_extension("");
	let (prefix, relative) = match stem.strip_prefix(base_path) {
		Ok(relative) => (Some(root_namespace), relative.to_path_buf()),
		Err(_) => (None, stem.clone()),
	};

	let segments = relative.components().filter_map(|component| match component {
		Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
		_ => None,
	});

	prefix
		.filter(|namespace| !namespace.is_empty())
		.map(String::from)
		.into_iter()
		.chain(segments)
		.collect::<Vec<_>>()
		.join("/")
}

/// Persists an autoload table as pretty JSON.
pub fn save_directory_dump(hash: &AutoloadTable, file: impl AsRef<Path>) -> RegistrarResult<()> {
	write_dump_file(hash, file)
}

/// Reads an autoload table written by [`save_directory_dump`].
pub fn load_directory_dump(file: impl AsRef<Path>) -> RegistrarResult<AutoloadTable> {
	read_dump_file(file)
}

impl Registrar {
	/// Walks `directory` and adds every module file to the container's
	/// autoload table. Returns the number of entries added.
	pub fn autoload(
		&self,
		directory: impl AsRef<Path>,
		base_path: impl AsRef<Path>,
		root_namespace: &str,
	) -> RegistrarResult<usize> {
		let extension = self.container().settings().autoload.extension.clone();
		let hash = generate_directory_hash(directory, base_path, root_namespace, &extension)?;
		let count = hash.len();
		for (namespace, path) in hash {
			self.container().dump(namespace, path);
		}
		tracing::debug!(entries = count, "directory autoloaded");
		Ok(count)
	}

	/// Walks `directory` and writes the resulting autoload table to `target_file`.
	pub fn dump(
		&self,
		directory: impl AsRef<Path>,
		base_path: impl AsRef<Path>,
		root_namespace: &str,
		target_file: impl AsRef<Path>,
	) -> RegistrarResult<AutoloadTable> {
		let extension = self.container().settings().autoload.extension.clone();
		let hash = generate_directory_hash(directory, base_path, root_namespace, &extension)?;
		save_directory_dump(&hash, target_file)?;
		Ok(hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::path::PathBuf;

	#[rstest]
	#[case("src/Http/Users.rs", "src", "App", "App/Http/Users")]
	#[case("src/Users.rs", "src", "App", "App/Users")]
	#[case("src/Http/Users.rs", "src", "", "Http/Users")]
	#[case("lib/Users.rs", "src", "App", "lib/Users")]
	fn test_namespace_for(
		#[case] path: &str,
		#[case] base: &str,
		#[case] namespace: &str,
		#[case] expected: &str,
	) {
		assert_eq!(
			namespace_for(&PathBuf::from(path), Path::new(base), namespace),
			expected
		);
	}
}
