//! Module loading.
//!
//! Identifiers that are not bindings resolve to *modules*: values produced by
//! a [`ModuleLoader`] for a path. Rust cannot load code from a path at
//! runtime, so modules are either registered up front
//! ([`StaticModuleLoader`], explicitly or at compile time through
//! [`submit_module!`](crate::submit_module)) or read as data files
//! ([`FileModuleLoader`]).
//!
//! ## Compile-time registration
//!
//! ```ignore
//! use fold_ioc::prelude::*;
//!
//! fold_ioc::submit_module!("providers/redis", || Module::provider(RedisProvider));
//!
//! let loader = StaticModuleLoader::with_submitted();
//! ```

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::binding::{Instance, instance};
use crate::class::{Class, ClassRef};
use crate::error::{IocError, IocResult};
use crate::provider::{ProviderRef, ServiceProvider};

/// Post-load transform step applied by the resolver to a module value.
pub type Hook = Arc<dyn Fn(Instance) -> anyhow::Result<Instance> + Send + Sync>;

/// A loaded module.
#[derive(Clone)]
pub enum Module {
	/// Plain value, plus the hooks the resolver applies (in order) before returning it.
	Value {
		/// Loaded value.
		value: Instance,
		/// Post-load transform steps.
		hooks: Vec<Hook>,
	},
	/// Constructible class.
	Class(ClassRef),
	/// Service provider.
	Provider(ProviderRef),
}

impl Module {
	/// Wraps a plain value.
	pub fn value<T: Any + Send + Sync>(value: T) -> Self {
		Self::Value {
			value: instance(value),
			hooks: Vec::new(),
		}
	}

	/// Wraps an already type-erased value.
	pub fn instance(value: Instance) -> Self {
		Self::Value {
			value,
			hooks: Vec::new(),
		}
	}

	/// Wraps a class.
	pub fn class(class: impl Class + 'static) -> Self {
		Self::Class(Arc::new(class))
	}

	/// Wraps a provider.
	pub fn provider(provider: impl ServiceProvider + 'static) -> Self {
		Self::Provider(Arc::new(provider))
	}

	/// Appends a post-load hook.
	///
	/// Classes and providers are first turned into plain values holding their
	/// [`ClassRef`] / [`ProviderRef`], so the hook receives that handle.
	pub fn hook<F>(self, hook: F) -> Self
	where
		F: Fn(Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
	{
		let (value, mut hooks) = match self {
			Self::Value { value, hooks } => (value, hooks),
			Self::Class(class) => (instance(class), Vec::new()),
			Self::Provider(provider) => (instance(provider), Vec::new()),
		};
		hooks.push(Arc::new(hook));
		Self::Value { value, hooks }
	}

	/// Short description of the module kind, for logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Value { .. } => "value",
			Self::Class(_) => "class",
			Self::Provider(_) => "provider",
		}
	}
}

impl fmt::Debug for Module {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value { hooks, .. } => f
				.debug_struct("Module::Value")
				.field("hooks", &hooks.len())
				.finish_non_exhaustive(),
			Self::Class(class) => f.debug_tuple("Module::Class").field(&class.name()).finish(),
			Self::Provider(_) => f.write_str("Module::Provider"),
		}
	}
}

/// Loads modules by path.
///
/// Implementations must report failures as [`IocError::ModuleLoad`] (see
/// [`IocError::module_load`]) rather than leaking their own error types.
pub trait ModuleLoader: Send + Sync {
	/// Loads the module at `path`.
	fn load(&self, path: &str) -> IocResult<Module>;
}

/// Builds a module on every load.
pub type ModuleBuilder = Arc<dyn Fn() -> anyhow::Result<Module> + Send + Sync>;

/// Compile-time module registration, collected with `inventory`.
pub struct ModuleRegistration {
	/// Module path.
	pub path: &'static str,
	/// Module builder.
	pub build: fn() -> Module,
}

inventory::collect!(ModuleRegistration);

/// Registers a module at compile time.
///
/// ```ignore
/// fold_ioc::submit_module!("app/Http/Users", || Module::value("Users"));
/// ```
#[macro_export]
macro_rules! submit_module {
	($path:expr, $build:expr $(,)?) => {
		$crate::inventory::submit! {
			$crate::loader::ModuleRegistration {
				path: $path,
				build: $build,
			}
		}
	};
}

/// In-memory loader: a table of module builders keyed by path.
///
/// Every `load` runs the builder again, so providers and values are fresh
/// per load. Unknown paths go to the fallback loader when one is set.
pub struct StaticModuleLoader {
	modules: RwLock<IndexMap<String, ModuleBuilder>>,
	fallback: Option<Arc<dyn ModuleLoader>>,
}

impl StaticModuleLoader {
	/// Creates an empty loader.
	pub fn new() -> Self {
		Self {
			modules: RwLock::new(IndexMap::new()),
			fallback: None,
		}
	}

	/// Creates a loader pre-populated with every [`submit_module!`](crate::submit_module) registration.
	pub fn with_submitted() -> Self {
		let loader = Self::new();
		for registration in inventory::iter::<ModuleRegistration> {
			let build = registration.build;
			loader.register(registration.path, move || Ok(build()));
		}
		loader
	}

	/// Sets the loader consulted for unknown paths.
	pub fn with_fallback(mut self, fallback: Arc<dyn ModuleLoader>) -> Self {
		self.fallback = Some(fallback);
		self
	}

	/// Registers a module builder under `path`, replacing any previous one.
	pub fn register<F>(&self, path: impl Into<String>, build: F)
	where
		F: Fn() -> anyhow::Result<Module> + Send + Sync + 'static,
	{
		self.modules.write().insert(path.into(), Arc::new(build));
	}

	/// Registers a provider type, instantiated with `Default` on each load.
	pub fn register_provider<P>(&self, path: impl Into<String>)
	where
		P: ServiceProvider + Default + 'static,
	{
		self.register(path, || Ok(Module::provider(P::default())));
	}

	/// Registers a plain value, cloned on each load.
	pub fn register_value<T>(&self, path: impl Into<String>, value: T)
	where
		T: Any + Send + Sync + Clone,
	{
		self.register(path, move || Ok(Module::value(value.clone())));
	}

	/// Returns `true` if a builder is registered for `path`.
	pub fn contains(&self, path: &str) -> bool {
		self.modules.read().contains_key(path)
	}
}

impl Default for StaticModuleLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ModuleLoader for StaticModuleLoader {
	fn load(&self, path: &str) -> IocResult<Module> {
		let builder = self.modules.read().get(path).cloned();
		match builder {
			Some(build) => {
				tracing::trace!(path, "building static module");
				build().map_err(|source| IocError::module_load(path, source))
			}
			None => match &self.fallback {
				Some(fallback) => fallback.load(path),
				None => Err(IocError::module_load(
					path,
					anyhow::anyhow!("cannot find module '{path}'"),
				)),
			},
		}
	}
}

impl fmt::Debug for StaticModuleLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StaticModuleLoader")
			.field("paths", &self.modules.read().keys().collect::<Vec<_>>())
			.field("fallback", &self.fallback.is_some())
			.finish()
	}
}

/// Extensions tried, in order, for paths given without one.
const DATA_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Loads data files as module values.
///
/// `.json` files become a `serde_json::Value`, `.toml` files a `toml::Value`,
/// anything else the file contents as a `String`. Paths without an extension
/// are tried with `.json` then `.toml`. Relative paths are resolved against
/// the root directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileModuleLoader {
	root: Option<PathBuf>,
}

impl FileModuleLoader {
	/// Creates a loader resolving relative paths against the working directory.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a loader resolving relative paths against `root`.
	pub fn with_root(root: impl Into<PathBuf>) -> Self {
		Self {
			root: Some(root.into()),
		}
	}

	fn locate(&self, path: &str) -> Option<PathBuf> {
		let requested = Path::new(path);
		let full = match &self.root {
			Some(root) if requested.is_relative() => root.join(requested),
			_ => requested.to_path_buf(),
		};

		if full.extension().is_some() && full.is_file() {
			return Some(full);
		}

		DATA_EXTENSIONS
			.iter()
			.map(|ext| {
				let mut candidate = full.clone().into_os_string();
				candidate.push(".");
				candidate.push(ext);
				PathBuf::from(candidate)
			})
			.find(|candidate| candidate.is_file())
	}

	fn parse(file: &Path) -> anyhow::Result<Instance> {
		let contents = std::fs::read_to_string(file)?;
		let value = match file.extension().and_then(|ext| ext.to_str()) {
			Some("json") => instance(serde_json::from_str::<serde_json::Value>(&contents)?),
			Some("toml") => instance(toml::from_str::<toml::Value>(&contents)?),
			_ => instance(contents),
		};
		Ok(value)
	}
}

impl ModuleLoader for FileModuleLoader {
	fn load(&self, path: &str) -> IocResult<Module> {
		let file = self.locate(path).ok_or_else(|| {
			IocError::module_load(path, anyhow::anyhow!("cannot find module '{path}'"))
		})?;

		tracing::trace!(path, file = %file.display(), "loading data module");
		Self::parse(&file)
			.map(Module::instance)
			.map_err(|source| IocError::module_load(path, source))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binding::downcast;
	use std::fs;

	#[test]
	fn test_static_loader_builds_fresh_module_per_load() {
		// Arrange
		let loader = StaticModuleLoader::new();
		loader.register_value("app/Http/Users", "Users".to_string());

		// Act
		let first = loader.load("app/Http/Users").unwrap();
		let second = loader.load("app/Http/Users").unwrap();

		// Assert
		let (Module::Value { value: a, .. }, Module::Value { value: b, .. }) = (first, second) else {
			panic!("expected value modules");
		};
		assert!(!Arc::ptr_eq(&a, &b));
		assert_eq!(*downcast::<String>("app/Http/Users", a).unwrap(), "Users");
	}

	#[test]
	fn test_static_loader_unknown_path_is_module_load_error() {
		let loader = StaticModuleLoader::new();
		let err = loader.load("somemodule").unwrap_err();
		assert!(matches!(err, IocError::ModuleLoad { ref path, .. } if path == "somemodule"));
	}

	#[test]
	fn test_static_loader_wraps_builder_failure() {
		let loader = StaticModuleLoader::new();
		loader.register("app/broken", || anyhow::bail!("syntax error at broken:3"));
		let err = loader.load("app/broken").unwrap_err();
		assert!(err.to_string().contains("broken:3"));
	}

	#[test]
	fn test_static_loader_falls_back() {
		let fallback = StaticModuleLoader::new();
		fallback.register_value("lodash", 42u32);
		let loader = StaticModuleLoader::new().with_fallback(Arc::new(fallback));
		assert!(!loader.contains("lodash"));
		assert!(matches!(loader.load("lodash").unwrap(), Module::Value { .. }));
	}

	#[test]
	fn test_hook_converts_class_into_value() {
		let class = crate::class::ClassDef::new("Users", |_| Ok(instance(())));
		let module = Module::class(class).hook(Ok);
		assert_eq!(module.kind(), "value");
	}

	#[test]
	fn test_file_loader_reads_json_without_extension() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir_all(dir.path().join("config")).unwrap();
		fs::write(
			dir.path().join("config/database.json"),
			r#"{"client": "mysql"}"#,
		)
		.unwrap();
		let loader = FileModuleLoader::with_root(dir.path());

		// Act
		let module = loader.load("config/database").unwrap();

		// Assert
		let Module::Value { value, .. } = module else {
			panic!("expected a value module");
		};
		let json = downcast::<serde_json::Value>("config/database", value).unwrap();
		assert_eq!(json["client"], "mysql");
	}

	#[test]
	fn test_file_loader_reads_toml() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("cache.toml");
		fs::write(&file, "driver = \"redis\"\n").unwrap();
		let loader = FileModuleLoader::new();

		let Module::Value { value, .. } = loader.load(file.to_str().unwrap()).unwrap() else {
			panic!("expected a value module");
		};
		let table = downcast::<toml::Value>("cache", value).unwrap();
		assert_eq!(table.get("driver").and_then(|v| v.as_str()), Some("redis"));
	}

	#[test]
	fn test_file_loader_wraps_parse_errors() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
		let loader = FileModuleLoader::with_root(dir.path());
		let err = loader.load("broken.json").unwrap_err();
		assert!(matches!(err, IocError::ModuleLoad { .. }));
	}

	#[test]
	fn test_file_loader_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let loader = FileModuleLoader::with_root(dir.path());
		assert!(matches!(
			loader.load("nothing/here").unwrap_err(),
			IocError::ModuleLoad { .. }
		));
	}
}
