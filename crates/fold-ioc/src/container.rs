//! The IoC container.
//!
//! A [`Container`] is a cheap, cloneable handle to one registry. Services are
//! registered by name ([`bind`](Container::bind), [`singleton`](Container::singleton),
//! [`later`](Container::later)) and looked up with
//! [`resolve`](Container::resolve) or built with [`make`](Container::make).
//!
//! ```
//! use fold_ioc::prelude::*;
//!
//! let container = Container::new();
//! container.singleton("App/Redis", Factory::value("hredis".to_string())).unwrap();
//! container.alias("Redis", "App/Redis");
//!
//! let redis = container.resolve_as::<String>("Redis").unwrap();
//! assert_eq!(redis.as_str(), "hredis");
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::binding::{Binding, Factory};
use crate::dump::read_dump_file_or_default;
use crate::error::{IocError, IocResult};
use crate::loader::{FileModuleLoader, Module, ModuleLoader, StaticModuleLoader};
use crate::provider::ProviderRef;
use crate::registry::{AutoloadTable, Registry};
use crate::settings::IocSettings;

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// Returns the process-wide container.
///
/// Applications that want a single shared registry use this; tests and
/// libraries should prefer their own [`Container`].
pub fn global() -> &'static Container {
	&GLOBAL
}

/// Registration of a deferred provider, awaited by every concurrent `make`
/// of the same identifier.
pub(crate) type PendingRegistration = Shared<BoxFuture<'static, Result<(), Arc<IocError>>>>;

pub(crate) struct ContainerInner {
	pub(crate) registry: Registry,
	pub(crate) loader: Arc<dyn ModuleLoader>,
	pub(crate) settings: IocSettings,
	/// In-flight deferred registrations, by identifier.
	pub(crate) registering: Mutex<IndexMap<String, PendingRegistration>>,
}

/// Handle to a registry of named services.
#[derive(Clone)]
pub struct Container {
	pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
	/// Creates a container with default settings.
	///
	/// Modules are looked up among the [`submit_module!`](crate::submit_module)
	/// registrations first, then read as data files.
	pub fn new() -> Self {
		Self::from_parts(
			IocSettings::default(),
			default_loader(),
			AutoloadTable::new(),
		)
	}

	/// Starts building a container.
	pub fn builder() -> ContainerBuilder {
		ContainerBuilder::default()
	}

	fn from_parts(
		settings: IocSettings,
		loader: Arc<dyn ModuleLoader>,
		autoload: AutoloadTable,
	) -> Self {
		Self {
			inner: Arc::new(ContainerInner {
				registry: Registry::with_autoload(autoload),
				loader,
				settings,
				registering: Mutex::new(IndexMap::new()),
			}),
		}
	}

	/// Settings this container was built with.
	pub fn settings(&self) -> &IocSettings {
		&self.inner.settings
	}

	/// Module loader used for deferred providers and modules.
	pub fn loader(&self) -> &Arc<dyn ModuleLoader> {
		&self.inner.loader
	}

	/// Registers a transient binding: every resolution invokes the factory again.
	pub fn bind(&self, identifier: impl Into<String>, factory: Factory) -> IocResult<()> {
		self.insert_binding(identifier.into(), factory, false)
	}

	/// Registers a singleton binding: the first resolved value is cached and
	/// returned until [`clear`](Self::clear).
	pub fn singleton(&self, identifier: impl Into<String>, factory: Factory) -> IocResult<()> {
		self.insert_binding(identifier.into(), factory, true)
	}

	fn insert_binding(&self, identifier: String, factory: Factory, singleton: bool) -> IocResult<()> {
		if identifier.is_empty() {
			return Err(IocError::Implementation(
				"binding identifier must be a non-empty string".to_string(),
			));
		}

		let binding = Binding::new(identifier, factory, singleton);
		tracing::debug!(
			identifier = binding.identifier(),
			singleton,
			dependencies = ?binding.dependencies(),
			"binding registered"
		);
		self.inner.registry.insert_binding(binding);
		Ok(())
	}

	/// Registers a deferred provider: `identifier` is provided by the provider
	/// module at `module_path`, loaded and registered on first [`make`](Self::make).
	pub fn later(&self, identifier: impl Into<String>, module_path: impl Into<String>) {
		let identifier = identifier.into();
		let module_path = module_path.into();
		tracing::trace!(%identifier, %module_path, "deferred provider registered");
		self.inner.registry.insert_deferred(identifier, module_path);
	}

	/// Registers an alias. Aliases are followed exactly one hop.
	pub fn alias(&self, alias: impl Into<String>, identifier: impl Into<String>) {
		self.inner.registry.insert_alias(alias.into(), identifier.into());
	}

	/// Registers several aliases at once.
	pub fn aliases<I, A, B>(&self, pairs: I)
	where
		I: IntoIterator<Item = (A, B)>,
		A: Into<String>,
		B: Into<String>,
	{
		self.inner
			.registry
			.insert_aliases(pairs.into_iter().map(|(a, b)| (a.into(), b.into())).collect());
	}

	/// Adds one autoload entry mapping `namespace` to a module path.
	pub fn dump(&self, namespace: impl Into<String>, path: impl Into<String>) {
		self.inner.registry.insert_autoload(namespace.into(), path.into());
	}

	/// Forgets every binding, deferred provider, alias and autoload entry.
	pub fn clear(&self) {
		self.inner.registry.clear();
		tracing::debug!("container cleared");
	}

	/// Snapshot of the resolved bindings.
	pub fn resolved_providers(&self) -> IndexMap<String, Arc<Binding>> {
		self.inner.registry.read().resolved.clone()
	}

	/// Snapshot of the deferred providers (`identifier -> module path`).
	pub fn unresolved_providers(&self) -> IndexMap<String, String> {
		self.inner.registry.read().deferred.clone()
	}

	/// Snapshot of the alias table.
	pub fn aliases_table(&self) -> IndexMap<String, String> {
		self.inner.registry.read().aliases.clone()
	}

	/// Snapshot of the autoload table.
	pub fn autoload_table(&self) -> AutoloadTable {
		self.inner.registry.read().autoload.clone()
	}

	/// Returns the resolved binding registered under `identifier` (one alias hop).
	pub fn binding(&self, identifier: &str) -> Option<Arc<Binding>> {
		let state = self.inner.registry.read();
		let identifier = state.dealias(identifier);
		state.resolved.get(&identifier).cloned()
	}

	pub(crate) fn dealias(&self, identifier: &str) -> String {
		self.inner.registry.read().dealias(identifier)
	}

	/// Loads the module at `path` through the container's loader.
	pub fn load_module(&self, path: &str) -> IocResult<Module> {
		self.inner.loader.load(path)
	}

	/// Loads the module at `path`, which must be a provider.
	pub fn load_provider(&self, path: &str) -> IocResult<ProviderRef> {
		match self.load_module(path)? {
			Module::Provider(provider) => Ok(provider),
			other => Err(IocError::Implementation(format!(
				"module '{path}' is a {} and not a service provider",
				other.kind()
			))),
		}
	}

	/// Runs a provider's registration step against this container.
	pub async fn register_provider(&self, provider: &ProviderRef) -> IocResult<()> {
		provider.register(self).await
	}

	/// Loads the provider module at `path` and runs its registration step.
	pub async fn register_provider_path(&self, path: &str) -> IocResult<()> {
		let provider = self.load_provider(path)?;
		tracing::debug!(path, "registering provider");
		self.register_provider(&provider).await
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.registry.read();
		f.debug_struct("Container")
			.field("resolved", &state.resolved.keys().collect::<Vec<_>>())
			.field("deferred", &state.deferred)
			.field("aliases", &state.aliases)
			.field("autoload", &state.autoload.len())
			.finish_non_exhaustive()
	}
}

fn default_loader() -> Arc<dyn ModuleLoader> {
	Arc::new(StaticModuleLoader::with_submitted().with_fallback(Arc::new(FileModuleLoader::new())))
}

/// Builder for [`Container`].
///
/// ```
/// use std::sync::Arc;
/// use fold_ioc::prelude::*;
///
/// let loader = StaticModuleLoader::new();
/// loader.register_value("src/Http/Users", "Users".to_string());
///
/// let container = Container::builder()
///     .settings(IocSettings::default().with_namespace("App", "src"))
///     .loader(Arc::new(loader))
///     .build()
///     .unwrap();
///
/// assert_eq!(container.classify("App/Http/Users"), Classification::LocalModule);
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
	settings: IocSettings,
	loader: Option<Arc<dyn ModuleLoader>>,
}

impl ContainerBuilder {
	/// Sets the container settings.
	pub fn settings(mut self, settings: IocSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the module loader.
	pub fn loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
		self.loader = Some(loader);
		self
	}

	/// Builds the container, loading the configured autoload dump if any.
	pub fn build(self) -> IocResult<Container> {
		self.settings.validate()?;
		let autoload = match &self.settings.dump_file {
			Some(file) => read_dump_file_or_default(file)?,
			None => AutoloadTable::new(),
		};
		let loader = self.loader.unwrap_or_else(default_loader);
		Ok(Container::from_parts(self.settings, loader, autoload))
	}
}

impl fmt::Debug for ContainerBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContainerBuilder")
			.field("settings", &self.settings)
			.field("loader", &self.loader.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binding::instance;

	#[test]
	fn test_empty_identifier_is_rejected() {
		let container = Container::new();
		let err = container.bind("", Factory::value(1u8)).unwrap_err();
		assert!(matches!(err, IocError::Implementation(_)));
		assert!(container.resolved_providers().is_empty());
	}

	#[test]
	fn test_binding_removes_deferred_entry() {
		// Arrange
		let container = Container::new();
		container.later("App/Redis", "providers/redis");

		// Act
		container.bind("App/Redis", Factory::new(|_| Ok(instance(1u8)))).unwrap();

		// Assert
		assert!(container.unresolved_providers().is_empty());
		assert!(container.binding("App/Redis").is_some());
	}

	#[test]
	fn test_snapshots_are_detached() {
		let container = Container::new();
		container.alias("Redis", "App/Redis");
		let snapshot = container.aliases_table();
		container.clear();
		assert_eq!(snapshot.get("Redis").map(String::as_str), Some("App/Redis"));
		assert!(container.aliases_table().is_empty());
	}

	#[test]
	fn test_clones_share_registry() {
		let container = Container::new();
		let other = container.clone();
		other.dump("App/Users", "src/Users.rs");
		assert_eq!(container.autoload_table().len(), 1);
	}

	#[test]
	fn test_builder_loads_dump_file() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("autoload.json");
		std::fs::write(&file, r#"{"App/Http/Users": "src/Http/Users.rs"}"#).unwrap();

		// Act
		let container = Container::builder()
			.settings(IocSettings::default().with_dump_file(&file))
			.build()
			.unwrap();

		// Assert
		assert_eq!(
			container.autoload_table().get("App/Http/Users").map(String::as_str),
			Some("src/Http/Users.rs")
		);
	}

	#[test]
	fn test_builder_tolerates_missing_dump_file() {
		let dir = tempfile::tempdir().unwrap();
		let container = Container::builder()
			.settings(IocSettings::default().with_dump_file(dir.path().join("none.json")))
			.build()
			.unwrap();
		assert!(container.autoload_table().is_empty());
	}

	#[test]
	fn test_builder_rejects_empty_namespace() {
		let err = Container::builder()
			.settings(IocSettings::default().with_namespace("", "src"))
			.build()
			.unwrap_err();
		assert!(matches!(err, IocError::Settings(_)));
	}

	#[test]
	fn test_load_provider_rejects_values() {
		let loader = StaticModuleLoader::new();
		loader.register_value("providers/config", 1u8);
		let container = Container::builder()
			.loader(Arc::new(loader))
			.build()
			.unwrap();

		let err = container.load_provider("providers/config").err().unwrap();
		assert!(matches!(err, IocError::Implementation(_)));
	}
}
