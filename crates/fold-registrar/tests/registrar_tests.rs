//! Registrar integration tests

use async_trait::async_trait;
use fold_ioc::prelude::*;
use fold_registrar::{Registrar, generate_directory_hash, load_directory_dump};
use rstest::*;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider binding a singleton, optionally requiring a dependency.
struct SingletonProvider {
	identifier: &'static str,
	dependency: Option<&'static str>,
}

#[async_trait]
impl ServiceProvider for SingletonProvider {
	async fn register(&self, container: &Container) -> IocResult<()> {
		let identifier = self.identifier;
		let factory = Factory::new(move |_| Ok(instance(identifier.to_string())));
		let factory = match self.dependency {
			Some(dependency) => factory.inject([dependency]),
			None => factory,
		};
		container.singleton(identifier, factory)
	}
}

/// Provider that reads a binding made by an earlier provider.
struct ReadingProvider {
	seen: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceProvider for ReadingProvider {
	async fn register(&self, container: &Container) -> IocResult<()> {
		if container.binding("App/Config").is_some() {
			self.seen.fetch_add(1, Ordering::SeqCst);
		}
		Ok(())
	}
}

/// Provider that always fails.
struct FailingProvider;

#[async_trait]
impl ServiceProvider for FailingProvider {
	async fn register(&self, _container: &Container) -> IocResult<()> {
		Err(IocError::Implementation("provider misconfigured".to_string()))
	}
}

fn provide(loader: &StaticModuleLoader, path: &str, identifier: &'static str, dependency: Option<&'static str>) {
	loader.register(path, move || {
		Ok(Module::provider(SingletonProvider {
			identifier,
			dependency,
		}))
	});
}

fn registrar_with(loader: StaticModuleLoader) -> Registrar {
	let container = Container::builder()
		.loader(Arc::new(loader))
		.build()
		.unwrap();
	Registrar::new(container)
}

/// Test providers are registered and deferred entries stored
#[rstest]
#[tokio::test]
async fn test_register_batch() {
	// Arrange
	let loader = StaticModuleLoader::new();
	provide(&loader, "providers/config", "App/Config", None);
	provide(&loader, "providers/redis", "App/Redis", None);
	let registrar = registrar_with(loader);

	// Act
	registrar
		.register(
			["providers/config", "providers/redis"],
			[("App/Mail", "providers/mail")],
		)
		.await
		.unwrap();

	// Assert
	let container = registrar.container();
	assert_eq!(
		container.resolved_providers().keys().collect::<Vec<_>>(),
		vec!["App/Config", "App/Redis"]
	);
	assert_eq!(
		container.unresolved_providers().get("App/Mail").map(String::as_str),
		Some("providers/mail")
	);
}

/// Test later providers see bindings made by earlier providers
#[rstest]
#[tokio::test]
async fn test_providers_registered_sequentially() {
	let seen = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&seen);
	let loader = StaticModuleLoader::new();
	provide(&loader, "providers/config", "App/Config", None);
	loader.register("providers/reader", move || {
		Ok(Module::provider(ReadingProvider {
			seen: Arc::clone(&counter),
		}))
	});
	let registrar = registrar_with(loader);

	registrar
		.register(["providers/config", "providers/reader"], Vec::<(String, String)>::new())
		.await
		.unwrap();

	assert_eq!(seen.load(Ordering::SeqCst), 1);
}

/// Test stabilization registers exactly one layer of deferred providers
#[rstest]
#[tokio::test]
async fn test_stabilization_is_single_layer() {
	// Arrange
	let loader = StaticModuleLoader::new();
	provide(&loader, "providers/app", "App/Controller", Some("App/Service"));
	provide(&loader, "providers/service", "App/Service", Some("App/Repository"));
	provide(&loader, "providers/repository", "App/Repository", None);
	let registrar = registrar_with(loader);

	// Act
	registrar
		.register(
			["providers/app"],
			[
				("App/Service", "providers/service"),
				("App/Repository", "providers/repository"),
			],
		)
		.await
		.unwrap();

	// Assert
	let container = registrar.container();
	assert_eq!(container.classify("App/Service"), Classification::Provider);
	assert_eq!(
		container.classify("App/Repository"),
		Classification::UnresolvedProvider
	);

	let controller = container.make_as::<String>("App/Controller").await.unwrap();
	assert_eq!(controller.as_str(), "App/Controller");
	assert!(container.unresolved_providers().is_empty());
}

/// Test a failing provider fails the batch but keeps earlier bindings
#[rstest]
#[tokio::test]
async fn test_failing_provider_is_not_rolled_back() {
	let loader = StaticModuleLoader::new();
	provide(&loader, "providers/config", "App/Config", None);
	loader.register("providers/broken", || Ok(Module::provider(FailingProvider)));
	let registrar = registrar_with(loader);

	let err = registrar
		.register(["providers/config", "providers/broken"], Vec::<(String, String)>::new())
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Implementation);
	assert!(registrar.container().binding("App/Config").is_some());
}

/// Test an unknown provider path is a loader error
#[rstest]
#[tokio::test]
async fn test_unknown_provider_path() {
	let registrar = registrar_with(StaticModuleLoader::new());

	let err = registrar
		.register(["providers/missing"], Vec::<(String, String)>::new())
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Loader);
}

#[fixture]
fn source_tree() -> tempfile::TempDir {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path().join("app");
	fs::create_dir_all(root.join("Http/Controllers")).unwrap();
	fs::create_dir_all(root.join("Services")).unwrap();
	fs::write(root.join("Http/Controllers/UserController.rs"), "").unwrap();
	fs::write(root.join("Services/UserService.rs"), "").unwrap();
	fs::write(root.join("Services/README.md"), "").unwrap();
	dir
}

/// Test the directory hash maps namespaces to module files
#[rstest]
fn test_generate_directory_hash(source_tree: tempfile::TempDir) {
	// Arrange
	let root = source_tree.path().join("app");

	// Act
	let hash = generate_directory_hash(&root, &root, "App", "rs").unwrap();

	// Assert
	assert_eq!(
		hash.keys().collect::<Vec<_>>(),
		vec!["App/Http/Controllers/UserController", "App/Services/UserService"]
	);
	let service = &hash["App/Services/UserService"];
	assert!(service.ends_with("UserService.rs"));
}

/// Test walking a missing directory is an IO error
#[rstest]
fn test_generate_directory_hash_missing_directory() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("nope");

	let err = generate_directory_hash(&missing, &missing, "App", "rs").unwrap_err();

	assert!(matches!(err, IocError::Io(_)));
}

/// Test autoload fills the container and classifies entries as local modules
#[rstest]
fn test_autoload_populates_container(source_tree: tempfile::TempDir) {
	let root = source_tree.path().join("app");
	let registrar = Registrar::new(Container::new());

	let added = registrar.autoload(&root, &root, "App").unwrap();

	assert_eq!(added, 2);
	assert_eq!(
		registrar.container().classify("App/Services/UserService"),
		Classification::LocalModule
	);
}

/// Test a dump written by the registrar boots a new container
#[rstest]
fn test_dump_and_boot_from_file(source_tree: tempfile::TempDir) {
	// Arrange
	let root = source_tree.path().join("app");
	let target = source_tree.path().join("storage/autoload.json");
	let registrar = Registrar::new(Container::new());

	// Act
	let hash = registrar.dump(&root, &root, "App", &target).unwrap();
	let container = Container::builder()
		.settings(IocSettings::default().with_dump_file(&target))
		.build()
		.unwrap();

	// Assert
	assert_eq!(load_directory_dump(&target).unwrap(), hash);
	assert_eq!(container.autoload_table(), hash);
	assert_eq!(
		container.classify("App/Http/Controllers/UserController"),
		Classification::LocalModule
	);
}
