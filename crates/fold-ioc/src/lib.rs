//! fold-ioc - Name-based IoC container
//!
//! Services are registered under slash-separated identifiers
//! (`App/Http/Users`) and looked up by name. The container knows four kinds
//! of identifiers:
//!
//! - **Providers**: bindings with a factory, transient or singleton;
//! - **Unresolved providers**: deferred bindings whose provider module is
//!   loaded and registered on first [`make`](Container::make);
//! - **Local modules**: modules under the application's root namespace,
//!   located through the autoload table or the namespace-to-directory rule;
//! - **External modules**: everything else, handed to the module loader as-is.
//!
//! Dependencies are declared as metadata on factories and classes, either as
//! an explicit inject list or as positional parameter names where `_` stands
//! for `/` (`App_Redis` is `App/Redis`).
//!
//! # Quick Start
//!
//! ```
//! use fold_ioc::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let container = Container::new();
//!
//! container.singleton("App/Redis", Factory::value("hredis".to_string())).unwrap();
//! container
//!     .bind(
//!         "App/Cache",
//!         Factory::new(|args| {
//!             let redis = args.get::<String>(0)?;
//!             Ok(instance(format!("cache over {redis}")))
//!         })
//!         .params(["App_Redis"]),
//!     )
//!     .unwrap();
//!
//! let cache = container.make_as::<String>("App/Cache").await.unwrap();
//! assert_eq!(cache.as_str(), "cache over hredis");
//! # });
//! ```
//!
//! # Deferred Providers
//!
//! ```ignore
//! use fold_ioc::prelude::*;
//!
//! #[derive(Default)]
//! struct RedisProvider;
//!
//! #[async_trait]
//! impl ServiceProvider for RedisProvider {
//!     async fn register(&self, container: &Container) -> IocResult<()> {
//!         container.singleton("App/Redis", Factory::value("hredis".to_string()))
//!     }
//! }
//!
//! fold_ioc::submit_module!("providers/redis", || Module::provider(RedisProvider));
//!
//! let container = Container::new();
//! container.later("App/Redis", "providers/redis");
//! let redis = container.make("App/Redis").await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │             Container              │
//! │  resolved | deferred | aliases |   │
//! │  autoload (one lock)               │
//! └─────────────────┬──────────────────┘
//!                   │ classify
//!     ┌─────────────┼──────────────┐
//!     │             │              │
//! ┌───▼────┐   ┌────▼───┐    ┌─────▼──────┐
//! │resolve │   │  make  │    │ModuleLoader│
//! └────────┘   └────────┘    └────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod binding;
pub mod class;
pub mod classify;
pub mod container;
pub mod dump;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod make;
pub mod provider;
mod registry;
pub mod resolver;
pub mod settings;

pub use binding::{Arguments, Binding, Factory, Instance, instance};
pub use class::{Class, ClassDef, ClassRef};
pub use classify::{Classification, Fetched};
pub use container::{Container, ContainerBuilder, global};
pub use error::{ErrorKind, IocError, IocResult};
pub use introspect::{Introspect, Signature, inspect};
pub use loader::{FileModuleLoader, Hook, Module, ModuleLoader, StaticModuleLoader};
pub use make::Target;
pub use provider::{ProviderRef, ServiceProvider};
pub use registry::AutoloadTable;
pub use settings::{AutoloadSettings, IocSettings};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::binding::{Arguments, Factory, Instance, downcast, instance};
	pub use crate::class::{Class, ClassDef, ClassRef};
	pub use crate::classify::{Classification, Fetched};
	pub use crate::container::{Container, ContainerBuilder, global};
	pub use crate::error::{ErrorKind, IocError, IocResult};
	pub use crate::introspect::{Introspect, Signature, inspect};
	pub use crate::loader::{FileModuleLoader, Module, ModuleLoader, StaticModuleLoader};
	pub use crate::make::Target;
	pub use crate::provider::{ProviderRef, ServiceProvider};
	pub use crate::settings::{AutoloadSettings, IocSettings};
	pub use crate::submit_module;

	pub use async_trait::async_trait;
}

// Re-export inventory for compile-time module registration
pub use inventory;
