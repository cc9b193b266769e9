//! # fold
//!
//! A name-based IoC container with deferred service providers.
//!
//! Services are registered under slash-separated identifiers and resolved by
//! name. Service providers can be registered eagerly at boot or deferred
//! until something first needs one of their bindings; directories can be
//! autoloaded so that identifiers under the application's root namespace map
//! onto module files.
//!
//! ## Feature Flags
//!
//! - `minimal` - Container only (bindings, deferred providers, `resolve`/`make`)
//! - `registrar` - Boot-time provider registration and directory autoloading
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```
//! use fold::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let container = Container::new();
//! container.singleton("App/Redis", Factory::value("hredis".to_string())).unwrap();
//!
//! let user = ClassDef::new("User", |args| {
//!     let redis = args.get::<String>(0)?;
//!     Ok(instance(format!("user over {redis}")))
//! })
//! .params(["App_Redis"]);
//!
//! let user = container.make_as::<String>(user).await.unwrap();
//! assert_eq!(user.as_str(), "user over hredis");
//! # });
//! ```

#[cfg(feature = "minimal")]
pub mod ioc;

#[cfg(feature = "registrar")]
pub mod registrar;

#[cfg(feature = "minimal")]
pub use fold_ioc::{
	Classification, Container, ContainerBuilder, Factory, IocError, IocResult, Module, global,
};

#[cfg(feature = "registrar")]
pub use fold_registrar::Registrar;

/// Re-export commonly used types.
pub mod prelude {
	#[cfg(feature = "minimal")]
	pub use fold_ioc::prelude::*;

	#[cfg(feature = "registrar")]
	pub use fold_registrar::{Registrar, RegistrarResult};
}
