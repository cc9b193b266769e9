//! fold-registrar - Boot-time provider registration
//!
//! The [`Registrar`] registers a batch of service providers into a
//! [`Container`](fold_ioc::Container), then runs one stabilization layer:
//! deferred providers that the freshly resolved bindings directly depend on
//! are registered eagerly. Deeper deferred chains are left to
//! [`Container::make`](fold_ioc::Container::make), which registers them on
//! demand.
//!
//! It also builds autoload tables from source directories
//! ([`generate_directory_hash`]) and persists them as JSON dumps
//! ([`save_directory_dump`] / [`load_directory_dump`]).
//!
//! ```ignore
//! use fold_ioc::prelude::*;
//! use fold_registrar::Registrar;
//!
//! let container = Container::new();
//! let registrar = Registrar::new(container.clone());
//!
//! registrar.autoload("src/app", "src/app", "App")?;
//! registrar
//!     .register(["providers/app"], [("App/Mail", "providers/mail")])
//!     .await?;
//! ```

#![warn(missing_docs)]

pub mod autoload;
pub mod registrar;

pub use autoload::{generate_directory_hash, load_directory_dump, save_directory_dump};
pub use registrar::{Registrar, RegistrarResult};
