//! Container error types.
//!
//! Every failure raised by the registry, the classifier, the resolver and the
//! constructor is an [`IocError`]. Errors always surface to the immediate
//! caller; nothing is retried or swallowed by the container.

use std::sync::Arc;

use thiserror::Error;

/// Result type for container operations.
pub type IocResult<T> = Result<T, IocError>;

/// Container errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IocError {
	/// A binding or provider does not follow the expected contract.
	#[error("implementation error: {0}")]
	Implementation(String),

	/// A lookup missed for a classification that requires a value.
	#[error("loader error: {0}")]
	Loader(String),

	/// The module loader failed to load a path.
	#[error("unable to load module '{path}': {source}")]
	ModuleLoad {
		/// Path handed to the loader.
		path: String,
		/// Underlying load failure.
		#[source]
		source: anyhow::Error,
	},

	/// A `make` target is neither an identifier nor a constructible class.
	#[error("make error: {0}")]
	Make(String),

	/// Declared dependencies cannot be satisfied from the resolved bindings.
	#[error("unable to inject {} into '{identifier}'", .missing.join(" and "))]
	Dependency {
		/// Binding whose dependencies were requested.
		identifier: String,
		/// Dependencies that are not resolved bindings.
		missing: Vec<String>,
	},

	/// An identifier was requested while it was already being resolved.
	#[error("circular dependency detected for '{identifier}': {path}")]
	CircularDependency {
		/// Identifier that closed the cycle.
		identifier: String,
		/// Human-readable resolution path (`A -> B -> A`).
		path: String,
	},

	/// Resolution went deeper than the container allows.
	#[error("maximum resolution depth exceeded: {0}")]
	MaxDepthExceeded(usize),

	/// A factory, constructor, hook or provider step failed.
	#[error("factory for '{identifier}' failed: {source}")]
	Factory {
		/// Identifier (or class name) being built.
		identifier: String,
		/// Error returned by user code.
		#[source]
		source: anyhow::Error,
	},

	/// A resolved value is not of the requested type.
	#[error("'{identifier}' did not resolve to a value of type {expected}")]
	Downcast {
		/// Identifier that was resolved.
		identifier: String,
		/// Requested Rust type name.
		expected: &'static str,
	},

	/// Failure of a deferred registration awaited by several `make` branches.
	#[error(transparent)]
	Shared(Arc<IocError>),

	/// Invalid container settings.
	#[error("settings error: {0}")]
	Settings(String),

	/// IO error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// TOML parsing error.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Coarse error taxonomy, matching the kinds callers usually branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Invalid binding or provider, or synchronous use of a deferred provider.
	Implementation,
	/// Module could not be loaded or a registry lookup missed.
	Loader,
	/// A target could not be made.
	Make,
	/// Declared dependencies could not be satisfied.
	Dependency,
	/// Anything else (user code failures, IO, settings).
	Other,
}

impl IocError {
	/// Returns the coarse kind of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Implementation(_) => ErrorKind::Implementation,
			Self::Loader(_) | Self::ModuleLoad { .. } => ErrorKind::Loader,
			Self::Make(_) | Self::Downcast { .. } => ErrorKind::Make,
			Self::Dependency { .. }
			| Self::CircularDependency { .. }
			| Self::MaxDepthExceeded(_) => ErrorKind::Dependency,
			Self::Shared(error) => error.kind(),
			_ => ErrorKind::Other,
		}
	}

	/// Wraps a module loader failure.
	pub fn module_load(path: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
		Self::ModuleLoad {
			path: path.into(),
			source: source.into(),
		}
	}

	/// Wraps a failure raised by user code while building `identifier`.
	pub fn factory(identifier: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
		Self::Factory {
			identifier: identifier.into(),
			source: source.into(),
		}
	}
}
