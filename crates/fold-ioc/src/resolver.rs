//! Synchronous resolution (`resolve`).
//!
//! Resolution never loads deferred providers: an identifier classified as
//! [`UnresolvedProvider`](Classification::UnresolvedProvider) must go through
//! [`make`](Container::make) first.

use std::any::Any;
use std::sync::Arc;

use crate::binding::{Arguments, Instance, downcast, instance};
use crate::classify::Classification;
use crate::container::Container;
use crate::error::{IocError, IocResult};
use crate::loader::Module;

/// Maximum depth of a dependency chain.
pub const MAX_RESOLUTION_DEPTH: usize = 100;

/// Identifiers currently being resolved along one branch.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionPath {
	stack: Vec<String>,
}

impl ResolutionPath {
	/// Returns the path extended with `identifier`.
	pub(crate) fn enter(&self, identifier: &str) -> IocResult<Self> {
		if self.stack.iter().any(|entry| entry == identifier) {
			let mut cycle = self.stack.clone();
			cycle.push(identifier.to_string());
			return Err(IocError::CircularDependency {
				identifier: identifier.to_string(),
				path: cycle.join(" -> "),
			});
		}
		if self.stack.len() >= MAX_RESOLUTION_DEPTH {
			return Err(IocError::MaxDepthExceeded(MAX_RESOLUTION_DEPTH));
		}

		let mut stack = self.stack.clone();
		stack.push(identifier.to_string());
		Ok(Self { stack })
	}
}

impl Container {
	/// Resolves `identifier` to a value.
	///
	/// - resolved bindings run their factory (dependencies first, in declared
	///   order); singletons return their cached value after the first call;
	/// - local and external modules return the loaded module value, with its
	///   hooks applied;
	/// - deferred providers are an [`IocError::Implementation`] error.
	pub fn resolve(&self, identifier: &str) -> IocResult<Instance> {
		self.resolve_in(identifier, &ResolutionPath::default())
	}

	/// Resolves `identifier` and downcasts the value to `T`.
	pub fn resolve_as<T: Any + Send + Sync>(&self, identifier: &str) -> IocResult<Arc<T>> {
		downcast(identifier, self.resolve(identifier)?)
	}

	pub(crate) fn resolve_in(&self, identifier: &str, parent: &ResolutionPath) -> IocResult<Instance> {
		self.resolve_canonical(&self.dealias(identifier), parent)
	}

	/// Resolves an identifier whose alias hop was already taken.
	pub(crate) fn resolve_canonical(
		&self,
		identifier: &str,
		parent: &ResolutionPath,
	) -> IocResult<Instance> {
		match self.classify_canonical(identifier) {
			Classification::UnresolvedProvider => Err(IocError::Implementation(format!(
				"'{identifier}' is a deferred provider and must be built with make before it can be resolved"
			))),
			Classification::Provider => self.resolve_binding(identifier, parent),
			Classification::LocalModule => {
				let module = self.load_local_module(identifier)?;
				module_value(identifier, module)
			}
			Classification::ExternalModule => {
				let module = self.load_module(identifier)?;
				module_value(identifier, module)
			}
		}
	}

	fn resolve_binding(&self, identifier: &str, parent: &ResolutionPath) -> IocResult<Instance> {
		let path = parent.enter(identifier)?;
		let binding = self.resolved_binding(identifier)?;

		let missing: Vec<String> = {
			let state = self.inner.registry.read();
			binding
				.dependencies()
				.iter()
				.filter(|dependency| !state.resolved.contains_key(&state.dealias(dependency)))
				.cloned()
				.collect()
		};
		if !missing.is_empty() {
			return Err(IocError::Dependency {
				identifier: identifier.to_string(),
				missing,
			});
		}

		binding.instantiate(|| {
			binding
				.dependencies()
				.iter()
				.map(|dependency| self.resolve_in(dependency, &path))
				.collect::<IocResult<Vec<_>>>()
				.map(Arguments::new)
		})
	}
}

/// Turns a loaded module into its resolved value, applying hooks in order.
pub(crate) fn module_value(identifier: &str, module: Module) -> IocResult<Instance> {
	match module {
		Module::Value { value, hooks } => hooks.iter().try_fold(value, |value, hook| {
			hook(value).map_err(|source| IocError::factory(identifier, source))
		}),
		Module::Class(class) => Ok(instance(class)),
		Module::Provider(provider) => Ok(instance(provider)),
	}
}
