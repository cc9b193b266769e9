//! Asynchronous construction (`make`).
//!
//! `make` is `resolve` plus everything that may need to suspend: deferred
//! providers are loaded and registered on demand, dependencies are built
//! recursively (siblings concurrently) and classes are constructed from the
//! values of their declared dependencies.

use std::any::Any;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, try_join_all};

use crate::binding::{Arguments, Instance, downcast};
use crate::class::{ClassDef, ClassRef};
use crate::classify::Classification;
use crate::container::Container;
use crate::error::{IocError, IocResult};
use crate::introspect::inspect;
use crate::resolver::ResolutionPath;

/// Something [`make`](Container::make) can build.
#[derive(Clone)]
pub enum Target {
	/// A registry identifier.
	Id(String),
	/// A class, constructed directly.
	Class(ClassRef),
	/// An arbitrary value. Only values holding a [`ClassRef`] can be made.
	Value(Instance),
}

impl From<&str> for Target {
	fn from(identifier: &str) -> Self {
		Self::Id(identifier.to_string())
	}
}

impl From<String> for Target {
	fn from(identifier: String) -> Self {
		Self::Id(identifier)
	}
}

impl From<ClassRef> for Target {
	fn from(class: ClassRef) -> Self {
		Self::Class(class)
	}
}

impl From<ClassDef> for Target {
	fn from(class: ClassDef) -> Self {
		Self::Class(class.into_ref())
	}
}

impl From<Instance> for Target {
	fn from(value: Instance) -> Self {
		Self::Value(value)
	}
}

impl std::fmt::Debug for Target {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Id(identifier) => f.debug_tuple("Id").field(identifier).finish(),
			Self::Class(class) => f.debug_tuple("Class").field(&class.name()).finish(),
			Self::Value(_) => f.write_str("Value(..)"),
		}
	}
}

impl Container {
	/// Builds `target`.
	///
	/// - deferred providers are loaded and registered, then handled as bindings;
	/// - bindings have their dependencies made concurrently, then are resolved;
	/// - local modules are resolved and constructed as classes;
	/// - external modules are loaded and yield `None`;
	/// - classes are constructed from their made dependencies.
	///
	/// A [`Target::Value`] that is not a class fails before any work is done.
	///
	/// ```
	/// use fold_ioc::prelude::*;
	///
	/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
	/// let container = Container::new();
	/// container.singleton("App/Redis", Factory::value("hredis".to_string())).unwrap();
	///
	/// let user = ClassDef::new("User", |args| {
	///     let redis = args.get::<String>(0)?;
	///     Ok(instance(format!("user over {redis}")))
	/// })
	/// .params(["App_Redis"]);
	///
	/// let value = container.make_as::<String>(user).await.unwrap();
	/// assert_eq!(value.as_str(), "user over hredis");
	/// # });
	/// ```
	pub fn make(&self, target: impl Into<Target>) -> BoxFuture<'static, IocResult<Option<Instance>>> {
		self.make_in(target.into(), ResolutionPath::default())
	}

	/// Builds `target` and downcasts the value to `T`.
	pub async fn make_as<T: Any + Send + Sync>(&self, target: impl Into<Target>) -> IocResult<Arc<T>> {
		let target = target.into();
		let label = target_label(&target);
		match self.make(target).await? {
			Some(value) => downcast(&label, value),
			None => Err(IocError::Make(format!("'{label}' did not produce a value"))),
		}
	}

	pub(crate) fn make_in(
		&self,
		target: Target,
		parent: ResolutionPath,
	) -> BoxFuture<'static, IocResult<Option<Instance>>> {
		let container = self.clone();
		match target {
			Target::Id(identifier) => {
				async move { container.make_identifier(identifier, parent).await }.boxed()
			}
			Target::Class(class) => {
				async move { container.make_class(class, parent).await.map(Some) }.boxed()
			}
			Target::Value(value) => match value.downcast_ref::<ClassRef>() {
				Some(class) => {
					let class = Arc::clone(class);
					async move { container.make_class(class, parent).await.map(Some) }.boxed()
				}
				None => future::ready(Err(IocError::Make(
					"make expects an identifier or a class".to_string(),
				)))
				.boxed(),
			},
		}
	}

	async fn make_identifier(
		self,
		identifier: String,
		parent: ResolutionPath,
	) -> IocResult<Option<Instance>> {
		let identifier = self.dealias(&identifier);
		let classification = self.classify_canonical(&identifier);
		tracing::trace!(%identifier, %classification, "making");

		match classification {
			Classification::UnresolvedProvider => {
				self.register_deferred(&identifier).await?;
				self.make_binding(identifier, parent).await
			}
			Classification::Provider => self.make_binding(identifier, parent).await,
			Classification::LocalModule => {
				let value = self.resolve_canonical(&identifier, &parent)?;
				let class = value.downcast_ref::<ClassRef>().cloned().ok_or_else(|| {
					IocError::Make(format!("'{identifier}' is not a constructible class"))
				})?;
				let path = parent.enter(&identifier)?;
				self.make_class(class, path).await.map(Some)
			}
			Classification::ExternalModule => {
				self.load_module(&identifier)?;
				Ok(None)
			}
		}
	}

	/// Registers the deferred provider of `identifier`. Concurrent callers
	/// await the same registration, so the provider runs once.
	async fn register_deferred(&self, identifier: &str) -> IocResult<()> {
		let registration = {
			let mut registering = self.inner.registering.lock();
			match registering.get(identifier) {
				Some(registration) => registration.clone(),
				None => {
					// Another branch may have finished registering since classification.
					if !self.inner.registry.read().deferred.contains_key(identifier) {
						return Ok(());
					}
					let registration = self
						.clone()
						.run_deferred_registration(identifier.to_string())
						.boxed()
						.shared();
					registering.insert(identifier.to_string(), registration.clone());
					registration
				}
			}
		};

		registration
			.await
			.map_err(|error| Arc::try_unwrap(error).unwrap_or_else(IocError::Shared))
	}

	async fn run_deferred_registration(self, identifier: String) -> Result<(), Arc<IocError>> {
		let result: IocResult<()> = async {
			let module_path = self.deferred_path(&identifier)?;
			let provider = self.load_provider(&module_path)?;
			tracing::debug!(%identifier, %module_path, "registering deferred provider");
			self.register_provider(&provider).await
		}
		.await;

		self.inner.registering.lock().shift_remove(&identifier);
		result.map_err(Arc::new)
	}

	async fn make_binding(
		&self,
		identifier: String,
		parent: ResolutionPath,
	) -> IocResult<Option<Instance>> {
		let path = parent.enter(&identifier)?;
		let binding = self.resolved_binding(&identifier)?;

		try_join_all(
			binding
				.dependencies()
				.iter()
				.map(|dependency| self.make_in(Target::Id(dependency.clone()), path.clone())),
		)
		.await?;

		self.resolve_canonical(&identifier, &parent).map(Some)
	}

	async fn make_class(&self, class: ClassRef, path: ResolutionPath) -> IocResult<Instance> {
		let dependencies = inspect(&*class);
		let arguments = if dependencies.is_empty() {
			Arguments::default()
		} else {
			let values = try_join_all(dependencies.into_iter().map(|dependency| {
				let container = self.clone();
				let path = path.clone();
				async move {
					match container
						.make_in(Target::Id(dependency.clone()), path.clone())
						.await?
					{
						Some(value) => Ok(value),
						None => container.resolve_in(&dependency, &path),
					}
				}
			}))
			.await?;
			Arguments::new(values)
		};

		tracing::trace!(class = class.name(), arguments = arguments.len(), "constructing");
		class
			.construct(arguments)
			.map_err(|source| IocError::factory(class.name(), source))
	}
}

fn target_label(target: &Target) -> String {
	match target {
		Target::Id(identifier) => identifier.clone(),
		Target::Class(class) => class.name().to_string(),
		Target::Value(_) => "value".to_string(),
	}
}
