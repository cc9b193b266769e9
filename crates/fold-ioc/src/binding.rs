//! Bindings, factories and resolved instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{IocError, IocResult};
use crate::introspect::{Introspect, Signature};

/// A resolved value. Every binding, module and class resolves to one.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wraps a value into an [`Instance`].
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
	Arc::new(value)
}

/// Downcasts an instance, reporting the identifier on failure.
pub fn downcast<T: Any + Send + Sync>(identifier: &str, value: Instance) -> IocResult<Arc<T>> {
	value.downcast::<T>().map_err(|_| IocError::Downcast {
		identifier: identifier.to_string(),
		expected: std::any::type_name::<T>(),
	})
}

/// Positional dependency values handed to a factory or constructor.
#[derive(Clone, Default)]
pub struct Arguments {
	values: Vec<Instance>,
}

impl Arguments {
	/// Creates arguments from resolved values, in declared order.
	pub fn new(values: Vec<Instance>) -> Self {
		Self { values }
	}

	/// Number of arguments.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns `true` when no arguments were supplied.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the raw instance at `index`.
	pub fn raw(&self, index: usize) -> Option<&Instance> {
		self.values.get(index)
	}

	/// Returns the argument at `index` downcast to `T`.
	///
	/// ```
	/// use fold_ioc::binding::{Arguments, instance};
	///
	/// let args = Arguments::new(vec![instance("redis".to_string())]);
	/// assert_eq!(args.get::<String>(0).unwrap().as_str(), "redis");
	/// assert!(args.get::<u32>(0).is_err());
	/// assert!(args.get::<String>(1).is_err());
	/// ```
	pub fn get<T: Any + Send + Sync>(&self, index: usize) -> anyhow::Result<Arc<T>> {
		let value = self
			.values
			.get(index)
			.ok_or_else(|| anyhow::anyhow!("missing argument at position {index}"))?;
		value.clone().downcast::<T>().map_err(|_| {
			anyhow::anyhow!(
				"argument at position {index} is not a {}",
				std::any::type_name::<T>()
			)
		})
	}

	/// Consumes the arguments, returning the underlying values.
	pub fn into_vec(self) -> Vec<Instance> {
		self.values
	}
}

impl fmt::Debug for Arguments {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Arguments")
			.field("len", &self.values.len())
			.finish()
	}
}

type FactoryFn = dyn Fn(Arguments) -> anyhow::Result<Instance> + Send + Sync;

/// Factory logic of a binding: a callable plus its declared dependencies.
///
/// ```
/// use fold_ioc::binding::{Factory, instance};
///
/// let factory = Factory::new(|args| {
///     let redis = args.get::<String>(0)?;
///     Ok(instance(format!("cache over {redis}")))
/// })
/// .params(["App_Redis"]);
///
/// assert_eq!(factory.dependencies(), vec!["App/Redis"]);
/// ```
#[derive(Clone)]
pub struct Factory {
	call: Arc<FactoryFn>,
	signature: Signature,
}

impl Factory {
	/// Creates a factory with no declared dependencies.
	pub fn new<F>(call: F) -> Self
	where
		F: Fn(Arguments) -> anyhow::Result<Instance> + Send + Sync + 'static,
	{
		Self {
			call: Arc::new(call),
			signature: Signature::new(),
		}
	}

	/// Creates a factory that returns a clone of `value` on every call.
	pub fn value<T: Any + Send + Sync + Clone>(value: T) -> Self {
		Self::new(move |_| Ok(instance(value.clone())))
	}

	/// Declares positional parameter names (`App_Redis` for `App/Redis`).
	pub fn params<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.signature = self.signature.params(names);
		self
	}

	/// Declares an explicit inject list, overriding the parameter names.
	pub fn inject<I, S>(mut self, identifiers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.signature = self.signature.inject(identifiers);
		self
	}

	/// Returns the declared signature.
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	/// Returns the dependency identifiers declared by this factory.
	pub fn dependencies(&self) -> Vec<String> {
		self.signature.dependencies()
	}

	/// Invokes the factory with positional arguments.
	pub fn call(&self, args: Arguments) -> anyhow::Result<Instance> {
		(self.call)(args)
	}
}

impl Introspect for Factory {
	fn inject(&self) -> Option<Vec<String>> {
		Introspect::inject(&self.signature)
	}

	fn parameters(&self) -> Vec<String> {
		Introspect::parameters(&self.signature)
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Factory")
			.field("signature", &self.signature)
			.finish_non_exhaustive()
	}
}

/// A resolved binding stored in the container.
pub struct Binding {
	identifier: String,
	factory: Factory,
	dependencies: Vec<String>,
	singleton: bool,
	cached: OnceCell<Instance>,
}

impl Binding {
	pub(crate) fn new(identifier: String, factory: Factory, singleton: bool) -> Self {
		let dependencies = crate::introspect::inspect(&factory);
		Self {
			identifier,
			factory,
			dependencies,
			singleton,
			cached: OnceCell::new(),
		}
	}

	/// Identifier this binding is registered under.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Ordered dependency identifiers, computed at bind time.
	pub fn dependencies(&self) -> &[String] {
		&self.dependencies
	}

	/// Whether the first resolved value is cached for the registry's lifetime.
	pub fn is_singleton(&self) -> bool {
		self.singleton
	}

	/// Cached singleton instance, if it has been resolved.
	pub fn cached_instance(&self) -> Option<&Instance> {
		self.cached.get()
	}

	/// Invokes the factory, honoring the singleton cache.
	///
	/// `args` is only evaluated when a value must actually be produced.
	pub(crate) fn instantiate<F>(&self, args: F) -> IocResult<Instance>
	where
		F: FnOnce() -> IocResult<Arguments>,
	{
		let produce = || -> IocResult<Instance> {
			let args = args()?;
			self.factory
				.call(args)
				.map_err(|source| IocError::factory(&self.identifier, source))
		};

		if self.singleton {
			self.cached.get_or_try_init(produce).cloned()
		} else {
			produce()
		}
	}
}

impl fmt::Debug for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binding")
			.field("identifier", &self.identifier)
			.field("dependencies", &self.dependencies)
			.field("singleton", &self.singleton)
			.field("cached", &self.cached.get().is_some())
			.finish()
	}
}
