//! Constructible class-like values.
//!
//! A class is anything `make` can instantiate: it declares its dependencies
//! (see [`Introspect`]) and builds an instance from the positional values the
//! container resolved for them.

use std::fmt;
use std::sync::Arc;

use crate::binding::{Arguments, Instance};
use crate::introspect::{Introspect, Signature};

/// A constructible class-like value.
///
/// Implement it directly on a type, or use [`ClassDef`] for closure-based
/// definitions.
///
/// ```
/// use fold_ioc::binding::{Arguments, Instance, instance};
/// use fold_ioc::class::Class;
/// use fold_ioc::introspect::Introspect;
///
/// struct UserController;
///
/// impl Introspect for UserController {
///     fn parameters(&self) -> Vec<String> {
///         vec!["App_Services_UserService".to_string()]
///     }
/// }
///
/// impl Class for UserController {
///     fn name(&self) -> &str {
///         "UserController"
///     }
///
///     fn construct(&self, args: Arguments) -> anyhow::Result<Instance> {
///         Ok(instance(args.len()))
///     }
/// }
/// ```
pub trait Class: Introspect + Send + Sync {
	/// Name used in logs and errors.
	fn name(&self) -> &str;

	/// Builds an instance from resolved dependency values, in declared order.
	fn construct(&self, args: Arguments) -> anyhow::Result<Instance>;
}

/// Shared handle to a class.
pub type ClassRef = Arc<dyn Class>;

type ConstructorFn = dyn Fn(Arguments) -> anyhow::Result<Instance> + Send + Sync;

/// Closure-backed [`Class`].
///
/// ```
/// use fold_ioc::binding::instance;
/// use fold_ioc::class::ClassDef;
///
/// let user = ClassDef::new("User", |args| {
///     let redis = args.get::<String>(0)?;
///     Ok(instance(format!("user over {redis}")))
/// })
/// .params(["App_Redis"]);
///
/// assert_eq!(user.signature().dependencies(), vec!["App/Redis"]);
/// ```
#[derive(Clone)]
pub struct ClassDef {
	name: String,
	signature: Signature,
	constructor: Arc<ConstructorFn>,
}

impl ClassDef {
	/// Creates a class with no declared dependencies.
	pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
	where
		F: Fn(Arguments) -> anyhow::Result<Instance> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			signature: Signature::new(),
			constructor: Arc::new(constructor),
		}
	}

	/// Declares constructor parameter names.
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

	/// Wraps the definition into a shareable [`ClassRef`].
	pub fn into_ref(self) -> ClassRef {
		Arc::new(self)
	}
}

impl Introspect for ClassDef {
	fn inject(&self) -> Option<Vec<String>> {
		Introspect::inject(&self.signature)
	}

	fn parameters(&self) -> Vec<String> {
		Introspect::parameters(&self.signature)
	}
}

impl Class for ClassDef {
	fn name(&self) -> &str {
		&self.name
	}

	fn construct(&self, args: Arguments) -> anyhow::Result<Instance> {
		(self.constructor)(args)
	}
}

impl fmt::Debug for ClassDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassDef")
			.field("name", &self.name)
			.field("signature", &self.signature)
			.finish_non_exhaustive()
	}
}
