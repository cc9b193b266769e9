//! Dependency introspection.
//!
//! Factories and classes carry their declared dependencies as queryable
//! metadata ([`Signature`]). The introspector turns that metadata into the
//! ordered list of identifiers the container has to resolve before invoking
//! the target.
//!
//! Two forms are supported:
//!
//! - an explicit inject list, always winning over the parameter list (an
//!   explicit empty list means "no dependencies");
//! - positional parameter names.
//!
//! In both, every `_` stands for a namespace separator (`App_Database`
//! resolves `App/Database`).
//!
//! ```
//! use fold_ioc::introspect::{Signature, inspect};
//!
//! let signature = Signature::new().params(["App_Database", "App_Cache"]);
//! assert_eq!(inspect(&signature), vec!["App/Database", "App/Cache"]);
//!
//! let explicit = signature.clone().inject(Vec::<String>::new());
//! assert!(inspect(&explicit).is_empty());
//! ```

/// Separator that parameter names use in place of `/`.
const PARAMETER_SEPARATOR: char = '_';

/// Namespace separator used by identifiers.
const NAMESPACE_SEPARATOR: char = '/';

/// Declared-dependency metadata of a factory or class.
pub trait Introspect {
	/// Explicit inject list. When present it fully overrides [`parameters`](Self::parameters).
	fn inject(&self) -> Option<Vec<String>> {
		None
	}

	/// Positional parameter names, in declaration order.
	fn parameters(&self) -> Vec<String> {
		Vec::new()
	}
}

/// Returns the ordered dependency identifiers declared by `target`.
pub fn inspect<T: Introspect + ?Sized>(target: &T) -> Vec<String> {
	let names = target.inject().unwrap_or_else(|| target.parameters());
	names.iter().map(|name| parameter_to_identifier(name)).collect()
}

/// Converts a parameter name into the identifier it stands for.
pub fn parameter_to_identifier(name: &str) -> String {
	name.replace(PARAMETER_SEPARATOR, &NAMESPACE_SEPARATOR.to_string())
}

/// Splits a textual parameter list (`"App_Redis, App_Cache"`) into names.
pub fn parse_parameter_list(text: &str) -> Vec<String> {
	text.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|part| !part.is_empty())
		.map(String::from)
		.collect()
}

/// Queryable declared-dependency slot shared by factories and classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
	inject: Option<Vec<String>>,
	parameters: Vec<String>,
}

impl Signature {
	/// Creates an empty signature (no parameters, no inject list).
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the positional parameter names.
	pub fn params<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.parameters = names.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the positional parameter names from a textual parameter list.
	pub fn params_str(self, text: &str) -> Self {
		self.params(parse_parameter_list(text))
	}

	/// Sets the explicit inject list.
	pub fn inject<I, S>(mut self, identifiers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.inject = Some(identifiers.into_iter().map(Into::into).collect());
		self
	}

	/// Returns the dependencies this signature declares.
	pub fn dependencies(&self) -> Vec<String> {
		inspect(self)
	}
}

impl Introspect for Signature {
	fn inject(&self) -> Option<Vec<String>> {
		self.inject.clone()
	}

	fn parameters(&self) -> Vec<String> {
		self.parameters.clone()
	}
}
