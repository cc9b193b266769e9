//! Identifier classification.
//!
//! Every identifier falls into exactly one [`Classification`], decided in
//! priority order: resolved binding, deferred provider, explicit autoload
//! entry, root-namespace prefix, and finally external module. One alias hop
//! is followed first.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::binding::Binding;
use crate::container::Container;
use crate::error::{IocError, IocResult};
use crate::loader::Module;

/// Category of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
	/// A resolved binding.
	Provider,
	/// A deferred provider, registered on first `make`.
	UnresolvedProvider,
	/// A module under the application's root namespace.
	LocalModule,
	/// Anything else, handed to the loader as-is.
	ExternalModule,
}

impl Classification {
	/// Upper-case label used in logs.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Provider => "PROVIDER",
			Self::UnresolvedProvider => "UNRESOLVED_PROVIDER",
			Self::LocalModule => "LOCAL_MODULE",
			Self::ExternalModule => "EXTERNAL_MODULE",
		}
	}
}

impl fmt::Display for Classification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Raw registry entry for a classified identifier.
#[derive(Debug, Clone)]
pub enum Fetched {
	/// The binding of a provider.
	Binding(Arc<Binding>),
	/// Module path of a deferred provider, not loaded.
	DeferredPath(String),
	/// A loaded local or external module.
	Module(Module),
}

impl Container {
	/// Classifies `identifier`, following one alias hop.
	pub fn classify(&self, identifier: &str) -> Classification {
		self.classify_canonical(&self.dealias(identifier))
	}

	pub(crate) fn classify_canonical(&self, identifier: &str) -> Classification {
		let state = self.inner.registry.read();
		if state.resolved.contains_key(identifier) {
			return Classification::Provider;
		}
		if state.deferred.contains_key(identifier) {
			return Classification::UnresolvedProvider;
		}
		if state.autoload.contains_key(identifier) {
			return Classification::LocalModule;
		}
		if let Some(namespace) = &self.inner.settings.autoload.namespace
			&& identifier.starts_with(namespace.as_str())
		{
			tracing::debug!(identifier, namespace = %namespace, "assumed autoload path");
			return Classification::LocalModule;
		}
		Classification::ExternalModule
	}

	/// Fetches the registry entry behind `identifier` for a given classification.
	pub fn fetch(&self, identifier: &str, classification: Classification) -> IocResult<Fetched> {
		let identifier = self.dealias(identifier);
		match classification {
			Classification::Provider => self.resolved_binding(&identifier).map(Fetched::Binding),
			Classification::UnresolvedProvider => {
				self.deferred_path(&identifier).map(Fetched::DeferredPath)
			}
			Classification::LocalModule => self.load_local_module(&identifier).map(Fetched::Module),
			Classification::ExternalModule => self.load_module(&identifier).map(Fetched::Module),
		}
	}

	pub(crate) fn resolved_binding(&self, identifier: &str) -> IocResult<Arc<Binding>> {
		self.inner
			.registry
			.read()
			.resolved
			.get(identifier)
			.cloned()
			.ok_or_else(|| {
				IocError::Loader(format!("unable to resolve {identifier} inside container"))
			})
	}

	pub(crate) fn deferred_path(&self, identifier: &str) -> IocResult<String> {
		self.inner
			.registry
			.read()
			.deferred
			.get(identifier)
			.filter(|path| !path.is_empty())
			.cloned()
			.ok_or_else(|| {
				IocError::Loader(format!("unable to find deferred provider path for {identifier}"))
			})
	}

	/// Module path of a local module: its explicit autoload entry, or the
	/// identifier with the root namespace replaced by the base path.
	pub fn local_module_path(&self, identifier: &str) -> String {
		if let Some(path) = self.inner.registry.read().autoload.get(identifier) {
			return path.clone();
		}

		let autoload = &self.inner.settings.autoload;
		let relative = autoload
			.namespace
			.as_deref()
			.and_then(|namespace| identifier.strip_prefix(namespace))
			.unwrap_or(identifier)
			.trim_start_matches('/');
		Path::new(&autoload.base_path)
			.join(relative)
			.to_string_lossy()
			.into_owned()
	}

	pub(crate) fn load_local_module(&self, identifier: &str) -> IocResult<Module> {
		let path = self.local_module_path(identifier);
		tracing::trace!(identifier, %path, "loading local module");
		self.load_module(&path)
	}
}
