//! Registry state: the four tables behind a container.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::binding::Binding;

/// Namespace to module path, as persisted in autoload dumps.
pub type AutoloadTable = IndexMap<String, String>;

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
	pub(crate) resolved: IndexMap<String, Arc<Binding>>,
	pub(crate) deferred: IndexMap<String, String>,
	pub(crate) aliases: IndexMap<String, String>,
	pub(crate) autoload: AutoloadTable,
}

impl RegistryState {
	/// Follows at most one alias hop.
	pub(crate) fn dealias(&self, identifier: &str) -> String {
		self.aliases
			.get(identifier)
			.cloned()
			.unwrap_or_else(|| identifier.to_string())
	}
}

/// All tables live under one lock so that `clear` is atomic.
#[derive(Debug, Default)]
pub(crate) struct Registry {
	state: RwLock<RegistryState>,
}

impl Registry {
	pub(crate) fn with_autoload(autoload: AutoloadTable) -> Self {
		Self {
			state: RwLock::new(RegistryState {
				autoload,
				..RegistryState::default()
			}),
		}
	}

	pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
		self.state.read()
	}

	pub(crate) fn insert_binding(&self, binding: Binding) {
		let identifier = binding.identifier().to_string();
		let mut state = self.state.write();
		state.deferred.shift_remove(&identifier);
		state.resolved.insert(identifier, Arc::new(binding));
	}

	pub(crate) fn insert_deferred(&self, identifier: String, path: String) {
		self.state.write().deferred.insert(identifier, path);
	}

	pub(crate) fn insert_alias(&self, alias: String, identifier: String) {
		self.state.write().aliases.insert(alias, identifier);
	}

	pub(crate) fn insert_aliases(&self, pairs: Vec<(String, String)>) {
		self.state.write().aliases.extend(pairs);
	}

	pub(crate) fn insert_autoload(&self, namespace: String, path: String) {
		self.state.write().autoload.insert(namespace, path);
	}

	pub(crate) fn clear(&self) {
		*self.state.write() = RegistryState::default();
	}
}
