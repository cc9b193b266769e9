//! Provider batch registration.

use fold_ioc::{Container, IocResult};

/// Result type for registrar operations.
pub type RegistrarResult<T> = IocResult<T>;

/// Registers service providers into a container at boot.
///
/// ```ignore
/// use fold_registrar::Registrar;
///
/// let registrar = Registrar::new(container.clone());
/// registrar
///     .register(
///         ["providers/app", "providers/config"],
///         [("App/Mail", "providers/mail")],
///     )
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Registrar {
	container: Container,
}

impl Registrar {
	/// Creates a registrar for `container`.
	pub fn new(container: Container) -> Self {
		Self { container }
	}

	/// Creates a registrar for the process-wide container.
	pub fn global() -> Self {
		Self::new(fold_ioc::global().clone())
	}

	/// The container providers are registered into.
	pub fn container(&self) -> &Container {
		&self.container
	}

	/// Registers a batch of providers.
	///
	/// 1. every `deferred` entry (`identifier -> provider path`) is stored with
	///    [`Container::later`];
	/// 2. every provider in `providers` is loaded and registered, one after the
	///    other, in list order;
	/// 3. one stabilization layer runs (see [`stabilize`](Self::stabilize)).
	///
	/// Registration is not transactional: a failing provider leaves the
	/// bindings of earlier providers in place.
	pub async fn register<P, PS, D, I, DS>(&self, providers: P, deferred: D) -> RegistrarResult<()>
	where
		P: IntoIterator<Item = PS>,
		PS: AsRef<str>,
		D: IntoIterator<Item = (I, DS)>,
		I: Into<String>,
		DS: Into<String>,
	{
		for (identifier, path) in deferred {
			self.container.later(identifier, path);
		}

		let mut registered = 0usize;
		for path in providers {
			self.container.register_provider_path(path.as_ref()).await?;
			registered += 1;
		}
		tracing::info!(providers = registered, "service providers registered");

		self.stabilize().await?;
		Ok(())
	}

	/// Registers the deferred providers that resolved bindings directly depend on.
	///
	/// Only one layer is processed: a deferred provider needed solely by
	/// another deferred provider stays deferred until the first `make`.
	/// Returns the identifiers whose providers were registered.
	pub async fn stabilize(&self) -> RegistrarResult<Vec<String>> {
		let pending = self.pending_deferred();
		if pending.is_empty() {
			return Ok(pending);
		}

		tracing::debug!(identifiers = ?pending, "stabilizing deferred dependencies");
		for (identifier, path) in self.deferred_paths(&pending) {
			tracing::debug!(%identifier, %path, "registering deferred provider");
			self.container.register_provider_path(&path).await?;
		}
		Ok(pending)
	}

	/// Dependencies of resolved bindings that are still deferred, in order of
	/// first appearance.
	pub fn pending_deferred(&self) -> Vec<String> {
		let resolved = self.container.resolved_providers();
		let deferred = self.container.unresolved_providers();

		let mut pending: Vec<String> = Vec::new();
		for dependency in resolved.values().flat_map(|binding| binding.dependencies()) {
			if resolved.contains_key(dependency)
				|| !deferred.contains_key(dependency)
				|| pending.contains(dependency)
			{
				continue;
			}
			pending.push(dependency.clone());
		}
		pending
	}

	fn deferred_paths(&self, identifiers: &[String]) -> Vec<(String, String)> {
		let deferred = self.container.unresolved_providers();
		identifiers
			.iter()
			.filter_map(|identifier| {
				deferred
					.get(identifier)
					.map(|path| (identifier.clone(), path.clone()))
			})
			.collect()
	}
}
