//! Service providers.
//!
//! A provider is the unit of registration: when loaded, the container runs
//! its [`register`](ServiceProvider::register) step, which binds whatever the
//! provider offers. Registration may suspend (connect, read configuration...)
//! and is always awaited before the next provider of a batch runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Container;
use crate::error::IocResult;

/// A service provider module.
///
/// ```
/// use fold_ioc::prelude::*;
///
/// struct RedisProvider;
///
/// #[async_trait]
/// impl ServiceProvider for RedisProvider {
///     async fn register(&self, container: &Container) -> IocResult<()> {
///         container.singleton("Core/Redis", Factory::value("hredis".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceProvider: Send + Sync {
	/// Registers the provider's bindings. Providers without bindings keep the default.
	async fn register(&self, _container: &Container) -> IocResult<()> {
		Ok(())
	}
}

/// Shared handle to a provider.
pub type ProviderRef = Arc<dyn ServiceProvider>;
