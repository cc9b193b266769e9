//! End-to-end boot tests through the facade crate
#![cfg(feature = "registrar")]

use fold::prelude::*;
use rstest::*;

#[derive(Debug, Clone)]
struct Mailer {
	transport: String,
}

#[derive(Default)]
struct MailProvider;

#[async_trait]
impl ServiceProvider for MailProvider {
	async fn register(&self, container: &Container) -> IocResult<()> {
		container.singleton(
			"Boot/Mail",
			Factory::new(|args| {
				let transport = args.get::<String>(0)?;
				Ok(instance(Mailer {
					transport: (*transport).clone(),
				}))
			})
			.params(["Boot_Transport"]),
		)
	}
}

#[derive(Default)]
struct TransportProvider;

#[async_trait]
impl ServiceProvider for TransportProvider {
	async fn register(&self, container: &Container) -> IocResult<()> {
		container.singleton("Boot/Transport", Factory::value("smtp".to_string()))
	}
}

fold::prelude::submit_module!("boot/providers/mail", || Module::provider(MailProvider));
fold::prelude::submit_module!("boot/providers/transport", || {
	Module::provider(TransportProvider)
});

/// Test compile-time registered providers boot through the registrar
#[rstest]
#[tokio::test]
async fn test_boot_with_submitted_modules() {
	// Arrange
	let container = Container::new();
	let registrar = Registrar::new(container.clone());

	// Act
	registrar
		.register(
			["boot/providers/mail"],
			[("Boot/Transport", "boot/providers/transport")],
		)
		.await
		.unwrap();

	// Assert
	assert_eq!(container.classify("Boot/Transport"), Classification::Provider);
	let mailer = container.resolve_as::<Mailer>("Boot/Mail").unwrap();
	assert_eq!(mailer.transport, "smtp");
}

/// Test the submitted registrations are visible to a static loader
#[rstest]
fn test_submitted_modules_are_collected() {
	let loader = StaticModuleLoader::with_submitted();

	assert!(loader.contains("boot/providers/mail"));
	assert!(loader.contains("boot/providers/transport"));
}

/// Test the process-wide container is shared
#[rstest]
fn test_global_container_is_shared() {
	fold::global()
		.bind("Boot/GlobalFlag", Factory::value(true))
		.unwrap();

	assert!(fold::global().binding("Boot/GlobalFlag").is_some());
	assert!(Container::new().binding("Boot/GlobalFlag").is_none());
}
