/// Paie - persistence layer of a payroll dashboard for Guinean labor regulations.
///
/// The dashboard keeps employees, its company profile and salary calculations
/// in a hosted Supabase project. This crate is the gateway between the
/// dashboard and that backend.
///
/// # Architecture
///
/// The system uses:
/// - `gateway::PersistenceGateway` for user-scoped CRUD and the data export
/// - `store::TableStore` as the port to the tabular backend
/// - `clients::PostgrestClient` and `clients::AuthClient` for the Supabase REST and auth APIs
/// - `store::MemoryStore` as the in-process store used by tests
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use paie::clients::{AuthClient, PostgrestClient};
/// use paie::core::config::AppConfig;
/// use paie::core::session::SessionProvider;
/// use paie::gateway::PersistenceGateway;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     paie::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let session = AuthClient::new(&config)?.current_session().await?;
///     let gateway = PersistenceGateway::new(PostgrestClient::new(&config)?);
///
///     let outcome = gateway.get_employees(&session).await;
///     match outcome.error() {
///         None => println!("{} employees", outcome.payload().len()),
///         Some(error) => eprintln!("Error: {error}"),
///     }
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod clients;
pub mod core;
pub mod errors;
pub mod gateway;
pub mod store;

pub use errors::GatewayError;
pub use gateway::{Outcome, PersistenceGateway};

/// Configure structured logging with JSON output.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling it more
/// than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// paie::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
