/// guest-credentials - resolve anonymous Cognito credentials from the command line
///
/// Reads configuration from the environment (and `.env`), resolves
/// credentials through the configured store and prints them as JSON.
/// Exits non-zero when no credentials could be obtained.

use anyhow::Context;
use guest_credentials::{metrics, storage, CredentialResolver, ResolverConfig, StoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ResolverConfig::from_env().context("Invalid resolver configuration")?;
    let store_config = StoreConfig::from_env().context("Invalid store configuration")?;

    // Initialize logging
    init_tracing(config.debug);

    let store = storage::open_store(&store_config)
        .await
        .context("Failed to open credential store")?;

    let resolver = CredentialResolver::new(config)?.with_store(store);

    let resolved = resolver.resolve().await;

    if print_metrics() {
        eprint!("{}", metrics::gather_metrics());
    }

    match resolved {
        Some(credentials) => {
            println!("{}", serde_json::to_string_pretty(&credentials)?);
            Ok(())
        }
        None => {
            tracing::error!("No credentials could be obtained");
            std::process::exit(1);
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "guest_credentials=debug"
    } else {
        "guest_credentials=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays machine-readable
    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_metrics() -> bool {
    std::env::var("GUEST_CREDENTIALS_PRINT_METRICS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
