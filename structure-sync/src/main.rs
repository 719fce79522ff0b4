use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use structure_sync::prepopulation::prepopulate_structure;
use structure_sync::{server, Config, Dependencies, ServiceError};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("structure_sync=info,structure_sync_repository=info")
    });

    if std::env::var("LOG_JSON").is_ok() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "structure-sync",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let dependencies = Dependencies::new(&config).await?;

    prepopulate_structure(&config, dependencies.repository.as_ref()).await?;

    let app = server::create_app(dependencies.repository.clone());
    server::run_server(app, config.server_address).await?;
    Ok(())
}
