mod app;
mod form;

use catalog_core::{CatalogConfig, ProductsClient};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            // Override with RUST_LOG, e.g. RUST_LOG=catalog_core=debug
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_core=info,catalog_gui=info".into()),
        )
        .init();
}

fn main() -> iced::Result {
    init_logging();

    let config = match CatalogConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match ProductsClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Using product API at {}", client.base_url());

    iced::application("Product Catalog", app::update, app::view)
        .run_with(move || app::initialize(client))
}
