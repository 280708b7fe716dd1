mod authz;
mod errors;
mod session;
mod settings;
mod web;

use std::sync::Arc;

use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "turnstile",
    version,
    about = "Permission evaluation and route-guard service"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    let catalog = authz::Catalog::builtin();
    tracing::info!(permissions = catalog.len(), "Seeded permission catalog");

    let source = Arc::new(authz::snapshot::HttpPermissionSource::new(
        &settings.upstream.base_url,
        &settings.upstream.permissions_path,
    ));
    let store = authz::snapshot::SnapshotStore::new(source);

    web::serve(settings, catalog, store).await?;
    Ok(())
}
