use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::repository::InventoryRepository;
use crate::services::Services;

mod app;
mod cli;
mod command;
mod config;
mod confirm;
mod error;
mod list;
mod logs;
mod message;
mod repository;
mod resource;
mod screens;
mod search;
mod services;
mod stack;
mod theme;
mod tui;
mod ui;
mod view;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = cli::Args::parse();
    let _guard = initialize_logging(args.log_level.as_deref())?;
    info!("Starting lazyinfra");

    let config = config::load(args.config.as_deref())?;
    let inventory = services::inventory_path(args.inventory.as_deref(), &config);
    info!("Using inventory {}", inventory.display());

    let repository = Arc::new(InventoryRepository::new(inventory.clone()));
    let services = Services::new(config, inventory, repository);

    let root = screens::resource_browser(&services);
    let mut app = App::new(services, root);
    app.run().await?;

    Ok(())
}

/// Log to a daily file; the terminal belongs to the UI.
///
/// `--log-level` takes precedence over `RUST_LOG`.
fn initialize_logging(level: Option<&str>) -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazyinfra").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazyinfra.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::from_default_env(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
