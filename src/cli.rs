use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazyinfra", version, about = "Browse resources and tail their logs")]
pub struct Args {
    /// Config file (defaults to <config dir>/lazyinfra/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Resource inventory, overrides the config file
    #[arg(short, long)]
    pub inventory: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "lazyinfra=trace"; overrides RUST_LOG
    #[arg(short, long)]
    pub log_level: Option<String>,
}
