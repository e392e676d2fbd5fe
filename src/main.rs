use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docappend::server::{start_server, AppState};
use docappend::Config;

#[derive(Parser)]
#[command(name = "docappend")]
#[command(about = "Web form that appends PDFs or Word documents to every .docx in a ZIP")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to serve the form on, e.g. 0.0.0.0:8501
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Font family forced onto every run
    #[arg(long)]
    font_family: Option<String>,

    /// Font size in points forced onto every run
    #[arg(long)]
    font_size: Option<f32>,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docappend=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.init_config {
        match Config::init_default()? {
            Some(path) => println!("Wrote default config to {}", path.display()),
            None => println!("No config directory available on this system"),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if let Some(family) = cli.font_family {
        config.append.font_family = family;
    }
    if let Some(size) = cli.font_size {
        config.append.font_size_pt = size;
    }
    config.validate()?;

    tracing::info!(
        "Normalizing to {} {}pt, images {} inches wide",
        config.append.font_family,
        config.append.font_size_pt,
        config.append.image_width_inches
    );
    start_server(AppState::new(config)).await?;

    Ok(())
}
