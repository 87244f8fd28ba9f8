use clap::{Parser, Subcommand};
use std::path::PathBuf;

use photo_magic::{config::AppConfig, logging, server};

#[derive(Parser)]
#[command(name = "photo-magic")]
#[command(about = "Photo Magic - Google Photos gateway", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (default: ~/.photo-magic/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Start {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },
    /// Print the Google consent URL for the configured client
    AuthUrl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    let mut config = AppConfig::from_file(&config_path)?;

    logging::init(&config.server.log_level);

    match cli.command {
        Commands::Start { port } => {
            // Override port if specified
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!("Starting Photo Magic on {}", config.listen_addr());
            let base = format!("http://{}", config.listen_addr());
            println!("📸 Photo Magic v{}", env!("CARGO_PKG_VERSION"));
            println!("📡 Server running on {}", base);
            println!();
            println!("To get started:");
            println!("1. Set up your Google Photos API credentials in {}", config_path.display());
            println!("2. Visit {}/auth/google to authenticate", base);
            println!("3. Use {}/photos to get your photos", base);
            println!();
            println!("Press Ctrl+C to stop");

            server::start_server(config).await?;
        }
        Commands::AuthUrl => {
            let state = server::AppState::new(&config)?;
            println!("{}", state.oauth.consent_url()?);
        }
    }

    Ok(())
}
