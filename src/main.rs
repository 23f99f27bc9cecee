use clap::Parser;
use lendflow::cli::{local_signer, Cli};
use lendflow::config::Config;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("lendflow starting");

    let signer = match local_signer(&config) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Signer setup failed");
            std::process::exit(1);
        }
    };

    tokio::select! {
        result = cli.execute(config, signer) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("lendflow stopped");
}
