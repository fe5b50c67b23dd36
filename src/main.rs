use tracing::{error, info};

use partyline::{Config, RelayServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = partyline::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        partyline::logging::init_console_only(&config.logging.level);
    }

    info!("Partyline - real-time chat relay");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let server = RelayServer::new(&config.server, &config.relay);
    if let Err(e) = server.run().await {
        error!("Relay server failed: {e}");
        std::process::exit(1);
    }
}
