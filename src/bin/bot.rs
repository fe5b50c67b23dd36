use tracing::info;

use partyline::client::{bot, RelayClient};
use partyline::Config;

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

    partyline::logging::init_console_only(&config.logging.level);

    let bot_user_id = config.bot.user_id.clone();
    let mut client = RelayClient::from_config(&config.bot);

    info!(
        "Bot worker starting as {} ({}), relay at {}",
        config.bot.username, config.bot.user_id, config.bot.server_url
    );

    tokio::select! {
        _ = client.run(|event| bot::reply_to(event, &bot_user_id)) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }
}
