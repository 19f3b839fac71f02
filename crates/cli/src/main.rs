use std::{collections::HashMap, path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tokio::sync::RwLock,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    relaydesk_channels::{ChannelOutbound, MessageBroadcast, log::ConversationLog},
    relaydesk_config::RelaydeskConfig,
    relaydesk_gateway::{GatewayBroadcaster, GatewayState, start_server, state::ClientMap},
    relaydesk_relay::{Relay, RelaySettings},
    relaydesk_store::SqliteConversationLog,
    relaydesk_telegram::TelegramOutbound,
};

#[derive(Parser)]
#[command(name = "relaydesk", about = "relaydesk — customer-service relay for Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Explicit config file (overrides discovery).
    #[arg(long, global = true, env = "RELAYDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server (default when no subcommand is provided).
    Serve,
    /// Validate the configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        None | Some(Commands::Serve) => serve(&cli).await,
        Some(Commands::CheckConfig) => check_config(&cli),
    }
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<RelaydeskConfig> {
    let mut cfg = match &cli.config {
        Some(path) => relaydesk_config::load_config(path)?,
        None => relaydesk_config::discover_and_load(),
    };
    if let Some(bind) = &cli.bind {
        cfg.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    Ok(cfg)
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let cfg = load(cli)?;
    cfg.validate()?;

    let options = sqlx::sqlite::SqliteConnectOptions::new()
        .filename(&cfg.database.path)
        .create_if_missing(true);
    let pool = sqlx::SqlitePool::connect_with(options).await?;
    relaydesk_store::run_migrations(&pool).await?;
    info!(path = %cfg.database.path, "store ready");

    let log: Arc<dyn ConversationLog> = Arc::new(SqliteConversationLog::new(pool));
    let clients: ClientMap = Arc::new(RwLock::new(HashMap::new()));
    let broadcast: Arc<dyn MessageBroadcast> =
        Arc::new(GatewayBroadcaster::new(Arc::clone(&clients)));
    let outbound: Arc<dyn ChannelOutbound> = Arc::new(TelegramOutbound::new(&cfg.bot_token)?);

    let relay = Arc::new(Relay::new(
        Arc::clone(&log),
        outbound,
        broadcast,
        RelaySettings {
            forward_to_id: cfg.forward_to_id.clone(),
            welcome_message: cfg.welcome_message.clone(),
            bot_id: cfg.bot_id(),
            cooldown_hours: cfg.cooldown_hours,
        },
    ));

    let state = Arc::new(GatewayState::new(
        relay,
        log,
        clients,
        cfg.secure_token.clone(),
        cfg.bot_token.clone(),
    ));

    start_server(state, &cfg.server.bind, cfg.server.port).await
}

fn check_config(cli: &Cli) -> anyhow::Result<()> {
    let path = cli
        .config
        .clone()
        .or_else(relaydesk_config::find_config_file);
    let Some(path) = path else {
        anyhow::bail!("no config file found");
    };
    let cfg = relaydesk_config::load_config(&path)?;
    cfg.validate()?;
    println!("config ok: {}", path.display());
    Ok(())
}
