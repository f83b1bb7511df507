use clap::{Parser, Subcommand};
use lib::pipeline::RelayOutcome;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Relay CLI: Chatwoot to Botpress bridge with translated replies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook gateway. Chatwoot posts message events to the configured webhook path.
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Relay one stored webhook event (JSON file) through the bot and back, then exit.
    Replay {
        /// Webhook event body to relay
        #[arg(long, short, value_name = "FILE")]
        file: std::path::PathBuf,

        /// Config file path (default: RELAY_CONFIG_PATH or ~/.relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Replay { file, config }) => {
            if let Err(e) = run_replay(file, config).await {
                log::error!("replay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    lib::gateway::run_gateway(config).await
}

async fn run_replay(
    file: std::path::PathBuf,
    config_path: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let (config, _) = lib::config::load_config(config_path)?;
    let body = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let bridge = lib::gateway::build_bridge(&config).await?;
    match bridge.handle(&body).await? {
        RelayOutcome::Ignored(reason) => {
            log::info!("event ignored: {:?}", reason);
        }
        RelayOutcome::Relayed {
            delivered,
            failed,
            skipped,
        } => {
            log::info!(
                "relayed: {} delivered, {} failed, {} skipped",
                delivered,
                failed,
                skipped
            );
            if failed > 0 {
                anyhow::bail!("{} reply item(s) were not delivered", failed);
            }
        }
    }
    Ok(())
}
