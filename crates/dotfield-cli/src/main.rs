use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::{info, warn};

use dotfield_canvas::{Bitmap, DotRenderer};
use dotfield_client::Subscription;
use dotfield_core::config::Config;
use dotfield_core::protocol::WorldEvent;
use dotfield_world::Reconciler;

#[derive(Parser)]
#[command(
    name = "dotfield",
    about = "Real-time peer visualization client over server-sent events",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to the world stream and render it until the channel closes
    Watch {
        /// SSE endpoint override (default: from config)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show resolved settings
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value by dotted path
    Get { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::config_path);

    let config = Config::load(&config_path)?;

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Watch { endpoint } => {
            let (warnings, errors) = config.validate();
            for warning in &warnings {
                warn!("{warning}");
            }
            if !errors.is_empty() {
                anyhow::bail!("invalid config: {}", errors.join("; "));
            }
            let endpoint = endpoint.unwrap_or_else(|| config.endpoint());
            run_watch(&config, endpoint).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{value}"),
                None => anyhow::bail!("no config value at '{key}'"),
            },
        },
        Commands::Status => {
            let (width, height) = config.surface_size();
            println!("Dotfield v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Endpoint: {}", config.endpoint());
            println!("Surface: {width}x{height}, dot size {}", config.dot_size());
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbose: bool) {
    let base = if verbose {
        "debug".to_string()
    } else {
        config
            .logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    let mut directives = vec![base];
    if let Some(logging) = &config.logging {
        directives.extend(logging.filters.iter().cloned());
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives.join(",")));

    let json = config
        .logging
        .as_ref()
        .map(|l| l.format == "json")
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// The event pump: subscription → reconciler → renderer.
///
/// A producer task forwards decoded events into an mpsc channel; this loop
/// consumes them one at a time, so every mutation commits (and its redraw
/// runs) before the next event is handled.
async fn run_watch(config: &Config, endpoint: String) -> anyhow::Result<()> {
    let (width, height) = config.surface_size();

    let mut reconciler = Reconciler::new();
    let renderer = DotRenderer::new(Bitmap::new(width, height)).with_dot_size(config.dot_size());
    reconciler.set_observer(Box::new(renderer));

    let subscription = Subscription::new(endpoint, config.connect_timeout_ms())?;
    let mut events = subscription.open().await?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let producer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    loop {
        let event = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; closing session");
                break;
            }
            maybe = rx.recv() => match maybe {
                Some(event) => event,
                None => break,
            },
        };

        let disconnected = matches!(event, WorldEvent::Disconnected);
        let count_before = reconciler.world().peer_count();
        reconciler.apply(event);

        let count = reconciler.world().peer_count();
        if count != count_before {
            info!(peers = count, "Connected peers");
        }

        if disconnected {
            warn!("Push channel closed; session over");
            break;
        }
    }

    producer.abort();
    let world = reconciler.world();
    info!(
        entities = world.entity_count(),
        peers = world.peer_count(),
        "Session ended"
    );
    Ok(())
}
