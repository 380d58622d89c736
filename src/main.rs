use anyhow::Context;
use netplan_client::cli::commands;
use netplan_client::cli::{Args, ClientConfig, ConfigDiscovery, ExecutionMode, Menu, Operation};
use netplan_client::{DbusChannel, RpcChannel, SessionManager};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the menu and command output
    let default_filter = if args.verbose {
        "netplan_client=debug"
    } else {
        "netplan_client=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting netplan client");

    let config = ConfigDiscovery::resolve(&args.overrides())?;

    match args.mode() {
        ExecutionMode::OneShot(operation) => run_one_shot(config, operation).await,
        ExecutionMode::Interactive => run_interactive_mode(config).await,
        ExecutionMode::ShowConfig => {
            let mut stdout = io::stdout().lock();
            ConfigDiscovery::show_discovery_info(&mut stdout, &config)?;
            stdout.flush()?;
            Ok(())
        }
        ExecutionMode::InitConfig => {
            let path = ConfigDiscovery::init_user_config()?;
            println!("Configuration file: {}", path.display());
            Ok(())
        }
    }
}

async fn connect(config: &ClientConfig) -> anyhow::Result<SessionManager> {
    let channel = DbusChannel::connect(config.bus)
        .await
        .with_context(|| format!("Cannot reach netplan on the {} bus", config.bus))?;
    info!("Using the {} bus", channel.bus());
    Ok(SessionManager::new(
        Arc::new(channel),
        config.session_config(),
    ))
}

async fn run_one_shot(config: ClientConfig, operation: Operation) -> anyhow::Result<()> {
    info!("Running one-shot operation: {:?}", operation);
    let mut manager = connect(&config).await?;

    let mut stdout = io::stdout();
    commands::execute(
        &mut manager,
        &operation,
        config.default_try_timeout_secs,
        &mut stdout,
    )
    .await?;
    stdout.flush()?;
    Ok(())
}

async fn run_interactive_mode(config: ClientConfig) -> anyhow::Result<()> {
    info!("Running in interactive mode");
    let mut manager = connect(&config).await?;

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout(), config.default_try_timeout_secs);
    menu.run(&mut manager).await?;

    if manager.has_session() {
        info!("Leaving with an open configuration session");
    }
    println!("Goodbye!");
    Ok(())
}
