use anyhow::Context;
use clap::Parser;
use gmd::{hotkey, http, AppState};
use gm_system::{platform, ConfigStore, LaunchWatcher, MonitorHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "game_autolaunch_config.json";

#[derive(Parser, Debug)]
#[command(name = "gmd", about = "Game automation daemon")]
struct Cli {
    /// Port for the local control surface
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory holding the auto-launch config (defaults to the cwd)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving working directory")?,
    };
    let config_path = config_dir.join(CONFIG_FILE);

    let state = Arc::new(AppState::new(
        gm_macro::platform::native_backend(),
        config_path.clone(),
    ));

    let _monitor = MonitorHandle::spawn(
        state.monitor.clone(),
        platform::io_sampler(),
        Duration::from_secs(1),
    );

    let dispatcher_state = state.clone();
    let _watcher = LaunchWatcher::new(
        ConfigStore::new(config_path),
        Arc::new(platform::process_list),
        Arc::new(move |action, pid| dispatcher_state.perform_action(action, pid)),
    )
    .spawn();

    let _hotkey = hotkey::spawn(state.clone());

    let server = tiny_http::Server::http(("127.0.0.1", cli.port))
        .map_err(|e| anyhow::anyhow!("binding port {}: {}", cli.port, e))?;
    let server = Arc::new(server);

    let shutdown = server.clone();
    ctrlc::set_handler(move || shutdown.unblock()).context("installing ctrl-c handler")?;

    info!(port = cli.port, "control surface listening");
    http::serve(&server, &state);

    info!("shutting down");
    Ok(())
}
