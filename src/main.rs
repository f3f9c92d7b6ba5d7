use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};

use eq_player::app::AppController;
use eq_player::cli::{CliApp, Commands, StatusDisplay};
use eq_player::command::Command;
use eq_player::config::{ConfigManager, PlayerConfig};
use eq_player::engine::{HeadlessEngine, StreamOpener, SymphoniaOpener};
use eq_player::error::PlayerError;
use eq_player::logging;

/// Load the config file, falling back to defaults when it is unusable
fn load_config(cli: &CliApp) -> (PlayerConfig, Option<ConfigManager>) {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    match manager {
        Ok(manager) => (manager.get_config().clone(), Some(manager)),
        Err(e) => {
            warn!("Using default configuration: {}", e);
            StatusDisplay::display_simple_error(&PlayerError::Config(e));
            (PlayerConfig::default(), None)
        }
    }
}

fn probe(path: &std::path::Path) -> Result<(), PlayerError> {
    let info = SymphoniaOpener.open(path)?;
    println!("{}", path.display());
    println!("  Length: {}", StatusDisplay::format_ms(info.length_ms));
    if let Some(rate) = info.sample_rate {
        println!("  Sample rate: {} Hz", rate);
    }
    if let Some(channels) = info.channels {
        println!("  Channels: {}", channels);
    }
    Ok(())
}

/// Feed stdin lines to the prompt from a dedicated thread
fn spawn_stdin_reader() -> tokio::sync::mpsc::UnboundedReceiver<String> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

async fn run(cli: CliApp) -> Result<(), PlayerError> {
    let (config, manager) = load_config(&cli);

    let mut app = AppController::new(HeadlessEngine::new(), config, cli.policy)?;
    if let Some(manager) = manager {
        app = app.with_config_manager(manager);
    }

    if let Some(Commands::Play { path }) = cli.command {
        let path = CliApp::expand_path(&path.to_string_lossy());
        if let Err(e) = app.execute_command(Command::Play { path }) {
            app.handle_error(&e);
        }
    }

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\nReceived interrupt signal. Shutting down gracefully...");
        shutdown_flag_clone.store(true, Ordering::Relaxed);
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let lines = spawn_stdin_reader();
    app.run_interactive_mode(lines, shutdown_flag).await?;
    app.shutdown()?;

    println!("Shutdown complete.");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliApp::parse();

    if let Err(e) = logging::init(cli.log_level.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let probe_path = match &cli.command {
        Some(Commands::Probe { path }) => Some(CliApp::expand_path(&path.to_string_lossy())),
        _ => None,
    };

    let result = match probe_path {
        Some(path) => probe(&path),
        None => run(cli).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        StatusDisplay::display_error(&e);
        std::process::exit(1);
    }

    info!("Application shutdown complete");
}
