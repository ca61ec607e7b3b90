// PingMCP: plays a notification sound when an agent asks for it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pingmcp::config::{PingConfig, CONFIG_FILE};
use pingmcp::tools::{NotifyTool, ToolRegistry};
use pingmcp::McpServer;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pingmcp", version)]
#[command(about = "MCP server that plays a notification sound", long_about = None)]
struct Args {
    /// Installation root holding notification.mp3 and custom/default.mp3
    /// (defaults to the executable's directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Path to configuration file (defaults to <root>/pingmcp.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP requests on stdin/stdout (default)
    Serve,
    /// List every sound candidate in priority order
    Sounds,
    /// Play the notification sound once and report how it went
    Play,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Stdout carries protocol frames, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pingmcp=info,pingmcp_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let root = match args.root {
        Some(root) => root,
        None => install_root()?,
    };
    let config_path = args.config.unwrap_or_else(|| root.join(CONFIG_FILE));
    let config = PingConfig::load(&config_path)?;

    tracing::debug!(root = %root.display(), config = ?config, "Configuration loaded");

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let sounds = Arc::new(config.sound_source(&root));
            let driver = Arc::new(config.playback_driver());
            tracing::info!(
                root = %root.display(),
                platform = %driver.platform(),
                cache = ?sounds.mode(),
                "Starting PingMCP server"
            );

            let mut registry = ToolRegistry::new();
            registry.register(Arc::new(NotifyTool::new(sounds, Arc::clone(&driver))));

            let served = McpServer::new(registry).start().await;
            // Let running players finish so their bell fallback still fires
            driver.shutdown().await;
            served?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sounds => {
            let candidates = config.resolver(&root).candidates();
            for (index, candidate) in candidates.iter().enumerate() {
                let marker = if index == 0 { "*" } else { " " };
                match candidate.asset.path() {
                    Some(path) => println!(
                        "{} {}. [{}] {} ({})",
                        marker,
                        index + 1,
                        candidate.tier,
                        candidate.asset,
                        path.display()
                    ),
                    None => println!("{} {}. [{}] {}", marker, index + 1, candidate.tier, candidate.asset),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Play => {
            let asset = config.resolver(&root).resolve();
            let driver = config.playback_driver();
            let outcome = driver.play(&asset).outcome().await;

            match outcome.player {
                Some(player) if !outcome.failed => {
                    println!("Played {} with {}", asset, player);
                    Ok(ExitCode::SUCCESS)
                }
                _ => {
                    println!("Played {} (terminal bell fallback)", asset);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

/// Directory containing the running executable
fn install_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(|dir| dir.to_path_buf())
        .context("Executable has no parent directory")
}
