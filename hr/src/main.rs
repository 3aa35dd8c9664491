//! Healing Reflection - CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use healing_reflection::ask;
use healing_reflection::cli::{Cli, Command, OutputFormat, get_log_path};
use healing_reflection::config::Config;
use healing_reflection::input::validate_description;
use healing_reflection::llm::create_client;
use healing_reflection::orchestrator::Driver;
use healing_reflection::reflection::Reflector;
use healing_reflection::{repl, tui};

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Build the LLM client and reflector for an interactive or one-shot session
fn build_driver(config: &Config) -> Result<Driver> {
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let reflector = Reflector::new(llm, &config.reflection);
    info!(model = %reflector.describe(), lens = %reflector.lens(), "build_driver: ready");
    Ok(Driver::new(Arc::new(reflector)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!(
        "Healing Reflection loaded config: provider={}, lens={}",
        config.llm.provider, config.reflection.lens
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Tui) => cmd_tui(&config).await,
        Some(Command::Repl { initial }) => cmd_repl(&config, initial).await,
        Some(Command::Ask {
            description,
            continue_,
            format,
        }) => cmd_ask(&config, &description, continue_, format).await,
        Some(Command::Config) => cmd_config(&config),
    }
}

async fn cmd_tui(config: &Config) -> Result<()> {
    let driver = build_driver(config)?;
    tui::run(driver).await
}

async fn cmd_repl(config: &Config, initial: Option<String>) -> Result<()> {
    let driver = build_driver(config)?;
    repl::run_interactive(driver, initial).await
}

async fn cmd_ask(config: &Config, description: &str, continue_: bool, format: OutputFormat) -> Result<()> {
    // Blank input never reaches the network
    let description = validate_description(description)?;

    let driver = build_driver(config)?;
    let report = ask::run(driver, description, continue_).await;
    print!("{}", report.render(format)?);
    if format == OutputFormat::Json {
        println!();
    }

    match report.error {
        Some(message) => Err(eyre::eyre!(message)),
        None => Ok(()),
    }
}

fn cmd_config(config: &Config) -> Result<()> {
    let resolved = config.llm.resolve()?;
    print!("{}", config.to_yaml()?);
    println!("# resolved: provider={} model={}", resolved.provider, resolved.model);
    println!("# api key env: {}", resolved.api_key_env);
    println!("# logs: {}", get_log_path().display());
    Ok(())
}
