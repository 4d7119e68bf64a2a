mod actuator;
mod console;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tk_app::{AppResult, ControlConfig, ControlUnit, config};
use tk_core::MonotonicClock;

use crate::actuator::LineActuator;
use crate::console::ConsoleCommand;

#[derive(Parser)]
#[command(name = "tk-cli")]
#[command(about = "tankctl CLI - water tank level control unit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control unit with a stdin console
    Run {
        /// Path to the YAML config (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a config file
    CheckConfig {
        /// Path to the YAML config
        config_path: PathBuf,
    },
    /// Print the effective config as YAML
    PrintConfig {
        /// Path to the YAML config (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr; stdout carries actuator frames and console replies.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => cmd_run(config.as_deref()),
        Commands::CheckConfig { config_path } => cmd_check_config(&config_path),
        Commands::PrintConfig { config } => cmd_print_config(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<ControlConfig> {
    match path {
        Some(path) => config::load_yaml(path),
        None => Ok(ControlConfig::default()),
    }
}

fn cmd_check_config(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = config::load_yaml(config_path)?;
    println!("✓ Config is valid");
    println!(
        "  L1 = {} cm, L2 = {} cm, T1 = {} ms, T2 = {} ms",
        config.l1_cm, config.l2_cm, config.t1_ms, config.t2_ms
    );
    Ok(())
}

fn cmd_print_config(config_path: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn cmd_run(config_path: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let actuator = Arc::new(LineActuator::new(io::stdout()));
    let mut unit = ControlUnit::start(config, actuator, Arc::new(MonotonicClock::new()))?;

    println!("tankctl running, {}", console::HELP);

    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = match console::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                reply_error(&message);
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        match console::execute(&unit, command) {
            Ok(value) => println!("< {value}"),
            Err(e) => reply_error(&e.to_string()),
        }
    }

    if let Some(stats) = unit.stop()? {
        println!(
            "✓ Stopped after {} ticks ({} overruns, worst {:.3} ms)",
            stats.ticks,
            stats.overruns,
            stats.worst_case.as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

fn reply_error(message: &str) {
    println!("< {}", serde_json::json!({ "error": message }));
}
