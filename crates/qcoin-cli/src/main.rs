//! qcoin Command-Line Interface
//!
//! Flips a row of quantum coins. Each coin is one qubit put into
//! superposition and measured on a simulator or a remote device.
//!
//! ```text
//!      ( H )  ( T )  ( H )  ( T )  ( T )  ( H )
//!
//!              Q U A N T U M   C O I N S
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::BackendArgs;
use commands::{devices, flip, play, version};

/// qcoin - flip quantum coins on simulators and remote devices
#[derive(Parser)]
#[command(name = "qcoin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    backend: BackendArgs,

    /// Render ticks per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240), global = true)]
    fps: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flip coins interactively in the terminal
    Play,

    /// Run one flip and print the result
    Flip {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = flip::OutputFormat::Table)]
        format: flip::OutputFormat,

        /// Print the circuit submitted on each call
        #[arg(long)]
        show_circuit: bool,
    },

    /// List devices and how they produce coins
    Devices,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Play => play::execute(&cli.backend, cli.fps).await,
        Commands::Flip {
            format,
            show_circuit,
        } => flip::execute(&cli.backend, cli.fps, format, show_circuit).await,
        Commands::Devices => {
            devices::execute(&cli.backend).await;
            Ok(())
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcoin_flip::DeviceSelector;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["qcoin", "play"]);
        assert!(matches!(cli.command, Commands::Play));
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.backend.coins, 6);
        assert!(!cli.backend.emulate_remote);
    }

    #[test]
    fn test_device_after_subcommand() {
        let cli = parse(&["qcoin", "flip", "--device", "secondary", "-vv"]);
        assert_eq!(cli.backend.device, Some(DeviceSelector::Secondary));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_device_aliases() {
        let cli = parse(&["qcoin", "--device", "sim", "flip"]);
        assert_eq!(cli.backend.selected_device(), DeviceSelector::Simulation);
    }

    #[test]
    fn test_unknown_device_rejected() {
        assert!(Cli::try_parse_from(["qcoin", "--device", "toaster", "flip"]).is_err());
    }

    #[test]
    fn test_coin_range() {
        assert_eq!(parse(&["qcoin", "--coins", "24", "flip"]).backend.coins, 24);
        assert!(Cli::try_parse_from(["qcoin", "--coins", "0", "flip"]).is_err());
        assert!(Cli::try_parse_from(["qcoin", "--coins", "25", "flip"]).is_err());
    }

    #[test]
    fn test_flip_format() {
        let cli = parse(&["qcoin", "flip", "--format", "json"]);
        match cli.command {
            Commands::Flip {
                format,
                show_circuit,
            } => {
                assert_eq!(format, flip::OutputFormat::Json);
                assert!(!show_circuit);
            }
            _ => panic!("expected flip"),
        }

        let cli = parse(&["qcoin", "flip", "--show-circuit"]);
        assert!(matches!(
            cli.command,
            Commands::Flip {
                show_circuit: true,
                ..
            }
        ));
    }

    #[test]
    fn test_credentials() {
        let cli = parse(&[
            "qcoin", "--host", "https://qpu.example", "--user", "alice", "--token", "secret",
            "devices",
        ]);
        let config = cli.backend.backend_config();
        assert_eq!(config.endpoint.as_deref(), Some("https://qpu.example"));
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["qcoin"]).is_err());
    }
}
