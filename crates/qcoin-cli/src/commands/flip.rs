//! Flip command implementation.

use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::runtime::Handle;

use qcoin_flip::{CoinFlipSession, CoinOutcome, DeviceProfile, Face, RunStatus};
use qcoin_hal::Circuit;

use super::common::BackendArgs;

/// How to print the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coin row and tally
    Table,
    /// Machine-readable JSON
    Json,
}

/// What `flip --format json` prints.
#[derive(Debug, Serialize)]
struct FlipReport<'a> {
    device: String,
    backend: &'a str,
    coins: usize,
    bits: String,
    faces: String,
    heads: usize,
    tails: usize,
}

impl<'a> FlipReport<'a> {
    fn new(session: &'a CoinFlipSession, outcome: &CoinOutcome) -> Self {
        let stats = outcome.statistics();
        Self {
            device: session.profile().selector.to_string(),
            backend: session.profile().backend_id,
            coins: stats.total(),
            bits: outcome
                .bits()
                .iter()
                .map(|b| if *b { '1' } else { '0' })
                .collect(),
            faces: outcome.to_string(),
            heads: stats.heads,
            tails: stats.tails,
        }
    }
}

/// Execute the flip command.
pub async fn execute(
    args: &BackendArgs,
    fps: u32,
    format: OutputFormat,
    show_circuit: bool,
) -> Result<()> {
    let mut session = args.session(Handle::current())?;

    if format == OutputFormat::Table {
        println!(
            "{} Flipping {} coins on {}",
            style("→").cyan().bold(),
            session.total_bits(),
            style(session.profile().selector).yellow()
        );
    }
    if show_circuit {
        eprint!("{}", circuit_diagram(session.profile())?);
    }

    if !session.trigger_flip() {
        anyhow::bail!("{}", session.status_message());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(session.status_message().to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut frames = tokio::time::interval(Duration::from_secs(1) / fps);
    loop {
        frames.tick().await;
        session.tick();

        if session.status() == RunStatus::Failed {
            spinner.finish_and_clear();
            anyhow::bail!("{}", session.status_message());
        }
        if session.status() != RunStatus::Running && session.is_settled() {
            break;
        }
        spinner.set_message(session.status_message().to_string());
    }
    spinner.finish_and_clear();

    let Some(outcome) = session.last_outcome() else {
        anyhow::bail!("Run finished without a result");
    };

    match format {
        OutputFormat::Table => print_outcome(&session, outcome),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&FlipReport::new(&session, outcome))?
            );
        }
    }

    Ok(())
}

/// The circuit each call submits, with the number of calls per run.
fn circuit_diagram(profile: &DeviceProfile) -> Result<String> {
    let circuit = Circuit::coin_row(profile.bits_per_call)?;
    Ok(format!(
        "{circuit}  submitted {} time(s), 1 shot each\n",
        profile.calls_needed
    ))
}

fn print_outcome(session: &CoinFlipSession, outcome: &CoinOutcome) {
    println!(
        "\n{} {} ({} coins):\n",
        style("✓").green().bold(),
        style(session.profile().backend_id).bold(),
        outcome.len()
    );

    for row in outcome.faces().chunks(12) {
        let cells: Vec<String> = row
            .iter()
            .map(|face| match face {
                Face::Heads => style(format!("({})", face.label())).yellow().to_string(),
                Face::Tails => style(format!("({})", face.label())).cyan().to_string(),
            })
            .collect();
        println!("  {}", cells.join(" "));
    }

    println!("\n  {}", session.status_message());
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcoin_flip::DeviceSelector;

    #[test]
    fn test_circuit_diagram_for_batched_device() {
        let text = circuit_diagram(&DeviceProfile::for_selector(DeviceSelector::Backup)).unwrap();
        assert!(text.starts_with("coin_row_6 (6 qubits)"));
        assert!(text.contains("q5: ─H─M─"));
        assert!(!text.contains("q6:"));
        assert!(text.contains("submitted 4 time(s)"));
    }
}
