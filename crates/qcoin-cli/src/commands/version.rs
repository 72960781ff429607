//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum coin flips in the terminal",
        style("qcoin").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qcoin-hal          Coin-row circuits and backend job lifecycle");
    println!("  qcoin-adapter-sim  Local simulator backend");
    println!("  qcoin-flip         Result assembly, run coordination, coin animation");
    println!("  qcoin-cli          Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
