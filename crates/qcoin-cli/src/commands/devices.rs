//! Devices command implementation.

use console::style;

use qcoin_flip::{DeviceProfile, DeviceSelector, MAX_COINS, MIN_COINS};
use qcoin_hal::{BackendAvailability, BackendConfig, BackendRegistry};

use super::common::BackendArgs;

/// Execute the devices command.
pub async fn execute(args: &BackendArgs) {
    let selected = args.selected_device();
    let config = args.backend_config();
    let registry = args.build_registry();

    println!("{} Devices:\n", style("qcoin").cyan().bold());

    for (key, profile) in DeviceProfile::table().iter().enumerate() {
        let selector = profile.selector;
        let marker = if selector == selected {
            style("●").green()
        } else {
            style("○").dim()
        };

        let coins = match selector {
            DeviceSelector::Simulation => {
                format!("{MIN_COINS}-{MAX_COINS} coins (now {})", args.coins)
            }
            _ => format!("{} coins", profile.total_bits),
        };

        println!(
            "  {} [{}] {} ({})",
            marker,
            key + 1,
            style(selector).bold(),
            profile.backend_id
        );
        println!("    Coins: {coins}");
        println!(
            "    Batching: {} call(s) x {} qubits",
            profile.calls_needed, profile.bits_per_call
        );

        let availability = device_availability(&registry, &config, profile).await;
        if availability.is_available {
            let label = match selector {
                DeviceSelector::Simulation => "available (local)",
                _ if args.emulate_remote => "available (emulated)",
                _ => "available",
            };
            println!("    Status: {}", style(label).green());
            if let Some(depth) = availability.queue_depth.filter(|d| *d > 0) {
                println!("    Queue: {depth} jobs");
            }
        } else {
            let reason = availability
                .status_message
                .unwrap_or_else(|| "offline".to_string());
            println!("    Status: {}", style(reason).red());
        }
        println!();
    }

    if !args.emulate_remote && config.require_credentials().is_err() {
        println!("  Set QCOIN_HOST, QCOIN_USER and QCOIN_ACCESS_TOKEN, or pass --emulate-remote");
    }
}

/// Ask the device's backend whether it takes jobs. A device that cannot be
/// selected or whose backend cannot be created is reported unavailable.
pub async fn device_availability(
    registry: &BackendRegistry,
    config: &BackendConfig,
    profile: &DeviceProfile,
) -> BackendAvailability {
    if let Err(e) = profile.validate() {
        return BackendAvailability::unavailable(e.to_string());
    }

    let backend = match registry.create(profile.backend_id, config.for_backend(profile.backend_id))
    {
        Ok(backend) => backend,
        Err(e) => return BackendAvailability::unavailable(e.to_string()),
    };
    backend
        .availability()
        .await
        .unwrap_or_else(|e| BackendAvailability::unavailable(e.to_string()))
}
