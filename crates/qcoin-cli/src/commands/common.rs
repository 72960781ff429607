//! Shared helpers for CLI commands.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use clap::builder::BoolishValueParser;
use serde_json::json;
use tokio::runtime::Handle;

use qcoin_adapter_sim::SimulatorBackend;
use qcoin_flip::{CoinFlipSession, DeviceProfile, DeviceSelector};
use qcoin_hal::{Backend, BackendConfig, BackendFactory, BackendRegistry, HalError};

/// Devices reached over the network.
pub const REMOTE_DEVICES: [DeviceSelector; 3] = [
    DeviceSelector::Primary,
    DeviceSelector::Backup,
    DeviceSelector::Secondary,
];

/// Device and backend options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Device to flip on (primary, backup, secondary, simulation)
    #[arg(long, env = "QCOIN_DEVICE", global = true)]
    pub device: Option<DeviceSelector>,

    /// Default to the simulator when no device is given
    #[arg(long, env = "QCOIN_SIMULATE", value_parser = BoolishValueParser::new(), global = true)]
    pub simulate: bool,

    /// Coins shown on the simulator
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..=24), global = true)]
    pub coins: u8,

    /// Remote device API host
    #[arg(long, env = "QCOIN_HOST", global = true)]
    pub host: Option<String>,

    /// Remote device account
    #[arg(long, env = "QCOIN_USER", global = true)]
    pub user: Option<String>,

    /// Remote device access token
    #[arg(long, env = "QCOIN_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Artificial delay per simulator submission, in milliseconds
    #[arg(long, env = "QCOIN_SIM_LATENCY_MS", global = true)]
    pub sim_latency_ms: Option<u64>,

    /// Serve remote devices from a simulator capped at each device's width
    #[arg(long, global = true)]
    pub emulate_remote: bool,
}

impl BackendArgs {
    /// The device to start on: `--device`, else the simulator when
    /// `--simulate` is set, else the backup device.
    pub fn selected_device(&self) -> DeviceSelector {
        match self.device {
            Some(device) => device,
            None if self.simulate => DeviceSelector::Simulation,
            None => DeviceSelector::Backup,
        }
    }

    /// Credentials and simulator options handed to backend factories.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new("qcoin");
        if let Some(host) = &self.host {
            config = config.with_endpoint(host.clone());
        }
        if let Some(user) = &self.user {
            config = config.with_user(user.clone());
        }
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        if let Some(latency) = self.sim_latency_ms {
            config = config.with_extra("latency_ms", json!(latency));
        }
        config
    }

    /// Registry with the simulator and one entry per remote device.
    pub fn build_registry(&self) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.register::<SimulatorBackend>(DeviceSelector::Simulation.backend_id());

        for selector in REMOTE_DEVICES {
            if self.emulate_remote {
                let width = DeviceProfile::for_selector(selector).bits_per_call;
                registry.register_factory(selector.backend_id(), move |config| {
                    let config = config
                        .with_extra("max_qubits", json!(width))
                        .with_extra("emulate_device", json!(true));
                    Ok(Arc::new(SimulatorBackend::from_config(config)?) as Arc<dyn Backend>)
                });
            } else {
                registry.register_factory(selector.backend_id(), |config| {
                    config.require_credentials()?;
                    Err(HalError::BackendUnavailable(format!(
                        "{} has no network client in this build; pass --emulate-remote",
                        config.name
                    )))
                });
            }
        }
        registry
    }

    /// A session on the selected device.
    pub fn session(&self, runtime: Handle) -> Result<CoinFlipSession> {
        let session = CoinFlipSession::builder(Arc::new(self.build_registry()))
            .device(self.selected_device())
            .coins(usize::from(self.coins))
            .backend_config(self.backend_config())
            .build(runtime)?;
        Ok(session)
    }
}
