//! IR train server for a Raspberry Pi with an IR LED driven by LIRC.
//!
//! Serves the train command API, sends every accepted command through
//! `irsend` and, with the `gpio` feature, logs level changes on the
//! configured input pins.
//!
//! # Usage
//!
//! ```sh
//! # Defaults: port 8080, irsend, remote LEGO_Single_Output
//! cargo run --release
//!
//! # With GPIO monitoring on BCM 20 and 21
//! cargo run --release --features gpio
//!
//! # Overrides
//! PORT=3000 IR_REMOTE=LEGO_Combo_PWM RUST_LOG=debug cargo run --release
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use ir_trainz::hal::IrSendTransmitter;
use ir_trainz::services::{run_server_with_state, SharedState, WebServerConfig};
use ir_trainz::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid configuration")?;
    log::debug!("{:?}", config);

    let transmitter = IrSendTransmitter::from_config(&config.ir);
    log::info!(
        "sending via `{} SEND_ONCE {} <token>`",
        transmitter.program(),
        transmitter.remote()
    );

    let state = Arc::new(SharedState::with_history(
        transmitter,
        config.deliveries.history,
    ));

    let monitor = start_pin_monitor(&config, &state);

    let served = run_server_with_state(state, WebServerConfig::from_config(&config.web)).await;

    // The runtime waits for blocking tasks on shutdown.
    if let Some(stop) = monitor {
        stop.store(true, Ordering::Relaxed);
    }

    served.with_context(|| format!("server on port {} failed", config.web.port))
}

/// Starts the GPIO monitor and returns its stop flag.
#[cfg(feature = "gpio")]
fn start_pin_monitor(
    config: &Config,
    state: &Arc<SharedState<IrSendTransmitter>>,
) -> Option<Arc<AtomicBool>> {
    use ir_trainz::hal::SysfsInputs;
    use ir_trainz::services::spawn_pin_monitor;

    if !config.gpio.enabled {
        log::info!("GPIO monitoring disabled");
        return None;
    }

    match SysfsInputs::from_config(&config.gpio) {
        Ok(inputs) => {
            log::info!("monitoring GPIO pins {:?}", config.gpio.pins.as_slice());
            let stop = inputs.stop_handle();
            drop(spawn_pin_monitor(inputs, Arc::clone(state)));
            Some(stop)
        }
        Err(e) => {
            log::warn!("GPIO monitoring unavailable: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "gpio"))]
fn start_pin_monitor(
    config: &Config,
    _state: &Arc<SharedState<IrSendTransmitter>>,
) -> Option<Arc<AtomicBool>> {
    if config.gpio.enabled {
        log::info!("built without the `gpio` feature, input pins are not monitored");
    }
    None
}
