use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use syntheyes_host::{Config, EyeHost, Expression, HostPins, StateEntry};

/// Stand-in for the firmware's animation state table: the three override
/// expressions on their reference trigger pins, then the terminator.
const DEMO_STATES: &[StateEntry] = &[
    StateEntry {
        pin: Some(1),
        anim: Some(1), // annoyed
    },
    StateEntry {
        pin: Some(2),
        anim: Some(2), // startled
    },
    StateEntry {
        pin: Some(3),
        anim: Some(3), // eyeroll
    },
    StateEntry::END,
];

fn main() -> Result<()> {
    // Initialize logging
    init_logger();

    info!("SynthEyes host shim starting...");

    let config = load_config()?;

    let mut host = EyeHost::new(&config).context("Host shim initialization failed")?;
    host.register_triggers()
        .context("Failed to install trigger handlers")?;

    let mut pins = HostPins::new().context("GPIO controller unavailable")?;
    host.configure_pull_ups(&mut pins, DEMO_STATES)?;

    // Startup probe transfer
    let mut probe = [0u8; 2];
    host.transfer(&mut probe)
        .context("SPI probe transfer failed")?;
    debug!("Probe transfer response: {:02x?}", probe);

    let running = Arc::new(AtomicBool::new(true));
    let running_in_handler = Arc::clone(&running);
    ctrlc::set_handler(move || running_in_handler.store(false, Ordering::SeqCst))
        .context("Failed to set Ctrl-C handler")?;

    info!(
        "Polling expression triggers every {}ms",
        config.polling.interval_ms
    );

    while running.load(Ordering::SeqCst) {
        for expression in Expression::ALL {
            if host.check_expression(expression) {
                info!("Expression override: {}", expression.name());
            }
        }
        sleep(Duration::from_millis(config.polling.interval_ms));
    }

    info!("SynthEyes host shim shutdown complete");
    Ok(())
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(config_path) => {
            info!("Loading configuration from: {}", config_path);
            let config_content = fs::read_to_string(&config_path)
                .context(format!("Failed to read config file: {}", config_path))?;
            let config: Config = serde_yaml::from_str(&config_content)
                .context("Failed to parse configuration file")?;
            Ok(config)
        }
        None => {
            info!("No config file given, using built-in defaults");
            Ok(Config::default())
        }
    }
}

fn init_logger() {
    // Use `env_logger` for logging. Systemd/journald will capture stdout/stderr.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
