use libc::c_int;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ShimError;
use crate::expression::{Expression, TriggerBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub spi: SpiConfig,
    pub polling: PollingConfig,
    pub triggers: Vec<TriggerMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiConfig {
    pub bus: u8,
    pub chip_select: u8,
    /// Requested clock speed; the effective speed is an upper bound, see
    /// `speed_divisor`.
    pub speed_hz: u32,
    /// Downward scaling applied to every requested clock speed. The
    /// reference host (a Banana Pi) is only stable at half the requested
    /// rate, hence the default of 2. Values below 1 are treated as 1.
    pub speed_divisor: u32,
    pub mode: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

/// One trigger: a symbolic signal name and the expression it raises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerMapping {
    pub signal: String,
    pub expression: Expression,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi: SpiConfig {
                bus: 0,
                chip_select: 0,
                speed_hz: 8_000_000,
                speed_divisor: 2,
                mode: 0,
            },
            polling: PollingConfig { interval_ms: 20 },
            triggers: vec![
                TriggerMapping {
                    signal: "SIGUSR1".to_string(),
                    expression: Expression::Annoyed,
                },
                TriggerMapping {
                    signal: "SIGUSR2".to_string(),
                    expression: Expression::Eyeroll,
                },
                TriggerMapping {
                    signal: "SIGURG".to_string(),
                    expression: Expression::Startled,
                },
            ],
        }
    }
}

impl Config {
    /// Sanity checks that must hold before anything touches hardware.
    /// Each flag has exactly one writing signal, so a signal or an
    /// expression appearing twice in the trigger table is rejected.
    pub fn validate(&self) -> Result<(), ShimError> {
        for (i, mapping) in self.triggers.iter().enumerate() {
            for earlier in &self.triggers[..i] {
                if earlier.signal == mapping.signal {
                    return Err(ShimError::InvalidConfig(format!(
                        "signal {} is bound more than once",
                        mapping.signal
                    )));
                }
                if earlier.expression == mapping.expression {
                    return Err(ShimError::InvalidConfig(format!(
                        "expression {} has more than one trigger",
                        mapping.expression.name()
                    )));
                }
            }
        }
        if self.spi.mode > 3 {
            return Err(ShimError::InvalidConfig(format!(
                "SPI mode {} out of range",
                self.spi.mode
            )));
        }
        Ok(())
    }

    /// Resolve the symbolic trigger names. Unknown names are skipped with a
    /// warning rather than failing startup.
    pub fn bindings(&self) -> Vec<TriggerBinding> {
        self.triggers
            .iter()
            .filter_map(|mapping| match parse_signal(&mapping.signal) {
                Some(signal) => Some(TriggerBinding {
                    signal,
                    expression: mapping.expression,
                }),
                None => {
                    warn!("Unknown trigger signal {:?}, ignoring", mapping.signal);
                    None
                }
            })
            .collect()
    }
}

/// Map a symbolic signal name to its number. Only signals that make sense
/// as user-space triggers are accepted.
pub fn parse_signal(name: &str) -> Option<c_int> {
    match name {
        "SIGUSR1" | "USR1" => Some(libc::SIGUSR1),
        "SIGUSR2" | "USR2" => Some(libc::SIGUSR2),
        "SIGURG" | "URG" => Some(libc::SIGURG),
        "SIGHUP" | "HUP" => Some(libc::SIGHUP),
        "SIGWINCH" | "WINCH" => Some(libc::SIGWINCH),
        _ => None,
    }
}
