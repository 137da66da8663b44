use libc::c_int;
use std::io;
use thiserror::Error;

/// Errors surfaced by the host shim.
///
/// Opening and clocking the SPI bus are configuration problems and callers
/// abort startup on them. A failed `transfer` is reported as its own
/// variant; the animation loop decides whether to drop the frame or quit,
/// the shim never retries a partial transfer.
#[derive(Debug, Error)]
pub enum ShimError {
    #[error("failed to set up SPI bus: {source}")]
    DeviceOpen {
        #[source]
        source: rppal::spi::Error,
    },

    #[error("SPI transfer failed: {source}")]
    Transfer {
        #[source]
        source: rppal::spi::Error,
    },

    #[error("GPIO error: {source}")]
    Gpio {
        #[from]
        source: rppal::gpio::Error,
    },

    #[error("failed to install handler for signal {signal}: {source}")]
    Trigger {
        signal: c_int,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
