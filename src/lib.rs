//! SynthEyes host shim - runs the SynthEyes eye-animation firmware as a
//! Linux process on a single-board computer.
//!
//! The firmware was written against a microcontroller's SPI and
//! random-number primitives. This library re-implements those primitives on
//! the host's SPI/GPIO drivers, and bridges Unix signals into the
//! expression-override flags the animation loop polls each frame.

pub mod config;
pub mod error;
pub mod expression;
pub mod host;
pub mod pins;
pub mod rng;
pub mod spi;

// Re-export main types for convenience
pub use config::{Config, PollingConfig, SpiConfig, TriggerMapping};
pub use error::ShimError;
pub use expression::{register_triggers, Expression, FlagTable, TriggerBinding};
pub use host::EyeHost;
pub use pins::{configure_pull_ups, HostPins, PullUpControl, StateEntry};
pub use rng::EyeRng;
pub use spi::SpiPort;
