use libc::c_int;
use log::info;
use signal_hook::SigId;

use crate::config::Config;
use crate::error::ShimError;
use crate::expression::{self, Expression, FlagTable, TriggerBinding};
use crate::pins::{self, PullUpControl, StateEntry};
use crate::rng::EyeRng;
use crate::spi::SpiPort;

/// Everything the firmware's main loop needs from the host, in one place:
/// the open SPI channel, the pending-expression flags, and the RNG. The
/// one value is handed to both trigger registration and the animation
/// loop, replacing the firmware's file-scope globals.
pub struct EyeHost {
    spi: SpiPort,
    flags: FlagTable,
    bindings: Vec<TriggerBinding>,
    rng: EyeRng,
    trigger_ids: Vec<SigId>,
}

impl EyeHost {
    /// Validate the configuration and acquire the SPI bus. Any failure is
    /// fatal to startup.
    pub fn new(config: &Config) -> Result<Self, ShimError> {
        config.validate()?;
        let spi = SpiPort::open(&config.spi)?;
        let bindings = config.bindings();
        info!("Tracking {} trigger binding(s)", bindings.len());

        Ok(Self {
            spi,
            flags: FlagTable::new(),
            bindings,
            rng: EyeRng::new(),
            trigger_ids: Vec::new(),
        })
    }

    /// Install the signal handlers. Call once, before the animation loop
    /// starts polling.
    pub fn register_triggers(&mut self) -> Result<(), ShimError> {
        self.trigger_ids = expression::register_triggers(&self.flags, &self.bindings)?;
        info!("Installed {} trigger handler(s)", self.trigger_ids.len());
        Ok(())
    }

    /// Pull up every trigger pin named in the animation state table.
    pub fn configure_pull_ups<P: PullUpControl>(
        &self,
        pins: &mut P,
        states: &[StateEntry],
    ) -> Result<(), ShimError> {
        pins::configure_pull_ups(pins, states)
    }

    /// Atomically consume a pending override for `expression`. Called once
    /// per tracked expression per frame.
    pub fn check_expression(&self, expression: Expression) -> bool {
        self.flags.poll_and_consume(expression)
    }

    /// Feed a trigger in by signal number, bypassing delivery. Unbound
    /// signals are ignored.
    pub fn notify(&self, signal: c_int) {
        expression::notify(&self.flags, &self.bindings, signal);
    }

    /// Blocking display transfer; see [`SpiPort::transfer`].
    pub fn transfer(&mut self, buffer: &mut [u8]) -> Result<(), ShimError> {
        self.spi.transfer(buffer)
    }

    /// Re-clock the SPI channel; see [`SpiPort::set_clock`].
    pub fn set_clock(&mut self, requested_hz: u32) -> Result<(), ShimError> {
        self.spi.set_clock(requested_hz)
    }

    pub fn rng_mut(&mut self) -> &mut EyeRng {
        &mut self.rng
    }
}
