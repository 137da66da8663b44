use log::{debug, info};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::config::SpiConfig;
use crate::error::ShimError;

/// Open SPI channel standing in for the microcontroller's SPI peripheral.
///
/// The handle owns the bus exclusively and is normally held until process
/// exit. `transfer` only exists on an opened port, so the firmware cannot
/// clock bytes out before setup has run.
pub struct SpiPort {
    spi: Spi,
    divisor: u32,
    scratch: Vec<u8>,
}

impl SpiPort {
    /// Acquire the host SPI bus. Failure here is a configuration problem;
    /// callers abort startup rather than retry.
    pub fn open(config: &SpiConfig) -> Result<Self, ShimError> {
        let bus = bus_from(config.bus)?;
        let chip_select = slave_select_from(config.chip_select)?;
        let mode = mode_from(config.mode)?;
        let speed = effective_clock(config.speed_hz, config.speed_divisor);

        let spi = Spi::new(bus, chip_select, speed, mode)
            .map_err(|source| ShimError::DeviceOpen { source })?;
        info!(
            "SPI bus {} CS {} opened at {} Hz (requested {} Hz)",
            config.bus, config.chip_select, speed, config.speed_hz
        );

        Ok(Self {
            spi,
            divisor: config.speed_divisor,
            scratch: Vec::new(),
        })
    }

    /// Re-clock the open channel, as the firmware's `beginTransaction`
    /// does. The configured divisor still applies, so the effective speed
    /// never exceeds the request.
    pub fn set_clock(&mut self, requested_hz: u32) -> Result<(), ShimError> {
        let speed = effective_clock(requested_hz, self.divisor);
        self.spi
            .set_clock_speed(speed)
            .map_err(|source| ShimError::DeviceOpen { source })?;
        debug!("SPI clock set to {} Hz (requested {} Hz)", speed, requested_hz);
        Ok(())
    }

    /// Blocking full-duplex exchange. On return the response bytes have
    /// replaced the contents of `buffer`, exactly like the firmware's
    /// `SPI.transfer`. Must not be called concurrently on one port; the
    /// receiver makes that a compile-time fact.
    pub fn transfer(&mut self, buffer: &mut [u8]) -> Result<(), ShimError> {
        self.scratch.clear();
        self.scratch.extend_from_slice(buffer);
        self.spi
            .transfer(buffer, &self.scratch)
            .map_err(|source| ShimError::Transfer { source })?;
        Ok(())
    }
}

fn bus_from(bus: u8) -> Result<Bus, ShimError> {
    match bus {
        0 => Ok(Bus::Spi0),
        1 => Ok(Bus::Spi1),
        2 => Ok(Bus::Spi2),
        other => Err(ShimError::InvalidConfig(format!(
            "unsupported SPI bus {}",
            other
        ))),
    }
}

fn slave_select_from(chip_select: u8) -> Result<SlaveSelect, ShimError> {
    match chip_select {
        0 => Ok(SlaveSelect::Ss0),
        1 => Ok(SlaveSelect::Ss1),
        2 => Ok(SlaveSelect::Ss2),
        other => Err(ShimError::InvalidConfig(format!(
            "unsupported SPI chip select {}",
            other
        ))),
    }
}

fn mode_from(mode: u8) -> Result<Mode, ShimError> {
    match mode {
        0 => Ok(Mode::Mode0),
        1 => Ok(Mode::Mode1),
        2 => Ok(Mode::Mode2),
        3 => Ok(Mode::Mode3),
        other => Err(ShimError::InvalidConfig(format!(
            "SPI mode {} out of range",
            other
        ))),
    }
}

/// Requested speed scaled down by the configured divisor. A divisor below 1
/// is treated as 1, and the result is kept above zero so the kernel driver
/// is never asked for a 0 Hz clock.
fn effective_clock(requested_hz: u32, divisor: u32) -> u32 {
    (requested_hz / divisor.max(1)).max(1)
}
