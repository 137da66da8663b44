use log::info;
use rppal::gpio::{Gpio, InputPin};

use crate::error::ShimError;

/// Animation identifier as the externally owned state table names it. Only
/// presence matters to the shim; the terminating row has none.
pub type AnimId = u16;

/// One row of the animation state table. The table belongs to the
/// animation module; the shim reads `pin` to know what to pull up and
/// `anim` to find the end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEntry {
    pub pin: Option<u8>,
    pub anim: Option<AnimId>,
}

impl StateEntry {
    /// Terminating row.
    pub const END: StateEntry = StateEntry {
        pin: None,
        anim: None,
    };

    pub fn is_end(&self) -> bool {
        self.anim.is_none()
    }
}

/// Pull-up application seam. [`HostPins`] talks to the GPIO controller;
/// tests substitute a recorder.
pub trait PullUpControl {
    fn set_pull_up(&mut self, pin: u8) -> Result<(), ShimError>;
}

/// GPIO-backed pull-up control. Configured pins are held for the life of
/// the process so the pull state is not reset behind the firmware's back.
pub struct HostPins {
    gpio: Gpio,
    held: Vec<InputPin>,
}

impl HostPins {
    pub fn new() -> Result<Self, ShimError> {
        let gpio = Gpio::new()?;
        Ok(Self {
            gpio,
            held: Vec::new(),
        })
    }
}

impl PullUpControl for HostPins {
    fn set_pull_up(&mut self, pin: u8) -> Result<(), ShimError> {
        // Already configured; pulling up twice is a no-op
        if self.held.iter().any(|held| held.pin() == pin) {
            return Ok(());
        }
        let input = self.gpio.get(pin)?.into_input_pullup();
        self.held.push(input);
        Ok(())
    }
}

/// Walk the state table up to the terminating row and pull up every
/// trigger pin named there. Rows without a pin are skipped; a table that
/// terminates immediately configures nothing.
pub fn configure_pull_ups<P: PullUpControl>(
    pins: &mut P,
    states: &[StateEntry],
) -> Result<(), ShimError> {
    let mut configured = 0usize;
    for entry in states {
        if entry.is_end() {
            break;
        }
        if let Some(pin) = entry.pin {
            pins.set_pull_up(pin)?;
            configured += 1;
        }
    }
    info!("Configured {} trigger pin(s) with pull-ups", configured);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPins {
        pulled: Vec<u8>,
    }

    impl PullUpControl for RecordingPins {
        fn set_pull_up(&mut self, pin: u8) -> Result<(), ShimError> {
            self.pulled.push(pin);
            Ok(())
        }
    }

    fn entry(pin: Option<u8>, anim: AnimId) -> StateEntry {
        StateEntry {
            pin,
            anim: Some(anim),
        }
    }

    #[test]
    fn empty_table_configures_nothing() {
        let mut pins = RecordingPins::default();
        configure_pull_ups(&mut pins, &[StateEntry::END]).unwrap();
        assert!(pins.pulled.is_empty());
    }

    #[test]
    fn zero_length_table_configures_nothing() {
        let mut pins = RecordingPins::default();
        configure_pull_ups(&mut pins, &[]).unwrap();
        assert!(pins.pulled.is_empty());
    }

    #[test]
    fn every_named_pin_is_pulled_up() {
        let mut pins = RecordingPins::default();
        let states = [
            entry(Some(2), 10),
            entry(None, 11),
            entry(Some(3), 12),
            entry(Some(1), 13),
            StateEntry::END,
        ];
        configure_pull_ups(&mut pins, &states).unwrap();
        assert_eq!(pins.pulled, vec![2, 3, 1]);
    }

    #[test]
    fn iteration_stops_at_the_terminator() {
        let mut pins = RecordingPins::default();
        let states = [
            entry(Some(4), 20),
            StateEntry::END,
            entry(Some(5), 21),
        ];
        configure_pull_ups(&mut pins, &states).unwrap();
        assert_eq!(pins.pulled, vec![4]);
    }
}
