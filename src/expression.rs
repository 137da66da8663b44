use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::c_int;
use log::debug;
use serde::{Deserialize, Serialize};
use signal_hook::SigId;

use crate::error::ShimError;

/// Override expressions that can be requested from outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Annoyed,
    Eyeroll,
    Startled,
}

pub const EXPRESSION_COUNT: usize = 3;

impl Expression {
    pub const ALL: [Expression; EXPRESSION_COUNT] =
        [Expression::Annoyed, Expression::Eyeroll, Expression::Startled];

    pub fn name(self) -> &'static str {
        match self {
            Expression::Annoyed => "annoyed",
            Expression::Eyeroll => "eyeroll",
            Expression::Startled => "startled",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A trigger signal resolved to the expression it raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerBinding {
    pub signal: c_int,
    pub expression: Expression,
}

/// Pending-override flags, one per expression.
///
/// Signal handlers are the only writers and the polling loop is the only
/// reader. Each flag is an independent atomic, so test-and-clear is a
/// single `swap` with no lock; a trigger that lands between the check and
/// the clear can neither be lost nor observed twice.
#[derive(Debug, Default)]
pub struct FlagTable {
    flags: [Arc<AtomicBool>; EXPRESSION_COUNT],
}

impl FlagTable {
    /// All flags start clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an expression pending. This is all a signal handler does.
    pub fn raise(&self, expression: Expression) {
        self.flags[expression.index()].store(true, Ordering::SeqCst);
    }

    /// Atomically observe and clear the pending flag. Each trigger is
    /// consumed by exactly one poll; a second poll with no new trigger
    /// returns false.
    pub fn poll_and_consume(&self, expression: Expression) -> bool {
        self.flags[expression.index()].swap(false, Ordering::SeqCst)
    }

    fn flag(&self, expression: Expression) -> Arc<AtomicBool> {
        Arc::clone(&self.flags[expression.index()])
    }
}

/// Install one handler per binding.
///
/// The handler body is a single atomic store into the flag table, which is
/// async-signal-safe; everything else happens on the polling side. The
/// returned ids stay valid for the life of the process.
pub fn register_triggers(
    flags: &FlagTable,
    bindings: &[TriggerBinding],
) -> Result<Vec<SigId>, ShimError> {
    let mut ids = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let id = signal_hook::flag::register(binding.signal, flags.flag(binding.expression))
            .map_err(|source| ShimError::Trigger {
                signal: binding.signal,
                source,
            })?;
        debug!("Signal {} raises {}", binding.signal, binding.expression.name());
        ids.push(id);
    }
    Ok(ids)
}

/// Route a signal number through the bindings by hand. Signals with no
/// binding are ignored, never an error. Normal delivery goes through the
/// handlers installed by [`register_triggers`]; this is the same mapping
/// for callers that learn of the event some other way.
pub fn notify(flags: &FlagTable, bindings: &[TriggerBinding], signal: c_int) {
    if let Some(binding) = bindings.iter().find(|b| b.signal == signal) {
        flags.raise(binding.expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Vec<TriggerBinding> {
        vec![
            TriggerBinding {
                signal: libc::SIGUSR1,
                expression: Expression::Annoyed,
            },
            TriggerBinding {
                signal: libc::SIGUSR2,
                expression: Expression::Eyeroll,
            },
            TriggerBinding {
                signal: libc::SIGURG,
                expression: Expression::Startled,
            },
        ]
    }

    #[test]
    fn flags_start_clear() {
        let flags = FlagTable::new();
        for expression in Expression::ALL {
            assert!(!flags.poll_and_consume(expression));
        }
    }

    #[test]
    fn one_trigger_is_consumed_by_one_poll() {
        let flags = FlagTable::new();
        flags.raise(Expression::Startled);
        assert!(flags.poll_and_consume(Expression::Startled));
        assert!(!flags.poll_and_consume(Expression::Startled));
    }

    #[test]
    fn expressions_are_independent() {
        let flags = FlagTable::new();
        flags.raise(Expression::Eyeroll);
        flags.raise(Expression::Annoyed);
        assert!(!flags.poll_and_consume(Expression::Startled));
        assert!(flags.poll_and_consume(Expression::Annoyed));
        assert!(flags.poll_and_consume(Expression::Eyeroll));
        assert!(!flags.poll_and_consume(Expression::Annoyed));
        assert!(!flags.poll_and_consume(Expression::Eyeroll));
    }

    #[test]
    fn notify_routes_by_binding() {
        let flags = FlagTable::new();
        notify(&flags, &bindings(), libc::SIGUSR2);
        assert!(flags.poll_and_consume(Expression::Eyeroll));
        assert!(!flags.poll_and_consume(Expression::Annoyed));
    }

    #[test]
    fn unbound_signal_is_ignored() {
        let flags = FlagTable::new();
        notify(&flags, &bindings(), libc::SIGHUP);
        for expression in Expression::ALL {
            assert!(!flags.poll_and_consume(expression));
        }
    }
}
