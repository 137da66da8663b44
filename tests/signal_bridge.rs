use std::thread;
use std::time::Duration;

use libc::{SIGURG, SIGUSR1, SIGUSR2};
use signal_hook::low_level::raise;
use syntheyes_host::{register_triggers, Expression, FlagTable, TriggerBinding};

// Signal delivery is process-wide, so the whole scenario runs as a single
// test to keep registrations from interfering with each other.
#[test]
fn signal_triggers_end_to_end() {
    let flags = FlagTable::new();
    let bindings = [
        TriggerBinding {
            signal: SIGUSR1,
            expression: Expression::Annoyed,
        },
        TriggerBinding {
            signal: SIGUSR2,
            expression: Expression::Eyeroll,
        },
        TriggerBinding {
            signal: SIGURG,
            expression: Expression::Startled,
        },
    ];
    register_triggers(&flags, &bindings).expect("handler installation failed");

    // Nothing pending before any trigger
    for expression in Expression::ALL {
        assert!(!flags.poll_and_consume(expression));
    }

    // One trigger is consumed by exactly one poll
    raise(SIGUSR1).unwrap();
    wait_for(&flags, Expression::Annoyed);
    assert!(!flags.poll_and_consume(Expression::Annoyed));

    // Distinct triggers are independently observable, whatever the order
    raise(SIGURG).unwrap();
    raise(SIGUSR2).unwrap();
    wait_for(&flags, Expression::Eyeroll);
    wait_for(&flags, Expression::Startled);
    assert!(!flags.poll_and_consume(Expression::Eyeroll));
    assert!(!flags.poll_and_consume(Expression::Startled));

    // A trigger landing while the loop sits in a blocking transfer is
    // picked up by the next poll, once
    let trigger = thread::spawn(|| {
        thread::sleep(Duration::from_millis(50));
        raise(SIGURG).unwrap();
    });
    thread::sleep(Duration::from_millis(150)); // stand-in for a blocking SPI transfer
    trigger.join().unwrap();
    assert!(flags.poll_and_consume(Expression::Startled));
    assert!(!flags.poll_and_consume(Expression::Startled));
}

fn wait_for(flags: &FlagTable, expression: Expression) {
    for _ in 0..100 {
        if flags.poll_and_consume(expression) {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("no pending flag for {}", expression.name());
}
