//! Fatal-fault policy
//!
//! Every contract violation in this firmware (double-started conversion,
//! unexpected bus status, full task table, ...) indicates a firmware bug or a
//! wiring fault, never a transient condition worth retrying. The policy is
//! therefore to halt: [`fail`] logs the fault kind with the caller's
//! file/line and never returns. On hardware builds the core parks in a spin
//! loop so the watchdog or a debugger can take over; on the host it panics,
//! which lets tests capture violations with `#[should_panic]`.
//!
//! Transient non-completion ("conversion still busy", "no edge yet") is not
//! a fault; drivers report it as `None` and are simply polled again.

/// Fault kinds raised by the measurement core.
///
/// The taxonomy is deliberately flat: every variant is unrecoverable by
/// design, the kind only exists so the halted rig can report *what* was
/// violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// `register_task` called with all task slots occupied.
    TaskTableFull,
    /// `advance` called before any task was registered.
    NoTasks,
    /// A driver was started while its conversion was still in flight.
    ConversionInFlight,
    /// A driver was polled without a started conversion.
    NotStarted,
    /// A task tried to start a conversion while latched to finish.
    ShouldFinishLatched,
    /// A bus primitive completed with an unexpected status code.
    BusProtocol,
    /// The external converter did not echo the configuration it was sent.
    ConfigEchoMismatch,
    /// A decoded sample exceeds the converter's reference span.
    RangeExceeded,
    /// A time slice was started while the previous one was still counting.
    SliceBusy,
    /// A requested slice duration quantizes to zero timer ticks.
    SliceTooShort,
    /// A requested slice duration exceeds the countdown range.
    SliceTooLong,
}

/// Halt the firmware because a contract was violated.
///
/// Never returns. The host environment decides what "halt" means: process
/// panic on the host (test harnesses catch it), a parked spin loop on
/// `target_os = "none"` builds.
#[track_caller]
pub fn fail(fault: Fault) -> ! {
    let location = core::panic::Location::caller();

    #[cfg(all(feature = "defmt", target_os = "none"))]
    defmt::error!(
        "fatal fault {} at {=str}:{=u32}",
        fault,
        location.file(),
        location.line()
    );

    #[cfg(not(target_os = "none"))]
    panic!(
        "fatal fault {:?} at {}:{}",
        fault,
        location.file(),
        location.line()
    );

    #[cfg(target_os = "none")]
    {
        let _ = location;
        loop {
            core::hint::spin_loop();
        }
    }
}

/// Assert a contract, halting with the given [`Fault`] when it does not hold.
#[macro_export]
macro_rules! require {
    ($cond:expr, $fault:expr) => {
        if !$cond {
            $crate::core::fault::fail($fault);
        }
    };
}
