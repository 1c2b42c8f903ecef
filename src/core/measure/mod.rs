//! Measurement scheduler
//!
//! Multiplexes a fixed set of acquisition tasks over one control loop with
//! no blocking waits. Each task gets a time slice; within it the scheduler
//! repeatedly starts a conversion, polls it to completion and accumulates
//! the readings. When the slice expires the round finalizes: the readings
//! average into the task's result, the result cache slot is marked fresh and
//! the cursor moves to the next task.
//!
//! Hardware that serializes channels (the converters) registers with
//! `must_finish`: its in-flight conversion is never abandoned at the slice
//! boundary; instead the task latches *should finish* and the round runs
//! until that conversion lands. Hardware that tolerates being cut off (the
//! frequency counter) is abandoned where the slice ends; an abandoned
//! measurement keeps running and the next round's polls pick it up.
//!
//! A round that accumulates no samples at all (a frequency below the
//! resolvable minimum, an absent signal) halves the previous finalized
//! reading instead of fabricating one from nothing, so a stale value decays
//! toward zero round by round.

mod types;

pub use types::{AcquisitionConfig, AcquisitionSource, MeasurementId, SliceClock, MAX_ACQUISITIONS};

use crate::core::fault::Fault;
use crate::require;
use embassy_time::Duration;

/// One registered acquisition task.
struct Acquisition<S> {
    select: S,
    must_finish: bool,
    convert: Option<fn(f64) -> f64>,
    slice: Duration,

    // Round state
    started: bool,
    should_finish: bool,
    sum: f64,
    samples: u16,

    // Finalized reading (raw average) and the converted result cache slot.
    reading: f64,
    value: f64,
    fresh: bool,
}

/// Measurement scheduler
///
/// Owns the task table and the result cache exclusively; drivers are reached
/// only through the [`AcquisitionSource`] passed to [`advance`].
///
/// [`advance`]: Scheduler::advance
pub struct Scheduler<C: SliceClock, S> {
    clock: C,
    tasks: heapless::Vec<Acquisition<S>, MAX_ACQUISITIONS>,
    active: usize,
    slice_started: bool,
}

impl<C: SliceClock, S> Scheduler<C, S> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tasks: heapless::Vec::new(),
            active: 0,
            slice_started: false,
        }
    }

    /// Register an acquisition task. Halts configuration if the table is
    /// full.
    pub fn register_task(&mut self, config: AcquisitionConfig<S>) -> MeasurementId {
        let id = MeasurementId(self.tasks.len() as u8);

        let task = Acquisition {
            select: config.select,
            must_finish: config.must_finish,
            convert: config.convert,
            slice: config.slice,
            started: false,
            should_finish: false,
            sum: 0.0,
            samples: 0,
            reading: 0.0,
            value: 0.0,
            fresh: false,
        };
        require!(self.tasks.push(task).is_ok(), Fault::TaskTableFull);

        id
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Drive the active task one step; called once per control-loop
    /// iteration.
    ///
    /// The first call for a task only starts its slice countdown. Interrupts
    /// must be enabled globally: the countdown and the edge-based drivers
    /// advance in interrupt context.
    pub fn advance<A>(&mut self, source: &mut A)
    where
        A: AcquisitionSource<Select = S>,
    {
        require!(!self.tasks.is_empty(), Fault::NoTasks);

        if !self.slice_started {
            let slice = self.tasks[self.active].slice;
            self.clock.start(slice);
            self.slice_started = true;
        } else if self.run_active(source) {
            // Round finalized: publish the converted result and move on.
            let task = &mut self.tasks[self.active];
            task.value = match task.convert {
                Some(convert) => convert(task.reading),
                None => task.reading,
            };
            task.fresh = true;

            self.slice_started = false;
            self.active = (self.active + 1) % self.tasks.len();
        }
    }

    /// Take a task's freshly finalized, unit-converted value. A fresh value
    /// is delivered exactly once; `None` until the next round finalizes.
    pub fn take_result(&mut self, id: MeasurementId) -> Option<f64> {
        let task = &mut self.tasks[id.index()];

        if task.fresh {
            task.fresh = false;
            Some(task.value)
        } else {
            None
        }
    }

    /// One step of the active task's acquisition cycle; true when the round
    /// finalized.
    fn run_active<A>(&mut self, source: &mut A) -> bool
    where
        A: AcquisitionSource<Select = S>,
    {
        let expired = self.clock.expired();
        let task = &mut self.tasks[self.active];
        let mut done = false;

        if expired && !task.should_finish {
            if !task.must_finish {
                // Abandon where the slice ends; an in-flight measurement
                // keeps running and a later round may complete it.
                done = true;
            } else if !task.started {
                done = true;
            } else {
                // Never cut off shared-hardware conversions: run the round
                // until the in-flight one lands.
                task.should_finish = true;
            }
        } else if !task.started {
            require!(!task.should_finish, Fault::ShouldFinishLatched);

            source.begin(&task.select);
            task.started = true;
        } else if let Some(raw) = source.poll(&task.select) {
            task.sum += raw;
            task.samples += 1;
            task.started = false;

            if task.should_finish {
                done = true;
            }
        }

        if done {
            if task.should_finish {
                debug_assert!(!task.started);
            }
            task.should_finish = false;

            if task.samples == 0 {
                // No data this round: decay the stale reading instead of
                // inventing one.
                task.reading /= 2.0;
            } else {
                task.reading = task.sum / f64::from(task.samples);
            }

            task.sum = 0.0;
            task.samples = 0;
        }

        done
    }
}
