//! Mock two-wire bus controller
//!
//! Implements [`TwiInterface`] as a small bus model: it tracks the
//! transaction phase (idle, started, addressed) and derives the status code
//! the real controller would report for each primitive, so the transaction
//! engine's status checking runs unmodified against it. Tests pre-program
//! the bytes the addressed slave returns and inspect the recorded operation
//! log afterwards.

use crate::platform::traits::twi::{status, TwiControl, TwiInterface};
use core::cell::{Cell, RefCell};

/// One recorded bus primitive, including the data byte it moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwiOp {
    Start,
    RepeatedStart,
    /// Address + direction byte placed on the bus.
    Select(u8),
    Write(u8),
    ReadAck(u8),
    ReadNack(u8),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    AddressedWrite,
    AddressedRead,
}

/// Mock two-wire bus controller
pub struct MockTwi {
    phase: Cell<Phase>,
    status: Cell<u8>,
    data: Cell<u8>,
    ops: RefCell<heapless::Vec<TwiOp, 256>>,
    read_data: RefCell<heapless::Deque<u8, 64>>,
}

impl MockTwi {
    /// Create a new mock controller with an idle bus.
    pub fn new() -> Self {
        Self {
            phase: Cell::new(Phase::Idle),
            status: Cell::new(0),
            data: Cell::new(0),
            ops: RefCell::new(heapless::Vec::new()),
            read_data: RefCell::new(heapless::Deque::new()),
        }
    }

    /// Queue bytes the addressed slave will return on subsequent reads.
    pub fn queue_read_bytes(&self, bytes: &[u8]) {
        let mut queue = self.read_data.borrow_mut();
        for &byte in bytes {
            queue.push_back(byte).unwrap();
        }
    }

    /// Operation log (for test verification).
    pub fn ops(&self) -> heapless::Vec<TwiOp, 256> {
        self.ops.borrow().clone()
    }

    /// Clear the operation log.
    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    fn log(&self, op: TwiOp) {
        // Long-running tests outlive the log; dropped entries are fine there.
        let _ = self.ops.borrow_mut().push(op);
    }
}

impl Default for MockTwi {
    fn default() -> Self {
        Self::new()
    }
}

impl TwiInterface for MockTwi {
    fn command(&self, control: TwiControl) {
        if control.contains(TwiControl::START) {
            if self.phase.get() == Phase::Idle {
                self.log(TwiOp::Start);
                self.status.set(status::START);
            } else {
                self.log(TwiOp::RepeatedStart);
                self.status.set(status::REPEATED_START);
            }
            self.phase.set(Phase::Started);
        } else if control.contains(TwiControl::STOP) {
            self.log(TwiOp::Stop);
            self.phase.set(Phase::Idle);
        } else {
            match self.phase.get() {
                Phase::Started => {
                    // Data register holds the address + direction byte.
                    let address = self.data.get();
                    self.log(TwiOp::Select(address));
                    if address & 0x01 != 0 {
                        self.phase.set(Phase::AddressedRead);
                        self.status.set(status::SLA_R_ACK);
                    } else {
                        self.phase.set(Phase::AddressedWrite);
                        self.status.set(status::SLA_W_ACK);
                    }
                }
                Phase::AddressedWrite => {
                    self.log(TwiOp::Write(self.data.get()));
                    self.status.set(status::WRITE_ACK);
                }
                Phase::AddressedRead => {
                    let byte = self.read_data.borrow_mut().pop_front().unwrap_or(0);
                    self.data.set(byte);
                    if control.contains(TwiControl::ACK) {
                        self.log(TwiOp::ReadAck(byte));
                        self.status.set(status::READ_ACK);
                    } else {
                        self.log(TwiOp::ReadNack(byte));
                        self.status.set(status::READ_NACK);
                    }
                }
                // Transfer on an idle bus: report a status no primitive
                // expects so the engine's check trips.
                Phase::Idle => self.status.set(0x00),
            }
        }
    }

    fn wait_ready(&self) {}

    fn wait_stopped(&self) {}

    fn status(&self) -> u8 {
        self.status.get()
    }

    fn write_data(&self, byte: u8) {
        self.data.set(byte);
    }

    fn read_data(&self) -> u8 {
        self.data.get()
    }
}
