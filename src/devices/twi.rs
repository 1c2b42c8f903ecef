//! Two-wire bus transaction engine
//!
//! Drives the bus controller one primitive at a time. Each primitive blocks
//! only on the controller's own ready flag (bounded to microseconds by the
//! bus clock) and validates the resulting status code; a mismatch means a
//! firmware bug or a wiring fault and halts the rig. The engine keeps no
//! state between transactions.
//!
//! A full transaction is composed by the caller:
//!
//! ```ignore
//! bus.start();
//! bus.select_slave(ADDR_WRITE);
//! bus.write_byte(0xA4);
//! bus.repeated_start();
//! bus.select_slave(ADDR_READ);
//! let hi = bus.read_byte_ack();
//! let lo = bus.read_byte_nack();
//! bus.stop();
//! ```

use crate::core::fault::Fault;
use crate::platform::traits::twi::{status, TwiControl, TwiInterface};
use crate::require;

/// Control bits common to every primitive.
const BASE: TwiControl = TwiControl::ENABLE.union(TwiControl::CLEAR_INT);

/// Two-wire bus transaction engine
pub struct Twi<'a, T: TwiInterface> {
    hw: &'a T,
}

impl<'a, T: TwiInterface> Twi<'a, T> {
    pub fn new(hw: &'a T) -> Self {
        Self { hw }
    }

    /// Issue one primitive and check the controller's status against the
    /// expected code.
    fn transfer(&self, extra: TwiControl, expected: u8) {
        self.hw.command(BASE | extra);
        self.hw.wait_ready();
        require!(self.hw.status() == expected, Fault::BusProtocol);
    }

    /// Generate a START condition, claiming the bus.
    pub fn start(&self) {
        self.transfer(TwiControl::START, status::START);
    }

    /// Generate a repeated START condition on the claimed bus.
    pub fn repeated_start(&self) {
        self.transfer(TwiControl::START, status::REPEATED_START);
    }

    /// Address a slave. Bit 0 of `address` selects the direction (1 = read);
    /// the expected status differs accordingly.
    pub fn select_slave(&self, address: u8) {
        let read = address & 0x01 != 0;

        self.hw.write_data(address);
        self.transfer(
            TwiControl::empty(),
            if read {
                status::SLA_R_ACK
            } else {
                status::SLA_W_ACK
            },
        );
    }

    /// Write one byte to the addressed slave.
    pub fn write_byte(&self, byte: u8) {
        self.hw.write_data(byte);
        self.transfer(TwiControl::empty(), status::WRITE_ACK);
    }

    /// Read one byte from the addressed slave, returning an acknowledge.
    pub fn read_byte_ack(&self) -> u8 {
        self.transfer(TwiControl::ACK, status::READ_ACK);
        self.hw.read_data()
    }

    /// Read one byte from the addressed slave without acknowledging,
    /// ending the slave's transmission.
    pub fn read_byte_nack(&self) -> u8 {
        self.transfer(TwiControl::empty(), status::READ_NACK);
        self.hw.read_data()
    }

    /// Generate a STOP condition, releasing the bus. Produces no status.
    pub fn stop(&self) {
        self.hw.command(BASE | TwiControl::STOP);
        self.hw.wait_stopped();
    }
}
