//! MCP342x external converter driver
//!
//! An 18-bit delta-sigma converter on the two-wire bus measuring the analog
//! output of the unit under test. One configuration byte selects channel,
//! gain and resolution and starts a conversion; the device then streams its
//! sample bytes followed by the configuration register on every read, with
//! the top configuration bit doubling as the conversion-in-progress flag.
//!
//! Conversions take 5–270 ms depending on resolution, so the driver splits
//! into `start` (configure, verify the echoed configuration, leave the bus
//! open for reading) and `poll` (one status read per call; on completion
//! fetch and decode the sample and release the bus).

use crate::core::fault::Fault;
use crate::devices::twi::Twi;
use crate::platform::traits::TwiInterface;
use crate::require;

/// Bus address with the write direction bit.
const ADDR_WRITE: u8 = 0b1101_0000;
/// Bus address with the read direction bit.
const ADDR_READ: u8 = 0b1101_0001;

/// Configuration bit 7: written, it starts a conversion; read back, it
/// reports the conversion still in progress.
const CFG_BUSY: u8 = 0b1000_0000;

/// The busy bit is not part of the configuration identity.
const CFG_COMPARE_MASK: u8 = 0b0111_1111;

/// Reference span of the converter in volts.
const FULL_SCALE_VOLTS: f64 = 2.048;

/// Input amplifier gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1 = 0b00,
    X2 = 0b01,
    X4 = 0b10,
    X8 = 0b11,
}

impl Gain {
    fn bits(self) -> u8 {
        self as u8
    }
}

/// Differential input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch1 = 0b00,
    Ch2 = 0b01,
    Ch3 = 0b10,
    Ch4 = 0b11,
}

impl Channel {
    fn bits(self) -> u8 {
        self as u8
    }
}

/// Sample resolution. Higher resolutions convert more slowly
/// (12 bit ≈ 5 ms ... 18 bit ≈ 270 ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Bits12 = 0b00,
    Bits14 = 0b01,
    Bits16 = 0b10,
    Bits18 = 0b11,
}

impl Resolution {
    fn code(self) -> u8 {
        self as u8
    }

    /// Width of the sample field in bits.
    fn bits(self) -> u32 {
        12 + 2 * u32::from(self.code())
    }

    /// Weight of one least-significant bit in volts.
    fn lsb_volts(self) -> f64 {
        match self {
            Resolution::Bits12 => 1e-3,
            Resolution::Bits14 => 250e-6,
            Resolution::Bits16 => 62.5e-6,
            Resolution::Bits18 => 15.625e-6,
        }
    }

    /// Mask covering the sample field, sign bit included.
    fn mask(self) -> u32 {
        0x0003_FFFF >> ((3 - u32::from(self.code())) * 2)
    }

    fn from_config(config: u8) -> Self {
        match (config >> 2) & 0b11 {
            0b00 => Resolution::Bits12,
            0b01 => Resolution::Bits14,
            0b10 => Resolution::Bits16,
            _ => Resolution::Bits18,
        }
    }
}

/// Two configurations are the same measurement if they agree outside the
/// busy bit.
fn config_matches(a: u8, b: u8) -> bool {
    (a & CFG_COMPARE_MASK) == (b & CFG_COMPARE_MASK)
}

/// Recover the signed sample from the raw field (two's complement in the
/// low `resolution.bits()` bits; anything above is bus padding).
fn fix_sign(resolution: Resolution, raw: u32) -> i32 {
    if raw & (1 << (resolution.bits() - 1)) != 0 {
        let mask = resolution.mask();
        let magnitude = ((raw & mask) ^ mask) + 1;
        -(magnitude as i32)
    } else {
        raw as i32
    }
}

/// Scale a signed sample to volts and check it against the reference span.
fn to_volts(resolution: Resolution, value: i32) -> f64 {
    let volts = f64::from(value) * resolution.lsb_volts();
    let magnitude = if volts < 0.0 { -volts } else { volts };

    // A magnitude past the reference span cannot come from the converter;
    // it means the decode or the bus went wrong.
    require!(magnitude <= FULL_SCALE_VOLTS, Fault::RangeExceeded);

    volts
}

/// Decode a sample from the raw bytes, most significant byte first. The
/// 18-bit mode uses all three bytes, the others the first two.
fn unpack(config: u8, bytes: &[u8; 3]) -> f64 {
    let resolution = Resolution::from_config(config);

    let raw = match resolution {
        Resolution::Bits12 | Resolution::Bits14 | Resolution::Bits16 => {
            u32::from(bytes[1]) | u32::from(bytes[0]) << 8
        }
        Resolution::Bits18 => {
            u32::from(bytes[2]) | u32::from(bytes[1]) << 8 | u32::from(bytes[0]) << 16
        }
    };

    to_volts(resolution, fix_sign(resolution, raw))
}

/// MCP342x external converter driver
pub struct Mcp342x<'a, T: TwiInterface> {
    bus: Twi<'a, T>,
    config: u8,
    started: bool,
}

impl<'a, T: TwiInterface> Mcp342x<'a, T> {
    pub fn new(hw: &'a T) -> Self {
        Self {
            bus: Twi::new(hw),
            config: 0,
            started: false,
        }
    }

    /// Start a conversion and verify the device accepted the configuration.
    ///
    /// Leaves the bus open in read mode; every subsequent [`poll`] continues
    /// the same read sequence until the conversion completes.
    ///
    /// [`poll`]: Mcp342x::poll
    pub fn start(&mut self, gain: Gain, channel: Channel, resolution: Resolution) {
        require!(!self.started, Fault::ConversionInFlight);

        let config = CFG_BUSY | gain.bits() | resolution.code() << 2 | channel.bits() << 5;

        self.bus.start();
        self.bus.select_slave(ADDR_WRITE);
        self.bus.write_byte(config);
        self.config = config;

        self.bus.repeated_start();
        self.bus.select_slave(ADDR_READ);

        // The sample bytes precede the configuration register in the
        // device's read sequence.
        let _ = self.bus.read_byte_ack();
        let _ = self.bus.read_byte_ack();
        let _ = self.bus.read_byte_ack();

        let echo = self.bus.read_byte_ack();
        require!(config_matches(self.config, echo), Fault::ConfigEchoMismatch);

        self.started = true;
    }

    /// Poll the conversion; `Some(volts)` once it completed.
    ///
    /// Reads one configuration byte per call. While the busy bit is set the
    /// bus stays open for the next poll; once clear, the read sequence is
    /// closed with a no-acknowledge, the sample bytes are fetched through a
    /// fresh read addressing, and the bus is released.
    pub fn poll(&mut self) -> Option<f64> {
        require!(self.started, Fault::NotStarted);

        let config = self.bus.read_byte_ack();
        require!(config_matches(self.config, config), Fault::ConfigEchoMismatch);

        if config & CFG_BUSY != 0 {
            return None;
        }

        // Close the open read sequence.
        let _ = self.bus.read_byte_nack();

        self.bus.repeated_start();
        self.bus.select_slave(ADDR_READ);

        let bytes = [
            self.bus.read_byte_ack(),
            self.bus.read_byte_ack(),
            self.bus.read_byte_nack(),
        ];
        let volts = unpack(config, &bytes);

        self.bus.stop();
        self.started = false;

        Some(volts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockTwi, TwiOp};

    fn config(gain: Gain, channel: Channel, resolution: Resolution) -> u8 {
        CFG_BUSY | gain.bits() | resolution.code() << 2 | channel.bits() << 5
    }

    #[test]
    fn positive_14_bit_sample_decodes_to_volts() {
        // 0x1F40 = 8000 LSB at 250 µV.
        let volts = unpack(
            config(Gain::X1, Channel::Ch1, Resolution::Bits14),
            &[0x1F, 0x40, 0x00],
        );
        assert!((volts - 2.0).abs() < 1e-9);
    }

    #[test]
    fn negative_one_decodes_to_minus_one_lsb() {
        // Sign bit set, remaining bits all one: -1 in two's complement.
        let volts = unpack(
            config(Gain::X1, Channel::Ch1, Resolution::Bits12),
            &[0xFF, 0xFF, 0x00],
        );
        assert!((volts + 1e-3).abs() < 1e-12);
    }

    #[test]
    fn eighteen_bit_mode_uses_all_three_bytes() {
        let cfg = config(Gain::X1, Channel::Ch1, Resolution::Bits18);

        let minus_one = unpack(cfg, &[0x03, 0xFF, 0xFF]);
        assert!((minus_one + 15.625e-6).abs() < 1e-12);

        let one_volt = unpack(cfg, &[0x01, 0x00, 0x00]);
        assert!((one_volt - 65536.0 * 15.625e-6).abs() < 1e-9);
    }

    #[test]
    fn sign_fix_round_trips_at_every_resolution() {
        for resolution in [
            Resolution::Bits12,
            Resolution::Bits14,
            Resolution::Bits16,
            Resolution::Bits18,
        ] {
            let bits = resolution.bits();
            let mask = resolution.mask();
            let patterns = [
                mask,                // -1
                1 << (bits - 1),     // most negative value
                (1 << (bits - 1)) | 1,
                (1 << (bits - 1)) - 1, // most positive value
                0,
                1,
            ];

            for raw in patterns {
                let value = fix_sign(resolution, raw);
                // Re-encode in two's complement and compare within the field.
                let encoded = (value as u32) & mask;
                assert_eq!(
                    encoded, raw,
                    "resolution {:?} raw {:#x} value {}",
                    resolution, raw, value
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "fatal fault RangeExceeded")]
    fn sample_past_reference_span_halts() {
        // 3000 LSB at 1 mV would be 3 V; the converter cannot produce it.
        to_volts(Resolution::Bits12, 3000);
    }

    #[test]
    fn start_writes_config_and_verifies_echo() {
        let hw = MockTwi::new();
        let cfg = config(Gain::X1, Channel::Ch2, Resolution::Bits14);
        // Three sample bytes, then the echoed configuration (busy cleared —
        // only the lower seven bits are compared).
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, cfg & CFG_COMPARE_MASK]);

        let mut adc = Mcp342x::new(&hw);
        adc.start(Gain::X1, Channel::Ch2, Resolution::Bits14);

        assert_eq!(
            hw.ops().as_slice(),
            &[
                TwiOp::Start,
                TwiOp::Select(ADDR_WRITE),
                TwiOp::Write(cfg),
                TwiOp::RepeatedStart,
                TwiOp::Select(ADDR_READ),
                TwiOp::ReadAck(0x00),
                TwiOp::ReadAck(0x00),
                TwiOp::ReadAck(0x00),
                TwiOp::ReadAck(cfg & CFG_COMPARE_MASK),
            ]
        );
    }

    #[test]
    fn poll_reports_busy_and_keeps_the_bus_open() {
        let hw = MockTwi::new();
        let cfg = config(Gain::X1, Channel::Ch2, Resolution::Bits14);
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, cfg]);

        let mut adc = Mcp342x::new(&hw);
        adc.start(Gain::X1, Channel::Ch2, Resolution::Bits14);
        hw.clear_ops();

        // Busy bit still set: not done, exactly one status read issued.
        hw.queue_read_bytes(&[cfg]);
        assert_eq!(adc.poll(), None);
        assert_eq!(hw.ops().as_slice(), &[TwiOp::ReadAck(cfg)]);
    }

    #[test]
    fn poll_fetches_sample_and_releases_the_bus() {
        let hw = MockTwi::new();
        let cfg = config(Gain::X1, Channel::Ch2, Resolution::Bits14);
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, cfg]);

        let mut adc = Mcp342x::new(&hw);
        adc.start(Gain::X1, Channel::Ch2, Resolution::Bits14);
        hw.clear_ops();

        let ready = cfg & CFG_COMPARE_MASK;
        hw.queue_read_bytes(&[ready, 0xFF, 0x1F, 0x40, 0x00]);

        let volts = adc.poll().unwrap();
        assert!((volts - 2.0).abs() < 1e-9);

        assert_eq!(
            hw.ops().as_slice(),
            &[
                TwiOp::ReadAck(ready),
                TwiOp::ReadNack(0xFF),
                TwiOp::RepeatedStart,
                TwiOp::Select(ADDR_READ),
                TwiOp::ReadAck(0x1F),
                TwiOp::ReadAck(0x40),
                TwiOp::ReadNack(0x00),
                TwiOp::Stop,
            ]
        );

        // The driver is idle again and may start the next conversion.
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, cfg]);
        adc.start(Gain::X1, Channel::Ch2, Resolution::Bits14);
    }

    #[test]
    #[should_panic(expected = "fatal fault ConversionInFlight")]
    fn double_start_halts() {
        let hw = MockTwi::new();
        let cfg = config(Gain::X2, Channel::Ch1, Resolution::Bits12);
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, cfg]);

        let mut adc = Mcp342x::new(&hw);
        adc.start(Gain::X2, Channel::Ch1, Resolution::Bits12);
        adc.start(Gain::X2, Channel::Ch1, Resolution::Bits12);
    }

    #[test]
    #[should_panic(expected = "fatal fault ConfigEchoMismatch")]
    fn wrong_configuration_echo_halts() {
        let hw = MockTwi::new();
        // Device echoes a different channel selection.
        hw.queue_read_bytes(&[0x00, 0x00, 0x00, 0x00]);

        let mut adc = Mcp342x::new(&hw);
        adc.start(Gain::X1, Channel::Ch2, Resolution::Bits14);
    }

    #[test]
    #[should_panic(expected = "fatal fault NotStarted")]
    fn poll_without_start_halts() {
        let hw = MockTwi::new();
        let mut adc = Mcp342x::new(&hw);
        adc.poll();
    }
}
