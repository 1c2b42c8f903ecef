//! End-to-end acquisition tests
//!
//! Wires the scheduler, the real drivers and the mock platform together and
//! runs complete measurement rounds the way the control loop would,
//! simulating the interrupt halves from the test.

use t400_rig::core::measure::{MeasurementId, Scheduler};
use t400_rig::devices::freq_counter::{FreqCapture, FreqCounter, FreqShared};
use t400_rig::devices::int_adc::IntAdc;
use t400_rig::devices::mcp342x::Mcp342x;
use t400_rig::devices::slice_timer::{SliceShared, SliceTick, SliceTimer};
use t400_rig::platform::mock::{MockAdc, MockCapture, MockSliceTimer, MockTwi};
use t400_rig::rig::{register_measurements, RigSources, SourceSelect};

/// Configuration byte of the analog-output measurement: conversion start,
/// channel 2, 14 bit, gain ×1.
const ANALOG_CONFIG: u8 = 0b1010_0100;

/// Run the 150 ms slice out (9 hardware ticks).
fn expire_slice(tick: &SliceTick<'_, MockSliceTimer>) {
    for _ in 0..9 {
        tick.on_tick();
    }
}

struct Rig<'a> {
    scheduler: Scheduler<SliceTimer<'a, MockSliceTimer>, SourceSelect>,
    sources: RigSources<'a, MockAdc, MockTwi, MockCapture>,
    slice_tick: SliceTick<'a, MockSliceTimer>,
    freq_capture: FreqCapture<'a, MockCapture>,
}

fn build<'a>(
    adc_hw: &'a MockAdc,
    twi_hw: &'a MockTwi,
    capture_hw: &'a MockCapture,
    freq_shared: &'a FreqShared,
    slice_hw: &'a MockSliceTimer,
    slice_shared: &'a SliceShared,
) -> Rig<'a> {
    let (slice_timer, slice_tick) = SliceTimer::split(slice_hw, slice_shared);
    let (freq, freq_capture) = FreqCounter::split(capture_hw, freq_shared);

    Rig {
        scheduler: Scheduler::new(slice_timer),
        sources: RigSources::new(IntAdc::new(adc_hw), Mcp342x::new(twi_hw), freq),
        slice_tick,
        freq_capture,
    }
}

/// Drive one converter round to completion: slice start, begin, slice
/// expiry while the conversion is in flight, latched finish.
fn run_converter_round(rig: &mut Rig<'_>) {
    rig.scheduler.advance(&mut rig.sources); // slice start
    rig.scheduler.advance(&mut rig.sources); // begin
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources); // latch should-finish
    rig.scheduler.advance(&mut rig.sources); // conversion lands, finalize
}

fn take(rig: &mut Rig<'_>, id: MeasurementId) -> f64 {
    rig.scheduler.take_result(id).expect("no fresh value")
}

#[test]
fn all_four_measurements_produce_converted_values() {
    let adc_hw = MockAdc::new();
    let twi_hw = MockTwi::new();
    let capture_hw = MockCapture::new();
    let freq_shared = FreqShared::new();
    let slice_hw = MockSliceTimer::new();
    let slice_shared = SliceShared::new();

    let mut rig = build(
        &adc_hw,
        &twi_hw,
        &capture_hw,
        &freq_shared,
        &slice_hw,
        &slice_shared,
    );
    let measurements = register_measurements(&mut rig.scheduler);

    // Round 1: supply current. 500 LSB = 2.0 V at the monitor = 2000 mA.
    adc_hw.set_sample(500);
    run_converter_round(&mut rig);
    assert_eq!(adc_hw.selected(), Some(t400_rig::platform::AdcChannel::Ch7));
    let current = take(&mut rig, measurements.supply_current);
    assert!((current - 2000.0).abs() < 1e-9);

    // Round 2: sensor supply. 250 LSB = 1.0 V below the divider.
    adc_hw.set_sample(250);
    run_converter_round(&mut rig);
    assert_eq!(adc_hw.selected(), Some(t400_rig::platform::AdcChannel::Ch6));
    let supply = take(&mut rig, measurements.sensor_supply);
    assert!((supply - 1.0 / 1.7e3 * 6.7e3).abs() < 1e-9);

    // Round 3: open-collector frequency, 16000 ticks = 1000 Hz.
    rig.scheduler.advance(&mut rig.sources); // slice start
    rig.scheduler.advance(&mut rig.sources); // begin
    rig.freq_capture.on_edge();
    for _ in 0..62 {
        rig.freq_capture.on_overflow();
    }
    capture_hw.set_count(128);
    rig.freq_capture.on_edge();
    rig.scheduler.advance(&mut rig.sources); // sample lands
    rig.scheduler.advance(&mut rig.sources); // next measurement begins
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources); // abandoned at the boundary
    let hertz = take(&mut rig, measurements.oc_frequency);
    assert!((hertz - 1000.0).abs() < 1e-6);

    // Round 4: analog output. 0x1F40 = 8000 LSB at 250 µV = 2.0 V.
    rig.scheduler.advance(&mut rig.sources); // slice start
    twi_hw.queue_read_bytes(&[0x00, 0x00, 0x00, ANALOG_CONFIG & 0x7F]);
    rig.scheduler.advance(&mut rig.sources); // begin: configure + echo check
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources); // latch should-finish
    twi_hw.queue_read_bytes(&[ANALOG_CONFIG & 0x7F, 0xFF, 0x1F, 0x40, 0x00]);
    rig.scheduler.advance(&mut rig.sources); // ready: fetch, decode, finalize
    let analog = take(&mut rig, measurements.analog_output);
    assert!((analog - 2.0 / 1e3 * 10.1e3).abs() < 1e-9);

    // Fresh values were each delivered exactly once.
    assert_eq!(rig.scheduler.take_result(measurements.supply_current), None);
    assert_eq!(rig.scheduler.take_result(measurements.analog_output), None);

    // Round 5: the cursor wrapped back to the supply current.
    adc_hw.set_sample(250);
    run_converter_round(&mut rig);
    let current = take(&mut rig, measurements.supply_current);
    assert!((current - 1000.0).abs() < 1e-9);
}

#[test]
fn absent_frequency_signal_decays_the_reading() {
    let adc_hw = MockAdc::new();
    let twi_hw = MockTwi::new();
    let capture_hw = MockCapture::new();
    let freq_shared = FreqShared::new();
    let slice_hw = MockSliceTimer::new();
    let slice_shared = SliceShared::new();

    let mut rig = build(
        &adc_hw,
        &twi_hw,
        &capture_hw,
        &freq_shared,
        &slice_hw,
        &slice_shared,
    );

    let measurements = register_measurements(&mut rig.scheduler);

    // Rounds 1 and 2: converter tasks, completed quickly.
    adc_hw.set_sample(100);
    run_converter_round(&mut rig);
    run_converter_round(&mut rig);

    // Round 3: a 1000 Hz signal.
    rig.scheduler.advance(&mut rig.sources);
    rig.scheduler.advance(&mut rig.sources);
    rig.freq_capture.on_edge();
    for _ in 0..62 {
        rig.freq_capture.on_overflow();
    }
    capture_hw.set_count(128);
    rig.freq_capture.on_edge();
    rig.scheduler.advance(&mut rig.sources);
    rig.scheduler.advance(&mut rig.sources);
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources);
    assert!((take(&mut rig, measurements.oc_frequency) - 1000.0).abs() < 1e-6);

    // Round 4: analog output, completed.
    rig.scheduler.advance(&mut rig.sources);
    twi_hw.queue_read_bytes(&[0x00, 0x00, 0x00, ANALOG_CONFIG & 0x7F]);
    rig.scheduler.advance(&mut rig.sources);
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources);
    twi_hw.queue_read_bytes(&[ANALOG_CONFIG & 0x7F, 0xFF, 0x00, 0x64, 0x00]);
    rig.scheduler.advance(&mut rig.sources);

    // Rounds 5 and 6: converters again.
    run_converter_round(&mut rig);
    run_converter_round(&mut rig);

    // Round 7: the signal is gone. The previous frequency measurement is
    // still pending from round 3's abandoned start; no edge ever completes
    // it, so the round accumulates nothing and the reading halves.
    rig.scheduler.advance(&mut rig.sources); // slice start
    rig.scheduler.advance(&mut rig.sources); // still in flight: poll, no sample
    expire_slice(&rig.slice_tick);
    rig.scheduler.advance(&mut rig.sources); // zero samples, decay

    assert!((take(&mut rig, measurements.oc_frequency) - 500.0).abs() < 1e-6);
}
