//! T400 bench measurement set
//!
//! Registers the four quantities the rig measures and dispatches each
//! scheduled acquisition to its driver:
//!
//! - supply current, on-chip converter channel 7 (current-monitor output)
//! - sensor supply voltage, on-chip converter channel 6
//! - open-collector frequency, edge-timing counter
//! - analog output, external converter channel 2 (gain ×1, 14 bit)
//!
//! The converter channels are `must_finish`: both converters serialize
//! channels through shared hardware. The frequency measurement is not — it
//! already handles signals below its resolvable minimum by producing no
//! sample, so the slice boundary may cut it off.

use crate::core::measure::{
    AcquisitionConfig, AcquisitionSource, MeasurementId, Scheduler, SliceClock,
};
use crate::devices::freq_counter::FreqCounter;
use crate::devices::int_adc::IntAdc;
use crate::devices::mcp342x::{Channel, Gain, Mcp342x, Resolution};
use crate::platform::traits::{AdcChannel, AdcInterface, CaptureInterface, TwiInterface};
use embassy_time::Duration;

/// All measurements share one slice length.
const SLICE: Duration = Duration::from_millis(150);

const SUPPLY_CURRENT_CHANNEL: AdcChannel = AdcChannel::Ch7;
const SENSOR_SUPPLY_CHANNEL: AdcChannel = AdcChannel::Ch6;
const ANALOG_OUTPUT_CHANNEL: Channel = Channel::Ch2;

/// Current-monitor output of the 40.2 Ω shunt stage: 1 V per ampere, in mA.
fn convert_supply_current(volts: f64) -> f64 {
    volts * 1e3
}

/// Sensor supply divider, 1.7 kΩ lower leg of 6.7 kΩ.
fn convert_sensor_supply(volts: f64) -> f64 {
    volts / 1.7e3 * 6.7e3
}

/// Analog output divider, 1 kΩ lower leg of 10.1 kΩ.
fn convert_analog_output(volts: f64) -> f64 {
    volts / 1e3 * 10.1e3
}

/// Hardware source of one scheduled acquisition.
#[derive(Debug, Clone, Copy)]
pub enum SourceSelect {
    /// On-chip converter, one multiplexer channel.
    Internal(AdcChannel),
    /// External converter on the two-wire bus.
    External {
        gain: Gain,
        channel: Channel,
        resolution: Resolution,
    },
    /// Edge-timing frequency counter.
    Frequency,
}

/// The rig's driver bundle behind the scheduler.
pub struct RigSources<'a, A, T, H>
where
    A: AdcInterface,
    T: TwiInterface,
    H: CaptureInterface,
{
    int_adc: IntAdc<'a, A>,
    ext_adc: Mcp342x<'a, T>,
    freq: FreqCounter<'a, H>,
}

impl<'a, A, T, H> RigSources<'a, A, T, H>
where
    A: AdcInterface,
    T: TwiInterface,
    H: CaptureInterface,
{
    pub fn new(int_adc: IntAdc<'a, A>, ext_adc: Mcp342x<'a, T>, freq: FreqCounter<'a, H>) -> Self {
        Self {
            int_adc,
            ext_adc,
            freq,
        }
    }
}

impl<A, T, H> AcquisitionSource for RigSources<'_, A, T, H>
where
    A: AdcInterface,
    T: TwiInterface,
    H: CaptureInterface,
{
    type Select = SourceSelect;

    fn begin(&mut self, select: &SourceSelect) {
        match select {
            SourceSelect::Internal(channel) => self.int_adc.start(*channel),
            SourceSelect::External {
                gain,
                channel,
                resolution,
            } => self.ext_adc.start(*gain, *channel, *resolution),
            SourceSelect::Frequency => self.freq.start(),
        }
    }

    fn poll(&mut self, select: &SourceSelect) -> Option<f64> {
        match select {
            SourceSelect::Internal(_) => self.int_adc.poll(),
            SourceSelect::External { .. } => self.ext_adc.poll(),
            SourceSelect::Frequency => self.freq.poll(),
        }
    }
}

/// Identifiers of the rig's registered measurements.
pub struct RigMeasurements {
    pub supply_current: MeasurementId,
    pub sensor_supply: MeasurementId,
    pub oc_frequency: MeasurementId,
    pub analog_output: MeasurementId,
}

impl RigMeasurements {
    /// Display label of a measurement.
    pub fn label(&self, id: MeasurementId) -> &'static str {
        if id == self.supply_current {
            "Curr"
        } else if id == self.sensor_supply {
            "Sens"
        } else if id == self.oc_frequency {
            "Freq"
        } else if id == self.analog_output {
            "Alog"
        } else {
            "?"
        }
    }
}

/// Register the T400 measurement set with the scheduler.
pub fn register_measurements<C: SliceClock>(
    scheduler: &mut Scheduler<C, SourceSelect>,
) -> RigMeasurements {
    let supply_current = scheduler.register_task(AcquisitionConfig {
        select: SourceSelect::Internal(SUPPLY_CURRENT_CHANNEL),
        must_finish: true,
        convert: Some(convert_supply_current),
        slice: SLICE,
    });

    let sensor_supply = scheduler.register_task(AcquisitionConfig {
        select: SourceSelect::Internal(SENSOR_SUPPLY_CHANNEL),
        must_finish: true,
        convert: Some(convert_sensor_supply),
        slice: SLICE,
    });

    let oc_frequency = scheduler.register_task(AcquisitionConfig {
        select: SourceSelect::Frequency,
        must_finish: false,
        convert: None,
        slice: SLICE,
    });

    let analog_output = scheduler.register_task(AcquisitionConfig {
        select: SourceSelect::External {
            gain: Gain::X1,
            channel: ANALOG_OUTPUT_CHANNEL,
            resolution: Resolution::Bits14,
        },
        must_finish: true,
        convert: Some(convert_analog_output),
        slice: SLICE,
    });

    RigMeasurements {
        supply_current,
        sensor_supply,
        oc_frequency,
        analog_output,
    }
}
