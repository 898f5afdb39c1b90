//! IoT sensor readings and channel helpers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single IoT measurement for one machine.
///
/// Readings for a machine form a time series. Insertion order is expected to
/// be chronological but is not enforced; every windowed computation sorts by
/// `timestamp` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub machine_id: String,
    /// Temperature (°C)
    pub temperature: f64,
    /// Pressure (PSI)
    pub pressure: f64,
    /// Vibration velocity (mm/s)
    pub vibration: f64,
    /// Power draw (kW)
    pub power: f64,
    /// 1 when a maintenance event happened at this reading, else 0
    #[serde(default)]
    pub maintenance_performed: u8,
}

impl SensorReading {
    /// Value of one sensor channel.
    pub fn channel(&self, channel: SensorChannel) -> f64 {
        match channel {
            SensorChannel::Temperature => self.temperature,
            SensorChannel::Pressure => self.pressure,
            SensorChannel::Vibration => self.vibration,
            SensorChannel::Power => self.power,
        }
    }

    /// The four channels as a feature vector, in `SensorChannel::ALL` order.
    pub fn features(&self) -> [f64; SensorChannel::COUNT] {
        [self.temperature, self.pressure, self.vibration, self.power]
    }
}

/// The monitored sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorChannel {
    Temperature,
    Pressure,
    Vibration,
    Power,
}

impl SensorChannel {
    pub const COUNT: usize = 4;

    /// All channels in feature-vector order.
    pub const ALL: [SensorChannel; Self::COUNT] = [
        SensorChannel::Temperature,
        SensorChannel::Pressure,
        SensorChannel::Vibration,
        SensorChannel::Power,
    ];

    /// Position of this channel in a feature vector.
    pub fn index(self) -> usize {
        match self {
            SensorChannel::Temperature => 0,
            SensorChannel::Pressure => 1,
            SensorChannel::Vibration => 2,
            SensorChannel::Power => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorChannel::Temperature => "temperature",
            SensorChannel::Pressure => "pressure",
            SensorChannel::Vibration => "vibration",
            SensorChannel::Power => "power",
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One number per sensor channel (raw values, z-scores, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelValues {
    pub temperature: f64,
    pub pressure: f64,
    pub vibration: f64,
    pub power: f64,
}

impl ChannelValues {
    pub fn from_array(values: [f64; SensorChannel::COUNT]) -> Self {
        Self {
            temperature: values[0],
            pressure: values[1],
            vibration: values[2],
            power: values[3],
        }
    }
}

impl From<&SensorReading> for ChannelValues {
    fn from(reading: &SensorReading) -> Self {
        Self::from_array(reading.features())
    }
}
