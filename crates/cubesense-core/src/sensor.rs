// ── Sensor projections ──
//
// Maps an `AggregateRecord` onto the values a home-automation accessory
// reports: raw readings plus derived air quality, CO2 and battery flags.

use serde::Serialize;
use strum::{Display, EnumIter};

use crate::model::AggregateRecord;

pub const MANUFACTURER: &str = "CubeSensors";

/// VOC level (ppm) above which carbon dioxide is flagged abnormal.
pub const CO2_ABNORMAL_VOC: f64 = 1000.0;

/// Raw battery charge below which the battery is reported low.
pub const LOW_BATTERY_CHARGE: f64 = 1200.0;

// ── Derived states ──────────────────────────────────────────────────

/// Air quality band derived from the VOC reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQuality {
    Unknown,
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

impl AirQuality {
    pub fn from_voc(voc: f64) -> Self {
        if voc > 2000.0 {
            Self::Poor
        } else if voc > 1500.0 {
            Self::Inferior
        } else if voc > 1000.0 {
            Self::Fair
        } else if voc > 500.0 {
            Self::Good
        } else if voc > 250.0 {
            Self::Excellent
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonDioxideStatus {
    Normal,
    Abnormal,
}

impl CarbonDioxideStatus {
    pub fn from_voc(voc: f64) -> Self {
        if voc > CO2_ABNORMAL_VOC {
            Self::Abnormal
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Normal,
    Low,
}

impl BatteryStatus {
    pub fn from_charge(charge: f64) -> Self {
        if charge < LOW_BATTERY_CHARGE {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

/// Accessory services a device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    #[strum(to_string = "Temperature")]
    Temperature,
    #[strum(to_string = "Humidity")]
    Humidity,
    #[strum(to_string = "Carbon Dioxide")]
    CarbonDioxide,
    #[strum(to_string = "Air Quality")]
    AirQuality,
    #[strum(to_string = "Atmospheric Pressure")]
    AtmosphericPressure,
    #[strum(to_string = "Noise Level")]
    NoiseLevel,
    #[strum(to_string = "Battery Level")]
    Battery,
}

impl ServiceKind {
    /// Services only full cubes carry.
    pub const ENVIRONMENTAL: [Self; 6] = [
        Self::Temperature,
        Self::Humidity,
        Self::CarbonDioxide,
        Self::AirQuality,
        Self::AtmosphericPressure,
        Self::NoiseLevel,
    ];
}

// ── Projection ──────────────────────────────────────────────────────

/// Environmental readings of a cube. Unreported values stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// VOC level, reported as the carbon dioxide level.
    pub carbon_dioxide_level: Option<f64>,
    pub carbon_dioxide: Option<CarbonDioxideStatus>,
    pub air_quality: AirQuality,
    pub pressure: Option<f64>,
    pub noise_dba: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Battery {
    pub percentage: Option<f64>,
    pub status: Option<BatteryStatus>,
}

/// One device as an accessory: identity plus the services it exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReadings {
    pub id: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: Option<String>,
    /// Serial number; the cloud device id.
    pub serial: String,
    /// Present for cubes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Present only when the device reports a battery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<Battery>,
}

impl SensorReadings {
    pub fn from_record(record: &AggregateRecord) -> Self {
        let environment = record.is_cube().then(|| {
            let voc = record.voc();
            Environment {
                temperature: record.temperature(),
                humidity: record.humidity(),
                carbon_dioxide_level: voc,
                carbon_dioxide: voc.map(CarbonDioxideStatus::from_voc),
                air_quality: voc.map_or(AirQuality::Unknown, AirQuality::from_voc),
                pressure: record.pressure(),
                noise_dba: record.noise_dba(),
            }
        });

        let battery = record.has_battery().then(|| Battery {
            percentage: record.battery_percentage(),
            status: record.battery_charge().map(BatteryStatus::from_charge),
        });

        Self {
            id: record.id.to_string(),
            name: record.display_name().to_owned(),
            manufacturer: MANUFACTURER,
            model: record.device_type.clone(),
            serial: record.id.to_string(),
            environment,
            battery,
        }
    }

    /// Services in the order an accessory registers them.
    pub fn services(&self) -> Vec<ServiceKind> {
        let mut services = Vec::new();
        if self.environment.is_some() {
            services.extend(ServiceKind::ENVIRONMENTAL);
        }
        if self.battery.is_some() {
            services.push(ServiceKind::Battery);
        }
        services
    }

    /// Display name of one service, e.g. "Office Air Quality".
    pub fn service_name(&self, kind: ServiceKind) -> String {
        format!("{} {kind}", self.name)
    }
}

impl From<&AggregateRecord> for SensorReadings {
    fn from(record: &AggregateRecord) -> Self {
        Self::from_record(record)
    }
}
