// CubeSensors cloud wire types
//
// Shapes returned by the three device endpoints. Every reading is
// optional: a cube that has not reported a value simply omits it, and
// absence is decided here, once, rather than at each read site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Envelopes ───────────────────────────────────────────────────────

/// `GET /devices` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRef>,
}

/// `GET /devices/{uid}` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceResponse {
    pub device: DeviceInfo,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Device identity ─────────────────────────────────────────────────

/// Runtime-specific fields hanging off a device record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roomtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state: Option<LastState>,
    /// Anything else the cloud attaches; carried through untouched.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl DeviceExtra {
    pub fn is_empty(&self) -> bool {
        self.roomtype.is_none() && self.last_state.is_none() && self.other.is_empty()
    }

    /// Whether the cloud reports a battery for this device.
    pub fn has_battery(&self) -> bool {
        self.last_state
            .as_ref()
            .and_then(|s| s.battery)
            .is_some_and(|b| b.abs() > f64::EPSILON)
    }
}

/// One entry of the device list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Serial mark printed on the cube.
    #[serde(default)]
    pub mark: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub extra: DeviceExtra,
}

/// Identity and metadata from the per-device info call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mark: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub extra: DeviceExtra,
    /// Battery report some firmware puts at the top level instead of
    /// under `extra`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state: Option<LastState>,
    /// Every other top-level field, kept so the merged record carries it.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

// ── Live readings ───────────────────────────────────────────────────

/// Last battery report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LastState {
    /// Raw charge in millivolts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<f64>,
}

/// Latest readings of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Degrees Celsius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity, percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Volatile organic compounds, ppm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    /// mbar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noisedba: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_state: Option<LastState>,
}

/// `GET /devices/{uid}/current` response body.
///
/// The cloud answers in column form: a list of field names and one
/// row of values per sample, oldest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentReadings {
    #[serde(default)]
    pub field_list: Vec<String>,
    #[serde(default)]
    pub results: Vec<Vec<Value>>,
}

impl CurrentReadings {
    /// Decode the most recent row into a [`DeviceState`].
    ///
    /// Unknown columns are ignored; `null` cells and missing columns
    /// leave the field unset. An empty result set yields the default
    /// (all-`None`) state.
    pub fn latest(&self) -> DeviceState {
        let Some(row) = self.results.last() else {
            return DeviceState::default();
        };

        let mut state = DeviceState::default();
        for (field, value) in self.field_list.iter().zip(row) {
            match field.as_str() {
                "time" => {
                    state.time = value
                        .as_str()
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|t| t.with_timezone(&Utc));
                }
                "temp" | "temperature" => state.temperature = value.as_f64(),
                "humidity" => state.humidity = value.as_f64(),
                "voc" => state.voc = value.as_f64(),
                "pressure" => state.pressure = value.as_f64(),
                "noise" => state.noise = value.as_f64(),
                "noisedba" => state.noisedba = value.as_f64(),
                "light" => state.light = value.as_f64(),
                "battery" => state.battery = value.as_f64(),
                "battery_percentage" => state.battery_percentage = value.as_f64(),
                "cable" => {
                    state.cable = value
                        .as_bool()
                        .or_else(|| value.as_f64().map(|v| v.abs() > f64::EPSILON));
                }
                "rssi" => state.rssi = value.as_f64(),
                _ => {}
            }
        }

        if state.battery.is_some() || state.battery_percentage.is_some() {
            state.last_state = Some(LastState {
                battery: state.battery,
                battery_percentage: state.battery_percentage,
            });
        }

        state
    }
}
