// ── Aggregate domain types ──
//
// One `AggregateRecord` per device, keyed by id inside a `DataSource`.
// A `DataSource` is built whole by a refresh and never patched.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cubesense_api::{DeviceExtra, DeviceInfo, DeviceState, LastState};

/// Device type tag the cloud uses for full environmental cubes.
pub const CUBE_TYPE: &str = "cube";

// ── DeviceId ─────────────────────────────────────────────────────────

/// Unique device identifier assigned by the cloud.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ── AggregateRecord ──────────────────────────────────────────────────

/// A device as consumers see it: metadata from the info call with the
/// live readings attached as `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "DeviceExtra::is_empty")]
    pub extra: DeviceExtra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state: Option<LastState>,
    #[serde(default)]
    pub data: DeviceState,
    /// Remaining info fields, serialized alongside the named ones.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AggregateRecord {
    /// Join an info/state pair.
    ///
    /// Identity and descriptive fields come from `info`, never from the
    /// list entry that triggered the fetch. Info fields without a typed
    /// home land in `other`; `id` and `data` always belong to the record.
    pub fn merge(info: DeviceInfo, state: DeviceState) -> Self {
        let mut other = info.other;
        other.remove("id");
        other.remove("data");
        Self {
            id: DeviceId::from(info.uid),
            name: info.name,
            mark: info.mark,
            device_type: info.device_type,
            extra: info.extra,
            last_state: info.last_state,
            data: state,
            other,
        }
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn is_cube(&self) -> bool {
        self.device_type.as_deref() == Some(CUBE_TYPE)
    }

    /// Whether the device reports a battery at all.
    pub fn has_battery(&self) -> bool {
        self.extra.has_battery()
    }

    // ── Reading accessors ────────────────────────────────────────────

    pub fn temperature(&self) -> Option<f64> {
        self.data.temperature
    }

    pub fn humidity(&self) -> Option<f64> {
        self.data.humidity
    }

    pub fn voc(&self) -> Option<f64> {
        self.data.voc
    }

    pub fn pressure(&self) -> Option<f64> {
        self.data.pressure
    }

    pub fn noise_dba(&self) -> Option<f64> {
        self.data.noisedba
    }

    /// Battery report from the readings, else the one on the info result.
    pub fn last_state(&self) -> Option<&LastState> {
        self.data.last_state.as_ref().or(self.last_state.as_ref())
    }

    /// Raw battery charge from the last-known state.
    pub fn battery_charge(&self) -> Option<f64> {
        self.last_state().and_then(|s| s.battery)
    }

    pub fn battery_percentage(&self) -> Option<f64> {
        self.last_state().and_then(|s| s.battery_percentage)
    }
}

// ── DataSource ───────────────────────────────────────────────────────

/// Every aggregated device, keyed by id. The unit the cache stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub modules: BTreeMap<DeviceId, AggregateRecord>,
}

impl DataSource {
    pub fn from_records(records: impl IntoIterator<Item = AggregateRecord>) -> Self {
        let modules = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { modules }
    }

    pub fn get(&self, id: &str) -> Option<&AggregateRecord> {
        self.modules.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &AggregateRecord> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
