// cubesense-api: Async Rust client for the CubeSensors cloud API

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

use std::future::Future;

pub use client::{CloudClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{CurrentReadings, DeviceExtra, DeviceInfo, DeviceRef, DeviceState, LastState};
pub use transport::TransportConfig;

/// The three calls the sensor cloud exposes.
///
/// `cubesense-core` is generic over this trait so the aggregation layer
/// can run against [`CloudClient`] in production and an in-memory fake in
/// tests. Every call is independent: there is no ordering between
/// `device_info` and `device_state` for the same device.
pub trait SensorCloud: Send + Sync {
    /// List every device visible to the authenticated account.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceRef>, Error>> + Send;

    /// Fetch identity and metadata for one device.
    fn device_info(&self, uid: &str) -> impl Future<Output = Result<DeviceInfo, Error>> + Send;

    /// Fetch the latest live readings for one device.
    fn device_state(&self, uid: &str) -> impl Future<Output = Result<DeviceState, Error>> + Send;
}

impl SensorCloud for CloudClient {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceRef>, Error>> + Send {
        self.get_devices()
    }

    fn device_info(&self, uid: &str) -> impl Future<Output = Result<DeviceInfo, Error>> + Send {
        self.get_device(uid)
    }

    fn device_state(&self, uid: &str) -> impl Future<Output = Result<DeviceState, Error>> + Send {
        self.get_device_current(uid)
    }
}
