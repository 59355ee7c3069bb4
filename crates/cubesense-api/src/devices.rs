// Device endpoints
//
// The three read-only calls the aggregation layer builds on:
// list, per-device info, and per-device current readings.

use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;
use crate::models::{CurrentReadings, DeviceInfo, DeviceRef, DeviceResponse, DevicesResponse, DeviceState};

impl CloudClient {
    /// List every device on the account.
    ///
    /// `GET /devices`
    pub async fn get_devices(&self) -> Result<Vec<DeviceRef>, Error> {
        let url = self.api_url(&["devices"])?;
        debug!("listing devices");
        let resp: DevicesResponse = self.get(url).await?;
        Ok(resp.devices)
    }

    /// Fetch metadata for one device.
    ///
    /// `GET /devices/{uid}`
    pub async fn get_device(&self, uid: &str) -> Result<DeviceInfo, Error> {
        let url = self.api_url(&["devices", uid])?;
        debug!(uid, "fetching device info");
        let resp: DeviceResponse = self.get(url).await?;
        Ok(resp.device)
    }

    /// Fetch the latest readings for one device.
    ///
    /// `GET /devices/{uid}/current`
    pub async fn get_device_current(&self, uid: &str) -> Result<DeviceState, Error> {
        let url = self.api_url(&["devices", uid, "current"])?;
        debug!(uid, "fetching device state");
        let readings: CurrentReadings = self.get(url).await?;
        Ok(readings.latest())
    }
}
