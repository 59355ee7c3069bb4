//! Aggregation and caching layer between `cubesense-api` and consumers.
//!
//! The CubeSensors cloud splits a device across three calls: the device
//! list, per-device metadata, and per-device live readings. This crate
//! joins them into one record per device and keeps the joined view in a
//! short-lived cache so that polling consumers stay cheap:
//!
//! - **[`Repository`]**: cache-aside facade. [`load()`](Repository::load)
//!   serves the cached [`DataSource`] while it is fresh and refreshes it on
//!   a miss; [`refresh()`](Repository::refresh) always goes to the cloud.
//!
//! - **[`ExpiringCache`]**: in-memory time-to-live store behind the
//!   [`CacheBackend`] trait.
//!
//! - **Domain model** ([`model`]): [`AggregateRecord`] and [`DataSource`],
//!   with optional-valued reading accessors.
//!
//! - **Sensor projections** ([`sensor`]): maps raw readings onto the
//!   values a home-automation accessory reports (air quality band,
//!   low-battery flag, etc.).

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod sensor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheBackend, CacheError, ExpiringCache};
pub use config::{CloudConfig, DEFAULT_CACHE_TTL_SECS, RepositoryConfig};
pub use error::CoreError;
pub use model::{AggregateRecord, DataSource, DeviceId};
pub use repository::{DATASOURCE_KEY, Repository};
pub use sensor::{AirQuality, BatteryStatus, CarbonDioxideStatus, SensorReadings, ServiceKind};

// Wire types consumers commonly need alongside the aggregate.
pub use cubesense_api::{CloudClient, DEFAULT_BASE_URL, DeviceExtra, DeviceInfo, DeviceRef, DeviceState, LastState, SensorCloud};
