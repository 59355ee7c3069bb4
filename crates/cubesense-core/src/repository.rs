// ── Repository ──
//
// Cache-aside facade over the sensor cloud. A refresh lists devices,
// fans out one info/state pair per device, joins each pair into an
// `AggregateRecord`, and replaces the cached `DataSource` in one step.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cubesense_api::{DeviceRef, SensorCloud};

use crate::cache::{CacheBackend, ExpiringCache};
use crate::config::RepositoryConfig;
use crate::error::CoreError;
use crate::model::{AggregateRecord, DataSource};

/// Fixed key the aggregate lives under.
pub const DATASOURCE_KEY: &str = "datasource";

/// Joins the three cloud calls into one cached [`DataSource`].
///
/// Generic over the cloud client and the cache backend so either side
/// can be swapped in tests. Share it behind an `Arc` when several tasks
/// poll it.
pub struct Repository<C, B = ExpiringCache<Arc<DataSource>>> {
    cloud: C,
    cache: B,
    config: RepositoryConfig,
    refresh_guard: Mutex<()>,
}

impl<C: SensorCloud> Repository<C> {
    /// Create a repository backed by an in-memory [`ExpiringCache`] using
    /// `config.ttl`.
    pub fn new(cloud: C, config: RepositoryConfig) -> Self {
        let cache = ExpiringCache::new(config.ttl);
        Self::with_cache(cloud, cache, config)
    }
}

impl<C, B> Repository<C, B>
where
    C: SensorCloud,
    B: CacheBackend<Arc<DataSource>>,
{
    pub fn with_cache(cloud: C, cache: B, config: RepositoryConfig) -> Self {
        Self {
            cloud,
            cache,
            config,
            refresh_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn cloud(&self) -> &C {
        &self.cloud
    }

    pub fn cache(&self) -> &B {
        &self.cache
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Return the cached aggregate, refreshing it first if it is absent
    /// or expired.
    ///
    /// A failing cache backend is logged and returned as
    /// [`CoreError::Cache`]; it never triggers a refresh.
    pub async fn load(&self) -> Result<Arc<DataSource>, CoreError> {
        if let Some(source) = self.lookup().await? {
            debug!(devices = source.len(), "serving sensor data from cache");
            return Ok(source);
        }

        if !self.config.single_flight {
            return self.refresh().await;
        }

        let _guard = self.refresh_guard.lock().await;
        // Whoever held the guard before us may already have refreshed.
        if let Some(source) = self.lookup().await? {
            debug!("cache filled by concurrent refresh");
            return Ok(source);
        }
        self.refresh().await
    }

    /// Look up one device through [`load()`](Self::load).
    pub async fn device(&self, id: &str) -> Result<AggregateRecord, CoreError> {
        let source = self.load().await?;
        source
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_owned(),
            })
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Rebuild the aggregate from the cloud and overwrite the cache.
    ///
    /// Fails only when the device list cannot be fetched, in which case
    /// the cache is left untouched. A device whose info or state call
    /// fails is logged and left out of the result.
    pub async fn refresh(&self) -> Result<Arc<DataSource>, CoreError> {
        debug!("refreshing sensor data from cloud");

        let devices = match self.call(self.cloud.list_devices()).await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "device list failed; keeping previous cache entry");
                return Err(e);
            }
        };
        let listed = devices.len();

        let records: Vec<AggregateRecord> = stream::iter(devices)
            .map(|device| self.fetch_device(device))
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let source = Arc::new(DataSource::from_records(records));

        if let Err(e) = self.cache.set(DATASOURCE_KEY, Arc::clone(&source)).await {
            warn!(error = %e, "failed to store refreshed sensor data");
        }

        info!(
            listed,
            devices = source.len(),
            dropped = listed.saturating_sub(source.len()),
            "sensor data refresh complete"
        );

        Ok(source)
    }

    /// Fetch the info/state pair for one listed device and join it.
    async fn fetch_device(&self, device: DeviceRef) -> Option<AggregateRecord> {
        let (info, state) = tokio::join!(
            self.call(self.cloud.device_info(&device.uid)),
            self.call(self.cloud.device_state(&device.uid)),
        );

        match (info, state) {
            (Ok(info), Ok(state)) => {
                debug!(uid = %device.uid, name = ?device.name, "refreshed device");
                if info.uid != device.uid {
                    warn!(
                        listed = %device.uid,
                        reported = %info.uid,
                        "device info reports a different id than the device list"
                    );
                }
                Some(AggregateRecord::merge(info, state))
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(uid = %device.uid, error = %e, "dropping device from refresh");
                None
            }
        }
    }

    /// Run one cloud call under the configured per-call deadline.
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, cubesense_api::Error>>,
    ) -> Result<T, CoreError> {
        let Some(limit) = self.config.request_timeout else {
            return Ok(fut.await?);
        };

        match tokio::time::timeout(limit, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(CoreError::Timeout {
                timeout: Some(limit),
            }),
        }
    }

    async fn lookup(&self) -> Result<Option<Arc<DataSource>>, CoreError> {
        self.cache.get(DATASOURCE_KEY).await.map_err(|e| {
            warn!(error = %e, "cache lookup failed");
            CoreError::from(e)
        })
    }
}

impl<C, B> Repository<C, B>
where
    C: SensorCloud + 'static,
    B: CacheBackend<Arc<DataSource>> + 'static,
{
    /// Spawn a background task that refreshes every `interval` until
    /// `cancel` fires. Failed refreshes are logged and retried on the
    /// next tick.
    pub fn spawn_refresher(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let repo = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = repo.refresh().await {
                            warn!(error = %e, "periodic refresh failed");
                        }
                    }
                }
            }
            debug!("background refresher stopped");
        })
    }
}
