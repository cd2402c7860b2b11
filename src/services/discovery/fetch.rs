use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::cache::SharedDiscoveryCache;
use super::types::collect_up_services;
use crate::services::client::{RegistryTransport, SERVICE_PATH};
use crate::services::error::EurekaResult;
use crate::services::registration::types::effective_interval;

/// 周期性拉取注册中心，把 UP 实例合并进 [`DiscoveryCache`](super::DiscoveryCache)
#[derive(Debug, Clone)]
pub struct RegistryFetcher {
    transport: RegistryTransport,
    cache: SharedDiscoveryCache,
    interval: Duration,
}

impl RegistryFetcher {
    /// 周期为零时使用默认心跳间隔
    pub fn new(transport: RegistryTransport, cache: SharedDiscoveryCache, interval: Duration) -> Self {
        Self {
            transport,
            cache,
            interval: effective_interval(interval),
        }
    }

    pub fn cache(&self) -> &SharedDiscoveryCache {
        &self.cache
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 拉取一次并合并，返回本次写入的服务数量
    pub async fn fetch_once(&self, endpoint: &str) -> EurekaResult<usize> {
        let applications = self.transport.fetch(endpoint).await?;
        let update = collect_up_services(applications);
        let updated = self.cache.merge(update);
        let evicted = self.cache.evict_stale();

        tracing::debug!(
            updated_services = updated,
            evicted_services = evicted.len(),
            cached_services = self.cache.len(),
            "Refreshed registry services"
        );

        Ok(updated)
    }

    /// 拉取循环：首次立即拉取，每次拉取结束后等满一个周期，出错只记录日志
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            registry_url = %self.transport.base_url(),
            interval_secs = self.interval.as_secs(),
            "Registry fetch loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.fetch_once(SERVICE_PATH) => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Failed to refresh registry services");
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Registry fetch loop stopped");
    }
}
