use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

// 缓存中的服务条目
#[derive(Debug, Clone)]
struct ServiceEntry {
    urls: Vec<String>,
    refreshed_at: Instant,
}

/// 其他服务的地址表
///
/// 拉取循环写入，宿主应用的请求处理并发读取。更新采用合并语义：
/// 本次拉取中没有出现的服务保持原值。设置了 `stale_ttl` 时，
/// 超过该时长未刷新的服务会被清除。
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    services: DashMap<String, ServiceEntry>,
    stale_ttl: Option<Duration>,
}

/// 拉取循环与宿主共享的缓存句柄
pub type SharedDiscoveryCache = Arc<DiscoveryCache>;

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stale_ttl(stale_ttl: Option<Duration>) -> Self {
        Self {
            services: DashMap::new(),
            stale_ttl,
        }
    }

    /// 合并一次拉取结果，返回被写入的服务数量
    pub fn merge(&self, update: HashMap<String, Vec<String>>) -> usize {
        self.merge_at(update, Instant::now())
    }

    fn merge_at(&self, update: HashMap<String, Vec<String>>, now: Instant) -> usize {
        let count = update.len();
        for (service_name, urls) in update {
            self.services.insert(
                service_name,
                ServiceEntry {
                    urls,
                    refreshed_at: now,
                },
            );
        }
        count
    }

    /// 清理过期服务，未设置 TTL 时不做任何事
    pub fn evict_stale(&self) -> Vec<String> {
        self.evict_stale_at(Instant::now())
    }

    fn evict_stale_at(&self, now: Instant) -> Vec<String> {
        let Some(ttl) = self.stale_ttl else {
            return Vec::new();
        };

        let mut expired = Vec::new();
        self.services.retain(|service_name, entry| {
            let fresh = now.saturating_duration_since(entry.refreshed_at) <= ttl;
            if !fresh {
                expired.push(service_name.clone());
            }
            fresh
        });

        for service_name in &expired {
            tracing::warn!(service_name = %service_name, "Evicting stale service from discovery cache");
        }

        expired
    }

    pub fn get(&self, service_name: &str) -> Option<Vec<String>> {
        self.services
            .get(service_name)
            .map(|entry| entry.urls.clone())
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.services
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().urls.clone()))
            .collect()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
