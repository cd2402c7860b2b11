use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::discovery::{DiscoveryCache, RegistryFetcher, SharedDiscoveryCache};
use super::error::EurekaResult;
use super::registration::{RegistrationClient, RegistrationState};
use crate::config::EurekaConfig;

/// 生命周期管理：启动/停止心跳循环和拉取循环，提供 `/info`、`/health` 路由
///
/// 宿主应用通过 [`client`](Self::client) 和 [`cache`](Self::cache)
/// 拿到共享引用并注入到自己的请求处理中。
#[derive(Debug)]
pub struct LifecycleSupervisor {
    client: Arc<RegistrationClient>,
    cache: SharedDiscoveryCache,
    fetch_registry: bool,
    deregister_on_shutdown: bool,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl LifecycleSupervisor {
    pub fn new(config: &EurekaConfig) -> EurekaResult<Self> {
        let resolver = config.address_resolver();
        let client = RegistrationClient::with_resolver(config.registration_options(), resolver.as_ref())?;
        let cache = DiscoveryCache::with_stale_ttl(config.stale_service_ttl());

        Ok(Self {
            client: Arc::new(client),
            cache: Arc::new(cache),
            fetch_registry: config.fetch_registry,
            deregister_on_shutdown: config.deregister_on_shutdown,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn client(&self) -> Arc<RegistrationClient> {
        self.client.clone()
    }

    pub fn cache(&self) -> SharedDiscoveryCache {
        self.cache.clone()
    }

    /// 首次注册失败直接返回错误；成功后启动后台循环
    pub async fn start(&self) -> EurekaResult<()> {
        self.client
            .start(&self.tracker, self.cancel.child_token())
            .await?;

        if self.fetch_registry {
            let fetcher = RegistryFetcher::new(
                self.client.transport().clone(),
                self.cache.clone(),
                self.client.heartbeat_interval(),
            );
            self.tracker.spawn(fetcher.run(self.cancel.child_token()));
        }

        tracing::info!(
            app_name = %self.client.identity().app_name(),
            instance_id = %self.client.instance_id(),
            fetch_registry = self.fetch_registry,
            "Registry client started"
        );

        Ok(())
    }

    /// 取消后台循环并等待其退出，然后按配置注销实例
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        if self.deregister_on_shutdown && self.client.state() != RegistrationState::Unregistered {
            if let Err(e) = self.client.deregister().await {
                tracing::error!(error = %e, "Failed to deregister instance");
            }
        }

        tracing::info!("Registry client stopped");
    }

    /// 注册中心和负载均衡探测用的路由
    pub fn router(&self) -> Router {
        Router::new()
            .route("/info", get(info))
            .route("/health", get(health))
    }
}

impl Drop for LifecycleSupervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.tracker.close();
    }
}

async fn info() -> &'static str {
    "ok"
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
