use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::{Json, Router, routing::get};
use tokio::net::TcpListener;

use crate::config::EurekaConfig;
use crate::services::{DiscoveryCache, LifecycleSupervisor};

/// 示例宿主：`/` 返回已发现的服务，同时挂载 `/info`、`/health`
pub async fn start(config: EurekaConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.instance_port));

    let supervisor = LifecycleSupervisor::new(&config)?;
    // 先监听端口，注册中心注册后可能立刻探测健康检查地址
    let listener = TcpListener::bind(addr).await?;
    supervisor.start().await?;

    tracing::info!(%addr, "Host server listening");

    axum::serve(listener, app(&supervisor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    supervisor.shutdown().await;
    Ok(())
}

pub fn app(supervisor: &LifecycleSupervisor) -> Router {
    Router::new()
        .route("/", get(list_services))
        .with_state(supervisor.cache())
        .merge(supervisor.router())
}

async fn list_services(State(cache): State<Arc<DiscoveryCache>>) -> Json<BTreeMap<String, Vec<String>>> {
    Json(cache.snapshot())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
