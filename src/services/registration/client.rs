use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::types::{RegistrationOptions, RegistrationState, effective_interval};
use crate::services::client::{RegistryTransport, TransportConfig};
use crate::services::error::{EurekaError, EurekaResult};
use crate::services::instance::{
    AddressResolver, DefaultRouteAddress, InstanceDescriptor, InstanceIdentity, InstanceStatus,
};

// 客户端内部可变状态
#[derive(Debug, Clone, Copy)]
struct RegistrationSnapshot {
    state: RegistrationState,
    status: InstanceStatus,
}

/// 注册客户端：持有实例身份，负责注册、续约和心跳循环
#[derive(Debug)]
pub struct RegistrationClient {
    identity: InstanceIdentity,
    transport: RegistryTransport,
    heartbeat_interval: Duration,
    snapshot: Mutex<RegistrationSnapshot>,
}

impl RegistrationClient {
    /// 未配置 IP 时使用默认路由所在网卡的地址
    pub fn new(options: RegistrationOptions) -> EurekaResult<Self> {
        Self::with_resolver(options, &DefaultRouteAddress)
    }

    pub fn with_resolver(
        options: RegistrationOptions,
        resolver: &dyn AddressResolver,
    ) -> EurekaResult<Self> {
        let ip_address = match options.ip_address {
            Some(ip) => ip,
            None => resolver.resolve()?,
        };
        let identity = InstanceIdentity::new(options.service_name, &ip_address, options.port)?;

        let transport = RegistryTransport::new(TransportConfig {
            registry_url: options.registry_url,
            request_timeout: options.request_timeout,
        })?;

        Ok(Self::from_parts(identity, transport, options.heartbeat_interval))
    }

    pub fn from_parts(
        identity: InstanceIdentity,
        transport: RegistryTransport,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            identity,
            transport,
            heartbeat_interval: effective_interval(heartbeat_interval),
            snapshot: Mutex::new(RegistrationSnapshot {
                state: RegistrationState::Unregistered,
                status: InstanceStatus::Up,
            }),
        }
    }

    pub fn identity(&self) -> &InstanceIdentity {
        &self.identity
    }

    pub fn instance_id(&self) -> &str {
        self.identity.instance_id()
    }

    pub fn transport(&self) -> &RegistryTransport {
        &self.transport
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub fn state(&self) -> RegistrationState {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.state)
            .unwrap_or(RegistrationState::Degraded)
    }

    /// 最近一次注册使用的状态
    pub fn status(&self) -> InstanceStatus {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.status)
            .unwrap_or_default()
    }

    fn set_state(&self, state: RegistrationState) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            snapshot.state = state;
        }
    }

    /// 注册实例，失败不重试，由下一次心跳负责恢复
    pub async fn register(&self, status: InstanceStatus) -> EurekaResult<()> {
        let descriptor = InstanceDescriptor::build(&self.identity, status);
        let code = self
            .transport
            .register(self.identity.app_name(), &descriptor)
            .await?;

        if !code.is_success() {
            return Err(EurekaError::Registration(format!(
                "registry responded with status {code}"
            )));
        }

        if let Ok(mut snapshot) = self.snapshot.lock() {
            snapshot.state = RegistrationState::Registered;
            snapshot.status = status;
        }

        tracing::info!(
            app_name = %self.identity.app_name(),
            instance_id = %self.identity.instance_id(),
            status = %status,
            "Registered instance with registry"
        );

        Ok(())
    }

    /// 发送心跳；注册中心不认识本实例时（404）立即重新注册
    pub async fn renew(&self) -> EurekaResult<()> {
        let result = self.renew_once().await;
        match &result {
            Ok(()) => self.set_state(RegistrationState::Registered),
            Err(_) => self.set_state(RegistrationState::Degraded),
        }
        result
    }

    async fn renew_once(&self) -> EurekaResult<()> {
        let code = self
            .transport
            .renew(self.identity.app_name(), self.identity.instance_id())
            .await?;

        if code == StatusCode::NOT_FOUND {
            tracing::warn!(
                instance_id = %self.identity.instance_id(),
                "Instance unknown to registry, re-registering"
            );
            return self.register(self.status()).await;
        }

        if code.as_u16() > 300 {
            return Err(EurekaError::Registration(format!(
                "heartbeat rejected with status {code}"
            )));
        }

        tracing::debug!(instance_id = %self.identity.instance_id(), "Heartbeat sent");
        Ok(())
    }

    /// 注销实例
    pub async fn deregister(&self) -> EurekaResult<()> {
        let code = self
            .transport
            .cancel(self.identity.app_name(), self.identity.instance_id())
            .await?;

        if !code.is_success() {
            return Err(EurekaError::Registration(format!(
                "deregistration rejected with status {code}"
            )));
        }

        self.set_state(RegistrationState::Unregistered);
        tracing::info!(instance_id = %self.identity.instance_id(), "Deregistered instance from registry");
        Ok(())
    }

    /// 同步注册一次，成功后在 `tracker` 上启动心跳循环
    pub async fn start(
        self: &Arc<Self>,
        tracker: &TaskTracker,
        cancel: CancellationToken,
    ) -> EurekaResult<()> {
        self.register(InstanceStatus::Up).await?;
        tracker.spawn(self.clone().heartbeat_loop(cancel));
        Ok(())
    }
}
