use std::time::Duration;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 周期为零时回退到默认心跳间隔，`tokio::time::sleep` 循环不能空转
pub fn effective_interval(interval: Duration) -> Duration {
    if interval.is_zero() {
        DEFAULT_HEARTBEAT_INTERVAL
    } else {
        interval
    }
}

/// 注册客户端的构造参数
#[derive(Debug, Clone)]
pub struct RegistrationOptions {
    /// 注册到注册中心的服务名
    pub service_name: String,
    /// 注册中心地址，末尾的 `/` 会被去掉
    pub registry_url: String,
    /// 本机 IP，为空时由地址解析策略获取
    pub ip_address: Option<String>,
    /// 服务端口
    pub port: u16,
    /// 心跳间隔
    pub heartbeat_interval: Duration,
    /// 单次请求超时时间
    pub request_timeout: Duration,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            registry_url: String::new(),
            ip_address: None,
            port: 5000,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    Registered,
    /// 最近一次心跳失败，等待下一次心跳恢复
    Degraded,
}
