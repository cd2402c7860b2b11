use std::time::Duration;

/// 注册中心传输层配置
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// 注册中心地址
    pub registry_url: String,
    /// 单次请求超时时间
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            registry_url: "http://localhost:8761".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
