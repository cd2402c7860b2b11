use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::services::instance::{
    AddressResolver, DefaultRouteAddress, InterfaceAddress, StaticAddress,
};
use crate::services::registration::RegistrationOptions;

pub const ENV_PREFIX: &str = "EUREKA_";
pub const CONFIG_PATH_ENV: &str = "EUREKA_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "eureka.toml";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to read environment overrides: {0}")]
    Env(#[from] envy::Error),

    #[error("Missing required config value: {0}")]
    Missing(&'static str),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// 注册中心客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EurekaConfig {
    /// 注册到注册中心的服务名称
    pub service_name: String,
    /// 注册中心地址
    pub service_url: String,
    /// 发送心跳/拉取其他服务的间隔（秒）
    pub heartbeat_interval: u64,
    /// 服务端口
    pub instance_port: u16,
    /// 本地 IP，为空时按 `interface` 或默认路由获取
    pub ip_address: Option<String>,
    /// 获取本地 IP 使用的网卡名
    pub interface: Option<String>,
    /// 是否拉取其他服务
    pub fetch_registry: bool,
    /// 单次请求超时（秒）
    pub request_timeout: u64,
    /// 服务多久未出现在拉取结果中即清除（秒），为空时永不清除
    pub stale_service_ttl: Option<u64>,
    /// 优雅停机时是否从注册中心注销
    pub deregister_on_shutdown: bool,
}

/// 配置文件和环境变量共用的部分配置，后者覆盖前者
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialConfig {
    pub service_name: Option<String>,
    pub service_url: Option<String>,
    #[serde(alias = "heartbeat")]
    pub heartbeat_interval: Option<u64>,
    pub instance_port: Option<u16>,
    pub ip_address: Option<String>,
    pub interface: Option<String>,
    pub fetch_registry: Option<bool>,
    pub request_timeout: Option<u64>,
    pub stale_service_ttl: Option<u64>,
    pub deregister_on_shutdown: Option<bool>,
}

impl PartialConfig {
    pub fn merge(self, overrides: PartialConfig) -> PartialConfig {
        PartialConfig {
            service_name: overrides.service_name.or(self.service_name),
            service_url: overrides.service_url.or(self.service_url),
            heartbeat_interval: overrides.heartbeat_interval.or(self.heartbeat_interval),
            instance_port: overrides.instance_port.or(self.instance_port),
            ip_address: overrides.ip_address.or(self.ip_address),
            interface: overrides.interface.or(self.interface),
            fetch_registry: overrides.fetch_registry.or(self.fetch_registry),
            request_timeout: overrides.request_timeout.or(self.request_timeout),
            stale_service_ttl: overrides.stale_service_ttl.or(self.stale_service_ttl),
            deregister_on_shutdown: overrides
                .deregister_on_shutdown
                .or(self.deregister_on_shutdown),
        }
    }

    pub fn build(self) -> Result<EurekaConfig, ConfigError> {
        let config = EurekaConfig {
            service_name: self.service_name.ok_or(ConfigError::Missing("service_name"))?,
            service_url: self.service_url.ok_or(ConfigError::Missing("service_url"))?,
            heartbeat_interval: self.heartbeat_interval.unwrap_or(30),
            instance_port: self.instance_port.unwrap_or(5000),
            ip_address: self.ip_address.filter(|ip| !ip.trim().is_empty()),
            interface: self.interface.filter(|iface| !iface.trim().is_empty()),
            fetch_registry: self.fetch_registry.unwrap_or(false),
            request_timeout: self.request_timeout.unwrap_or(30),
            stale_service_ttl: self.stale_service_ttl,
            deregister_on_shutdown: self.deregister_on_shutdown.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }
}

impl EurekaConfig {
    /// 加载 `.env`、配置文件（`EUREKA_CONFIG`，默认 `eureka.toml`，可不存在）和 `EUREKA_*` 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path), std::env::vars())
    }

    pub fn load_from<I>(path: &Path, env: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file = if path.exists() {
            toml::from_str::<PartialConfig>(&fs::read_to_string(path)?)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using environment only");
            PartialConfig::default()
        };

        let overrides: PartialConfig = envy::prefixed(ENV_PREFIX).from_iter(env)?;
        file.merge(overrides).build()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str::<PartialConfig>(content)?.build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("service_name must not be empty".into()));
        }
        if self.service_url.trim().is_empty() {
            return Err(ConfigError::Invalid("service_url must not be empty".into()));
        }
        if self.heartbeat_interval == 0 {
            return Err(ConfigError::Invalid("heartbeat_interval must be greater than 0".into()));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid("request_timeout must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn stale_service_ttl(&self) -> Option<Duration> {
        self.stale_service_ttl.map(Duration::from_secs)
    }

    /// 地址解析优先级：静态 IP > 指定网卡 > 默认路由
    pub fn address_resolver(&self) -> Box<dyn AddressResolver> {
        match (&self.ip_address, &self.interface) {
            (Some(ip), _) => Box::new(StaticAddress(ip.clone())),
            (None, Some(iface)) => Box::new(InterfaceAddress::new(iface.clone())),
            (None, None) => Box::new(DefaultRouteAddress),
        }
    }

    pub fn registration_options(&self) -> RegistrationOptions {
        RegistrationOptions {
            service_name: self.service_name.clone(),
            registry_url: self.service_url.clone(),
            ip_address: self.ip_address.clone(),
            port: self.instance_port,
            heartbeat_interval: self.heartbeat_interval(),
            request_timeout: self.request_timeout(),
        }
    }
}
