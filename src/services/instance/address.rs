use std::fmt::Debug;
use std::net::IpAddr;

use crate::services::error::{EurekaError, EurekaResult};

/// 本机地址解析策略
///
/// 返回的字符串仍会经过 IPv4 校验，策略本身只负责取值。
pub trait AddressResolver: Debug + Send + Sync {
    fn resolve(&self) -> EurekaResult<String>;
}

/// 配置中写死的地址
#[derive(Debug, Clone)]
pub struct StaticAddress(pub String);

impl AddressResolver for StaticAddress {
    fn resolve(&self) -> EurekaResult<String> {
        Ok(self.0.clone())
    }
}

/// 指定网卡上的第一个 IPv4 地址，例如 `eth0`
#[derive(Debug, Clone)]
pub struct InterfaceAddress {
    pub interface: String,
}

impl InterfaceAddress {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }
}

impl AddressResolver for InterfaceAddress {
    fn resolve(&self) -> EurekaResult<String> {
        let interfaces = local_ip_address::list_afinet_netifas().map_err(|e| {
            EurekaError::InvalidAddress(format!("failed to list network interfaces: {e}"))
        })?;

        select_interface_ipv4(&interfaces, &self.interface)
            .map(|ip| ip.to_string())
            .ok_or_else(|| {
                EurekaError::InvalidAddress(format!(
                    "no IPv4 address found on interface {}",
                    self.interface
                ))
            })
    }
}

/// 默认路由所在网卡的地址
#[derive(Debug, Clone, Default)]
pub struct DefaultRouteAddress;

impl AddressResolver for DefaultRouteAddress {
    fn resolve(&self) -> EurekaResult<String> {
        match local_ip_address::local_ip() {
            Ok(ip) => {
                tracing::debug!(ip = %ip, "Detected local IP address");
                Ok(ip.to_string())
            }
            Err(e) => Err(EurekaError::InvalidAddress(format!(
                "failed to detect local IP address: {e}"
            ))),
        }
    }
}

fn select_interface_ipv4(interfaces: &[(String, IpAddr)], name: &str) -> Option<IpAddr> {
    interfaces
        .iter()
        .find(|(iface, ip)| iface == name && ip.is_ipv4())
        .map(|(_, ip)| *ip)
}
