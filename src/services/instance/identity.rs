use std::net::Ipv4Addr;

use crate::services::error::{EurekaError, EurekaResult};

/// 本实例在注册中心中的身份，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentity {
    app_name: String,
    ip_address: Ipv4Addr,
    port: u16,
    instance_id: String,
}

impl InstanceIdentity {
    pub fn new(app_name: impl Into<String>, ip_address: &str, port: u16) -> EurekaResult<Self> {
        let app_name = app_name.into();
        if app_name.trim().is_empty() {
            return Err(EurekaError::InvalidServiceName(app_name));
        }

        let ip_address = parse_ipv4(ip_address)?;
        let instance_id = format!("{ip_address}:{port}");

        Ok(Self {
            app_name,
            ip_address,
            port,
            instance_id,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `{ip}:{port}`
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// 本实例对外的基础地址，例如 `http://10.0.0.5:5000`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.ip_address, self.port)
    }
}

/// 校验点分十进制 IPv4 地址，容忍命令行输出常见的首尾空白
pub fn parse_ipv4(raw: &str) -> EurekaResult<Ipv4Addr> {
    raw.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| EurekaError::InvalidAddress(format!("{raw:?} is not a dotted-quad IPv4 address")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_ipv4_addresses() {
        for raw in ["127.0.0.1", "10.0.0.5", "0.0.0.0", "255.255.255.255", " 192.168.1.20\n"] {
            assert!(parse_ipv4(raw).is_ok(), "expected {raw:?} to be accepted");
        }
    }

    #[test]
    fn rejects_non_ipv4_strings() {
        for raw in ["", "localhost", "10.0.0", "10.0.0.5.1", "256.1.1.1", "::1", "10.0.0.5:80", "a.b.c.d"] {
            let result = InstanceIdentity::new("svc1", raw, 5000);
            assert!(
                matches!(result, Err(EurekaError::InvalidAddress(_))),
                "expected {raw:?} to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn instance_id_is_ip_and_port() {
        let identity = InstanceIdentity::new("svc1", "10.0.0.5", 5000).unwrap();
        assert_eq!(identity.instance_id(), "10.0.0.5:5000");
        assert_eq!(identity.base_url(), "http://10.0.0.5:5000");
        assert_eq!(identity.app_name(), "svc1");
        assert_eq!(identity.port(), 5000);
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let result = InstanceIdentity::new("  ", "10.0.0.5", 5000);
        assert!(matches!(result, Err(EurekaError::InvalidServiceName(_))));
    }
}
