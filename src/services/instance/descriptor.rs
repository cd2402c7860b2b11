use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::identity::InstanceIdentity;

/// 自建机房的数据中心标识
pub const DATA_CENTER_CLASS: &str = "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo";
pub const DATA_CENTER_NAME: &str = "MyOwn";

/// 实例状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    #[default]
    Up,
    Down,
    Starting,
    OutOfService,
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Up => "UP",
            InstanceStatus::Down => "DOWN",
            InstanceStatus::Starting => "STARTING",
            InstanceStatus::OutOfService => "OUT_OF_SERVICE",
            InstanceStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 注册请求体：`{"instance": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct InstanceDescriptor {
    pub instance: InstanceInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub app: String,
    pub instance_id: String,
    pub host_name: String,
    pub ip_addr: String,
    pub status: InstanceStatus,
    pub health_check_url: String,
    pub status_page_url: String,
    pub home_page_url: String,
    pub port: PortInfo,
    pub vip_address: String,
    pub data_center_info: DataCenterInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortInfo {
    #[serde(rename = "$")]
    pub value: u16,
    // 注册中心期望字符串形式的 "true"
    #[serde(rename = "@enabled", serialize_with = "serialize_flag")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataCenterInfo {
    #[serde(rename = "@class")]
    pub class: String,
    pub name: String,
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "true" } else { "false" })
}

impl InstanceDescriptor {
    /// 根据实例身份和状态生成注册数据，每次注册都重新生成
    pub fn build(identity: &InstanceIdentity, status: InstanceStatus) -> Self {
        let ip = identity.ip_address().to_string();
        let base_url = identity.base_url();

        Self {
            instance: InstanceInfo {
                app: identity.app_name().to_string(),
                instance_id: identity.instance_id().to_string(),
                host_name: ip.clone(),
                ip_addr: ip,
                status,
                health_check_url: format!("{base_url}/health"),
                status_page_url: format!("{base_url}/info"),
                home_page_url: format!("{base_url}/info"),
                port: PortInfo {
                    value: identity.port(),
                    enabled: true,
                },
                vip_address: identity.app_name().to_string(),
                data_center_info: DataCenterInfo {
                    class: DATA_CENTER_CLASS.to_string(),
                    name: DATA_CENTER_NAME.to_string(),
                },
            },
        }
    }
}
