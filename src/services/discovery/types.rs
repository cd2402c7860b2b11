use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::services::error::{EurekaError, EurekaResult};
use crate::services::instance::InstanceStatus;

/// `GET /eureka/apps` 的响应
#[derive(Debug, Deserialize)]
pub struct RegistryResponse {
    pub applications: Applications,
}

#[derive(Debug, Deserialize)]
pub struct Applications {
    pub application: OneOrMany<Application>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub name: String,
    pub instance: OneOrMany<InstanceRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceRecord {
    #[serde(rename = "ipAddr")]
    pub ip_addr: String,
    pub port: PortRecord,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortRecord {
    #[serde(rename = "$")]
    pub value: u16,
}

/// 注册中心只有一个元素时可能不包数组
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl InstanceRecord {
    pub fn is_up(&self) -> bool {
        self.status == InstanceStatus::Up.as_str()
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.ip_addr, self.port.value)
    }
}

/// 解析应用列表；空文档（`null`、`{}`、`[]`）视为没有更新
pub fn decode_applications(body: &[u8]) -> EurekaResult<Vec<Application>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| EurekaError::Discovery(format!("response is not valid JSON: {e}")))?;

    if is_empty_document(&value) {
        return Ok(Vec::new());
    }

    let response: RegistryResponse = serde_json::from_value(value)
        .map_err(|e| EurekaError::Discovery(format!("malformed registry response: {e}")))?;

    Ok(response.applications.application.into_vec())
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// 服务名 -> UP 实例地址；没有 UP 实例的服务不出现在结果中
pub fn collect_up_services(applications: Vec<Application>) -> HashMap<String, Vec<String>> {
    let mut services = HashMap::new();

    for application in applications {
        let urls: Vec<String> = application
            .instance
            .into_vec()
            .iter()
            .filter(|instance| instance.is_up())
            .map(InstanceRecord::url)
            .collect();

        if !urls.is_empty() {
            services.insert(application.name, urls);
        }
    }

    services
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_registry_listing() {
        let body = br#"{"applications":{"application":[{"name":"svcB","instance":[{"ipAddr":"1.2.3.4","port":{"$":8080},"status":"UP"}]}]}}"#;
        let services = collect_up_services(decode_applications(body).unwrap());

        assert_eq!(services.len(), 1);
        assert_eq!(services["svcB"], vec!["http://1.2.3.4:8080".to_string()]);
    }

    #[test]
    fn only_up_instances_are_kept_in_order() {
        let body = br#"{"applications":{"application":[{"name":"svcA","instance":[
            {"ipAddr":"10.0.0.1","port":{"$":80},"status":"UP"},
            {"ipAddr":"10.0.0.2","port":{"$":80},"status":"DOWN"},
            {"ipAddr":"10.0.0.3","port":{"$":81},"status":"UP"}
        ]}]}}"#;
        let services = collect_up_services(decode_applications(body).unwrap());

        assert_eq!(
            services["svcA"],
            vec!["http://10.0.0.1:80".to_string(), "http://10.0.0.3:81".to_string()]
        );
    }

    #[test]
    fn services_without_up_instances_are_omitted() {
        let body = br#"{"applications":{"application":[{"name":"svcA","instance":[{"ipAddr":"10.0.0.1","port":{"$":80},"status":"STARTING"}]}]}}"#;
        let services = collect_up_services(decode_applications(body).unwrap());
        assert!(services.is_empty());
    }

    #[test]
    fn single_object_form_is_accepted() {
        let body = br#"{"applications":{"application":{"name":"svcC","instance":{"ipAddr":"10.0.0.9","port":{"$":9000},"status":"UP"}}}}"#;
        let services = collect_up_services(decode_applications(body).unwrap());
        assert_eq!(services["svcC"], vec!["http://10.0.0.9:9000".to_string()]);
    }

    #[test]
    fn empty_documents_yield_no_update() {
        for body in [&b"null"[..], b"{}", b"[]"] {
            assert!(decode_applications(body).unwrap().is_empty());
        }
    }

    #[test]
    fn malformed_documents_are_discovery_errors() {
        for body in [
            &br#"{"apps":[]}"#[..],
            br#"{"applications":{}}"#,
            br#"{"applications":{"application":[{"name":"svcA"}]}}"#,
            br#"{"applications":{"application":[{"name":"svcA","instance":[{"ipAddr":"1.1.1.1","status":"UP"}]}]}}"#,
            b"<applications/>",
        ] {
            let result = decode_applications(body);
            assert!(
                matches!(result, Err(EurekaError::Discovery(_))),
                "expected discovery error for {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
