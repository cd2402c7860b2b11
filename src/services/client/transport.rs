use reqwest::{Client, StatusCode, header};

use super::config::TransportConfig;
use crate::services::discovery::types::{Application, decode_applications};
use crate::services::error::{EurekaError, EurekaResult};
use crate::services::instance::InstanceDescriptor;

/// 注册中心上应用列表的路径
pub const SERVICE_PATH: &str = "eureka/apps";

/// 对注册中心的出站 HTTP 调用
///
/// 这里只负责收发，状态码的含义由调用方解释。
#[derive(Debug, Clone)]
pub struct RegistryTransport {
    base_url: String,
    http: Client,
}

impl RegistryTransport {
    pub fn new(config: TransportConfig) -> EurekaResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EurekaError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.registry_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// 便捷的创建方法，使用默认超时
    pub fn connect(registry_url: &str) -> EurekaResult<Self> {
        Self::new(TransportConfig {
            registry_url: registry_url.to_string(),
            ..Default::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn app_url(&self, app_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, SERVICE_PATH, app_name)
    }

    fn instance_url(&self, app_name: &str, instance_id: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, SERVICE_PATH, app_name, instance_id)
    }

    /// POST 注册数据
    pub async fn register(
        &self,
        app_name: &str,
        descriptor: &InstanceDescriptor,
    ) -> EurekaResult<StatusCode> {
        let response = self
            .http
            .post(self.app_url(app_name))
            .json(descriptor)
            .send()
            .await
            .map_err(|e| EurekaError::Registration(format!("registry unreachable: {e}")))?;

        Ok(response.status())
    }

    /// PUT 心跳，请求体为空
    pub async fn renew(&self, app_name: &str, instance_id: &str) -> EurekaResult<StatusCode> {
        let response = self
            .http
            .put(self.instance_url(app_name, instance_id))
            .send()
            .await
            .map_err(|e| EurekaError::Registration(format!("registry unreachable: {e}")))?;

        Ok(response.status())
    }

    /// DELETE 注销实例
    pub async fn cancel(&self, app_name: &str, instance_id: &str) -> EurekaResult<StatusCode> {
        let response = self
            .http
            .delete(self.instance_url(app_name, instance_id))
            .send()
            .await
            .map_err(|e| EurekaError::Registration(format!("registry unreachable: {e}")))?;

        Ok(response.status())
    }

    /// GET `{base}/{endpoint}` 并解析应用列表
    pub async fn fetch(&self, endpoint: &str) -> EurekaResult<Vec<Application>> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| EurekaError::Discovery(format!("registry unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EurekaError::Discovery(format!(
                "registry responded with status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EurekaError::Discovery(format!("failed to read response body: {e}")))?;

        decode_applications(&body)
    }
}
