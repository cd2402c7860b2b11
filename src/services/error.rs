use thiserror::Error;

/// Eureka 客户端错误类型
#[derive(Error, Debug)]
pub enum EurekaError {
    #[error("Invalid service name: {0:?}")]
    InvalidServiceName(String),

    #[error("Invalid local address: {0}")]
    InvalidAddress(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Discovery failed: {0}")]
    Discovery(String),
}

pub type EurekaResult<T> = Result<T, EurekaError>;
