pub mod config;
pub mod server;
pub mod services;

pub use config::{ConfigError, EurekaConfig};
pub use services::{
    DiscoveryCache, EurekaError, InstanceStatus, LifecycleSupervisor, RegistrationClient,
};
