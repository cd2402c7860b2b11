pub mod client;
pub mod discovery;
pub mod error;
pub mod instance;
pub mod registration;
pub mod supervisor;

pub use client::RegistryTransport;
pub use discovery::{DiscoveryCache, RegistryFetcher, SharedDiscoveryCache};
pub use error::{EurekaError, EurekaResult};
pub use instance::{InstanceDescriptor, InstanceIdentity, InstanceStatus};
pub use registration::{RegistrationClient, RegistrationOptions, RegistrationState};
pub use supervisor::LifecycleSupervisor;
