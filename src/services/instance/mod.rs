//! Instance module
//!
//! Everything that describes this running instance to the registry:
//! - `identity`: app name, validated IPv4 address and port
//! - `descriptor`: the registration document built from the identity
//! - `address`: strategies for finding the local address

pub mod address;
pub mod descriptor;
pub mod identity;

pub use address::{AddressResolver, DefaultRouteAddress, InterfaceAddress, StaticAddress};
pub use descriptor::{InstanceDescriptor, InstanceStatus};
pub use identity::InstanceIdentity;
