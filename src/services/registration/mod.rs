//! Registration module
//!
//! - `types`: construction options and the registration state
//! - `client`: register / renew / deregister against the registry
//! - `heartbeat`: the background renewal loop

pub mod client;
pub mod heartbeat;
pub mod types;

pub use client::RegistrationClient;
pub use types::{RegistrationOptions, RegistrationState};
