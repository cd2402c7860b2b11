pub mod config;
pub mod transport;

pub use config::*;
pub use transport::*;
