//! CLI command implementations

pub mod ci;
pub mod config;
pub mod review;

pub use ci::CiArgs;
pub use config::ConfigArgs;
pub use review::ReviewArgs;
