#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

pub use credentials::{Auth, Credentials};
pub use toml_config::AppConfig;
