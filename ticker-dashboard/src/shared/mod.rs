/// Shared modules for the ticker dashboards
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod present;
pub mod refresh;
pub mod render;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
