//! Command implementations for the Hente CLI.

mod build;
mod config;
mod doctor;
mod init;
mod search;

pub use build::run_build;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use search::run_search;
