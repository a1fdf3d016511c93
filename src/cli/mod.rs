//! CLI command implementations

pub mod analyze;
pub mod init;
pub mod serve;
