//! Port traits the domain is driven through.

pub mod config_port;
pub mod history_port;
pub mod report_port;
