//! Port traits the engine's file-driven surface is written against.

pub mod config_port;
pub mod data_port;
pub mod report_port;
