//! Foundation module - Core utilities shared by the engine
//!
//! - Logging setup and re-exported `log` macros

pub mod logging;
