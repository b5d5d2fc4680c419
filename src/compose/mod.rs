//! Docker Compose document checks
//!
//! Rendered templates can optionally be parsed back into typed compose
//! structures to catch mistakes before handing them to a compose runtime.

pub mod config;
pub mod parser;

pub use config::{ComposeFile, ServiceConfig};
pub use parser::ComposeParser;
