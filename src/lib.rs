//! composekit - render parameterized docker-compose templates
//!
//! composekit turns compose templates containing `{{ name }}` placeholders
//! into deployable compose files. It provides:
//!
//! - Single-pass placeholder substitution with strict missing-variable errors
//! - Variables from YAML files, the environment and the command line
//! - Built-in templates (the Nginx Proxy Manager reverse proxy)
//! - Rendering whole template directories
//! - Optional compose checks on rendered output

pub mod compose;
pub mod error;
pub mod template;

pub use error::{ComposeKitError, Result};
pub use template::{render_str, Template, VariableMap};
