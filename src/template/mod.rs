//! Compose template rendering
//!
//! Templates are plain text with `{{ name }}` placeholders. A template is
//! parsed once into [`Segment`]s and can then be rendered any number of
//! times against different [`VariableMap`]s. Rendering is a single pass:
//! substituted values are inserted literally and never re-scanned.

pub mod builtin;
pub mod dir;
pub mod parser;
pub mod vars;

pub use dir::{render_dir, RenderedFile};
pub use parser::TemplateParser;
pub use vars::{VariableMap, VariableSources};

use crate::error::{ComposeKitError, Result};

/// A piece of parsed template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output unchanged
    Literal(String),
    /// Variable reference, with the 1-based position of its opening `{{`
    Placeholder {
        name: String,
        line: usize,
        column: usize,
    },
}

/// Parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    source_len: usize,
}

impl Template {
    /// Parse template text
    pub fn parse(source: &str) -> Result<Self> {
        let segments = TemplateParser::new(source).parse()?;
        tracing::debug!(
            "Parsed template: {} segments, {} placeholders",
            segments.len(),
            segments
                .iter()
                .filter(|s| matches!(s, Segment::Placeholder { .. }))
                .count()
        );
        Ok(Self {
            segments,
            source_len: source.len(),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { name, .. } = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholders with no entry in `vars`
    pub fn missing<'a>(&'a self, vars: &VariableMap) -> Vec<&'a str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !vars.contains(name))
            .collect()
    }

    /// Substitute every placeholder.
    ///
    /// Fails on the first placeholder without a value; no partial output is
    /// ever returned.
    pub fn render(&self, vars: &VariableMap) -> Result<String> {
        let mut out = String::with_capacity(self.source_len);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, line, column } => {
                    let value = vars.get(name).ok_or_else(|| ComposeKitError::MissingVariable {
                        name: name.clone(),
                        line: *line,
                        column: *column,
                    })?;
                    out.push_str(value);
                }
            }
        }

        let used = self.placeholders();
        for name in vars.names().filter(|n| !used.contains(n)) {
            tracing::debug!("Variable '{}' is not referenced by the template", name);
        }

        Ok(out)
    }
}

/// Parse and render in one step
pub fn render_str(source: &str, vars: &VariableMap) -> Result<String> {
    Template::parse(source)?.render(vars)
}
