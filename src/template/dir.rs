//! Rendering a whole directory of templates

use super::{Template, VariableMap};
use crate::error::{ComposeKitError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as templates
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yml", "yaml", "j2"];

/// A rendered template and where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEMPLATE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Output path relative to the destination root, with `.j2` stripped
fn output_relative(relative: &Path) -> PathBuf {
    if relative.extension().and_then(|e| e.to_str()) == Some("j2") {
        relative.with_extension("")
    } else {
        relative.to_path_buf()
    }
}

/// Render every template under `src` into `dest`, mirroring relative paths.
///
/// All templates are rendered in memory first; nothing is written unless
/// every one of them succeeds.
pub fn render_dir(src: &Path, dest: &Path, vars: &VariableMap) -> Result<Vec<RenderedFile>> {
    if !src.is_dir() {
        return Err(ComposeKitError::InvalidConfig(format!(
            "Template directory not found: {}",
            src.display()
        )));
    }

    let mut pending: Vec<(PathBuf, PathBuf, String)> = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| ComposeKitError::Io(e.into()))?;
        if !entry.file_type().is_file() || !is_template(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ComposeKitError::InvalidConfig(e.to_string()))?;

        let source = std::fs::read_to_string(entry.path())?;
        let rendered = Template::parse(&source)
            .and_then(|t| t.render(vars))
            .map_err(|e| {
                tracing::warn!("Failed to render {}: {}", entry.path().display(), e);
                e
            })?;

        let destination = dest.join(output_relative(relative));
        if let Some((other, _, _)) = pending.iter().find(|(_, d, _)| *d == destination) {
            return Err(ComposeKitError::InvalidConfig(format!(
                "{} and {} both render to {}",
                other.display(),
                entry.path().display(),
                destination.display()
            )));
        }

        pending.push((entry.path().to_path_buf(), destination, rendered));
    }

    let mut written = Vec::with_capacity(pending.len());
    for (source, destination, rendered) in pending {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destination, rendered)?;
        tracing::info!("Rendered {} -> {}", source.display(), destination.display());
        written.push(RenderedFile {
            source,
            destination,
        });
    }

    Ok(written)
}
