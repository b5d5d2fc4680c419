//! Docker Compose file parser and checks for rendered output

use super::config::{
    BindMount, ComposeFile, PortConfig, PortConfigLong, PortMapping, VolumeMount,
};
use crate::error::{ComposeKitError, Result};
use std::path::Path;

/// Restart policies understood by compose
pub const RESTART_POLICIES: &[&str] = &["no", "always", "on-failure", "unless-stopped"];

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<ComposeFile> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ComposeKitError::ComposeParse(format!("Failed to read file: {}", e)))?;

        Self::parse_str(&content)
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<ComposeFile> {
        serde_yaml::from_str(content)
            .map_err(|e| ComposeKitError::ComposeParse(format!("Failed to parse YAML: {}", e)))
    }

    /// Parse and validate a compose file on disk
    pub fn check_file(path: &Path) -> Result<(ComposeFile, Vec<String>)> {
        let file = Self::parse_file(path)?;
        let warnings = Self::validate(&file)?;
        Ok((file, warnings))
    }

    /// Parse and validate, returning the document and any warnings
    pub fn check_str(content: &str) -> Result<(ComposeFile, Vec<String>)> {
        let file = Self::parse_str(content)?;
        let warnings = Self::validate(&file)?;
        Ok((file, warnings))
    }

    /// Validate compose configuration
    pub fn validate(file: &ComposeFile) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if file.version.is_none() {
            warnings.push("No 'version' key".to_string());
        }
        if file.services.is_empty() {
            return Err(ComposeKitError::ComposeParse(
                "No services defined".to_string(),
            ));
        }

        for (name, service) in &file.services {
            if service.image.as_deref().map_or(true, str::is_empty) {
                return Err(ComposeKitError::ComposeParse(format!(
                    "Service '{}' must have 'image' specified",
                    name
                )));
            }

            if let Some(restart) = &service.restart {
                if !is_restart_policy(restart) {
                    return Err(ComposeKitError::ComposeParse(format!(
                        "Service '{}' has invalid restart policy '{}'",
                        name, restart
                    )));
                }
            }

            for port in service.ports.iter().flatten() {
                match port {
                    PortConfig::Short(spec) => {
                        parse_port(spec).map_err(|e| {
                            ComposeKitError::ComposeParse(format!("Service '{}': {}", name, e))
                        })?;
                    }
                    PortConfig::Number(0) => {
                        return Err(ComposeKitError::ComposeParse(format!(
                            "Service '{}': invalid port 0",
                            name
                        )))
                    }
                    PortConfig::Long(PortConfigLong { target: 0, .. }) => {
                        return Err(ComposeKitError::ComposeParse(format!(
                            "Service '{}': invalid target port 0",
                            name
                        )))
                    }
                    PortConfig::Number(_) | PortConfig::Long(_) => {}
                }
            }

            for volume in service.volumes.iter().flatten() {
                match volume {
                    VolumeMount::Short(spec) => {
                        let mount = parse_volume(spec).map_err(|e| {
                            ComposeKitError::ComposeParse(format!("Service '{}': {}", name, e))
                        })?;
                        if !mount.is_host_path() {
                            warnings.push(format!(
                                "Service '{}' uses named volume '{}' (must exist or be declared)",
                                name, mount.source
                            ));
                        } else if !mount.source.starts_with('/') {
                            warnings.push(format!(
                                "Service '{}' mounts relative host path '{}'",
                                name, mount.source
                            ));
                        }
                    }
                    VolumeMount::Long(v) => {
                        if !v.target.starts_with('/') {
                            return Err(ComposeKitError::ComposeParse(format!(
                                "Service '{}': volume target '{}' must be absolute",
                                name, v.target
                            )));
                        }
                    }
                }
            }
        }

        Ok(warnings)
    }
}

fn is_restart_policy(policy: &str) -> bool {
    if RESTART_POLICIES.contains(&policy) {
        return true;
    }
    policy
        .strip_prefix("on-failure:")
        .map(|n| n.parse::<u32>().is_ok())
        .unwrap_or(false)
}

fn parse_port_number(s: &str, spec: &str) -> Result<u16> {
    s.parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| ComposeKitError::ComposeParse(format!("Invalid port '{}' in '{}'", s, spec)))
}

/// Parse short port syntax: `[ip:]host:container[/protocol]`
pub fn parse_port(spec: &str) -> Result<PortMapping> {
    let (mapping, protocol) = match spec.split_once('/') {
        Some((m, p)) => (m, p),
        None => (spec, "tcp"),
    };
    if protocol != "tcp" && protocol != "udp" {
        return Err(ComposeKitError::ComposeParse(format!(
            "Invalid protocol '{}' in '{}'",
            protocol, spec
        )));
    }

    let parts: Vec<&str> = mapping.split(':').collect();
    let (host_ip, host, container) = match parts.as_slice() {
        [host, container] => (None, *host, *container),
        [ip, host, container] if !ip.is_empty() => (Some(ip.to_string()), *host, *container),
        _ => {
            return Err(ComposeKitError::ComposeParse(format!(
                "Port mapping '{}' must be host:container",
                spec
            )))
        }
    };

    Ok(PortMapping {
        host_ip,
        host_port: parse_port_number(host, spec)?,
        container_port: parse_port_number(container, spec)?,
        protocol: protocol.to_string(),
    })
}

/// Parse short volume syntax: `source:target[:mode]`
pub fn parse_volume(spec: &str) -> Result<BindMount> {
    let parts: Vec<&str> = spec.split(':').collect();
    let (source, target, mode) = match parts.as_slice() {
        [source, target] => (*source, *target, None),
        [source, target, mode] => (*source, *target, Some(mode.to_string())),
        _ => {
            return Err(ComposeKitError::ComposeParse(format!(
                "Volume mount '{}' must be source:target[:mode]",
                spec
            )))
        }
    };

    if source.is_empty() {
        return Err(ComposeKitError::ComposeParse(format!(
            "Volume mount '{}' has an empty source",
            spec
        )));
    }
    if !target.starts_with('/') {
        return Err(ComposeKitError::ComposeParse(format!(
            "Volume mount '{}' target must be an absolute path",
            spec
        )));
    }

    Ok(BindMount {
        source: source.to_string(),
        target: target.to_string(),
        mode,
    })
}
