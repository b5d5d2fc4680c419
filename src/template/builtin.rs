//! Templates shipped inside the binary

use crate::error::{ComposeKitError, Result};

/// Nginx Proxy Manager reverse proxy, data rooted at `app_data_base_path`
pub const REVERSE_PROXY: &str = include_str!("../../templates/reverse-proxy-docker-compose.yml");

const BUILTINS: &[(&str, &str)] = &[("reverse-proxy", REVERSE_PROXY)];

/// Names of all built-in templates
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Look up a built-in template by name
pub fn get(name: &str) -> Result<&'static str> {
    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, source)| *source)
        .ok_or_else(|| ComposeKitError::UnknownTemplate(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Template, VariableMap};

    fn srv_data() -> VariableMap {
        [("app_data_base_path", "/srv/data")].into_iter().collect()
    }

    #[test]
    fn test_lookup() {
        assert_eq!(names().collect::<Vec<_>>(), vec!["reverse-proxy"]);
        assert!(get("reverse-proxy").is_ok());
        assert!(matches!(
            get("nope"),
            Err(ComposeKitError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_reverse_proxy_single_placeholder() {
        let tpl = Template::parse(REVERSE_PROXY).unwrap();
        assert_eq!(tpl.placeholders(), vec!["app_data_base_path"]);
    }

    #[test]
    fn test_reverse_proxy_volumes() {
        let out = Template::parse(REVERSE_PROXY)
            .unwrap()
            .render(&srv_data())
            .unwrap();
        assert!(out.contains("- '/srv/data/reverse-proxy/data:/data'"));
        assert!(out.contains("- '/srv/data/reverse-proxy/letsencrypt:/etc/letsencrypt'"));
        assert!(!out.contains("{{"));
        assert!(!out.contains("}}"));
    }

    #[test]
    fn test_reverse_proxy_static_lines_unchanged() {
        let out = Template::parse(REVERSE_PROXY)
            .unwrap()
            .render(&srv_data())
            .unwrap();

        let source_lines: Vec<&str> = REVERSE_PROXY.lines().collect();
        let out_lines: Vec<&str> = out.lines().collect();
        assert_eq!(source_lines.len(), out_lines.len());
        for (src, rendered) in source_lines.iter().zip(&out_lines) {
            if !src.contains("{{") {
                assert_eq!(src, rendered);
            }
        }
        assert!(out.contains("image: 'jc21/nginx-proxy-manager:latest'"));
        assert!(out.contains("- '80:80'"));
        assert!(out.contains("- '443:443'"));
        assert!(out.contains("- '81:81'"));
    }

    #[test]
    fn test_reverse_proxy_idempotent() {
        let once = Template::parse(REVERSE_PROXY)
            .unwrap()
            .render(&srv_data())
            .unwrap();
        let twice = Template::parse(&once)
            .unwrap()
            .render(&VariableMap::new())
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reverse_proxy_missing_base_path() {
        let result = Template::parse(REVERSE_PROXY)
            .unwrap()
            .render(&VariableMap::new());
        match result {
            Err(ComposeKitError::MissingVariable { name, line, .. }) => {
                assert_eq!(name, "app_data_base_path");
                assert_eq!(line, 14);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
