//! Placeholder scanner for template text

use super::Segment;
use crate::error::{ComposeKitError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Opening placeholder delimiter
pub const OPEN: &str = "{{";
/// Closing placeholder delimiter
pub const CLOSE: &str = "}}";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"));

/// Returns true if `name` is usable as a placeholder or variable name
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Template scanner
pub struct TemplateParser<'a> {
    source: &'a str,
}

impl<'a> TemplateParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Split the source into literal and placeholder segments
    pub fn parse(&self) -> Result<Vec<Segment>> {
        let src = self.source;
        let mut segments = Vec::new();
        let mut cursor = 0;

        while let Some(rel) = src[cursor..].find(OPEN) {
            let open_at = cursor + rel;
            if open_at > cursor {
                segments.push(Segment::Literal(src[cursor..open_at].to_string()));
            }

            let body_start = open_at + OPEN.len();
            // Placeholders never span lines
            let line_end = src[body_start..]
                .find('\n')
                .map(|i| body_start + i)
                .unwrap_or(src.len());

            let close_at = match src[body_start..line_end].find(CLOSE) {
                Some(i) => body_start + i,
                None => return Err(self.malformed(open_at, "unterminated placeholder")),
            };

            let name = src[body_start..close_at].trim();
            if name.is_empty() {
                return Err(self.malformed(open_at, "empty placeholder"));
            }
            if !is_valid_name(name) {
                return Err(self.malformed(
                    open_at,
                    &format!("invalid placeholder name '{}'", name),
                ));
            }

            let (line, column) = self.position(open_at);
            segments.push(Segment::Placeholder {
                name: name.to_string(),
                line,
                column,
            });

            cursor = close_at + CLOSE.len();
        }

        if cursor < src.len() {
            segments.push(Segment::Literal(src[cursor..].to_string()));
        }

        Ok(segments)
    }

    /// 1-based line and column (in chars) of a byte offset
    fn position(&self, offset: usize) -> (usize, usize) {
        let before = &self.source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    fn malformed(&self, offset: usize, reason: &str) -> ComposeKitError {
        let (line, column) = self.position(offset);
        ComposeKitError::MalformedTemplate {
            line,
            column,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_segments() {
        let segments = TemplateParser::new("a {{ x }} b {{y}}").parse().unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Literal("a ".to_string()),
                Segment::Placeholder {
                    name: "x".to_string(),
                    line: 1,
                    column: 3
                },
                Segment::Literal(" b ".to_string()),
                Segment::Placeholder {
                    name: "y".to_string(),
                    line: 1,
                    column: 13
                },
            ]
        );
    }

    #[test]
    fn test_no_placeholders() {
        let segments = TemplateParser::new("plain: text\n").parse().unwrap();
        assert_eq!(segments, vec![Segment::Literal("plain: text\n".to_string())]);
    }

    #[test]
    fn test_empty_source() {
        assert!(TemplateParser::new("").parse().unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_reports_position() {
        let err = TemplateParser::new("ok\n  - '{{ base/data'\n}}")
            .parse()
            .unwrap_err();
        match err {
            ComposeKitError::MalformedTemplate { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 6);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_invalid_names() {
        assert!(matches!(
            TemplateParser::new("{{   }}").parse(),
            Err(ComposeKitError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            TemplateParser::new("{{ a.b }}").parse(),
            Err(ComposeKitError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            TemplateParser::new("{{ 1abc }}").parse(),
            Err(ComposeKitError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn test_stray_close_is_literal() {
        let segments = TemplateParser::new("a }} b").parse().unwrap();
        assert_eq!(segments, vec![Segment::Literal("a }} b".to_string())]);
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("app_data_base_path"));
        assert!(is_valid_name("_x1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a-b"));
    }
}
