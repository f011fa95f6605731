//! Requirements parsing and validation.
//!
//! A requirements source is a `requirements.txt`-style listing: one
//! requirement per line, `#` comments, blank lines ignored. Each meaningful
//! line has the shape
//!
//! ```text
//! name[extras] <op> version ; markers
//! ```
//!
//! where everything after the name is optional. Validation is deliberately
//! permissive about version syntax (pip is the authority on that) but strict
//! about the overall line shape, and reports every offending line rather
//! than stopping at the first.

pub mod source;

use regex::Regex;
use std::sync::LazyLock;

use crate::core::PipmatrixError;

/// Line shape for a single requirement: name, optional `[extras]`, optional
/// comparison operator + version, optional `;` environment markers.
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^([A-Za-z0-9_.\-]+)                 # package name
        (\[[A-Za-z0-9_.\-,\s]+\])?          # optional extras
        \s*
        (?:([=><!~]{1,2})\s*([^\s\#;]+))?   # optional operator + version
        (?:\s*;[^\#]+)?                     # optional environment markers
        $",
    )
    .unwrap()
});

/// One parsed requirement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as written (case preserved)
    pub name: String,
    /// Extras including brackets, e.g. `[standard]`
    pub extras: Option<String>,
    /// Comparison operator, e.g. `==`, `>=`, `~=`
    pub operator: Option<String>,
    /// Version component of the specifier
    pub version: Option<String>,
}

impl Requirement {
    /// Whether this requirement pins an exact version with `==`.
    ///
    /// Exact pins expand to a single candidate without consulting the
    /// package index.
    pub fn exact_pin(&self) -> Option<&str> {
        match (self.operator.as_deref(), self.version.as_deref()) {
            (Some("=="), Some(version)) => Some(version),
            _ => None,
        }
    }
}

/// Splits raw text into meaningful requirement lines.
///
/// Blank lines and `#` comment lines are dropped; surrounding whitespace is
/// trimmed. Line numbers are not preserved here - [`validate_lines`] works on
/// the raw text so its error messages can reference original line numbers.
pub fn strip_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Validates raw requirements text, collecting one message per bad line.
///
/// Returns `Ok(())` when at least one meaningful line exists and every
/// meaningful line matches the requirement shape. An empty input and an
/// input with only comments/blanks are distinct failures.
pub fn validate_lines(raw: &str) -> Result<(), Vec<String>> {
    if raw.trim().is_empty() {
        return Err(vec!["Empty input: no lines to validate.".to_string()]);
    }

    let mut errors = Vec::new();
    let mut any_meaningful = false;

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        any_meaningful = true;
        if !REQUIREMENT_RE.is_match(trimmed) {
            errors.push(format!("Line {} failed: \"{}\"", idx + 1, line));
        }
    }

    if !any_meaningful {
        return Err(vec!["No meaningful requirement lines found.".to_string()]);
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Parses raw requirements text into [`Requirement`]s.
///
/// Fails with [`PipmatrixError::EmptyInput`] when nothing survives comment
/// stripping, and with [`PipmatrixError::InvalidRequirement`] on the first
/// malformed line (callers wanting every error use [`validate_lines`]).
pub fn parse(raw: &str) -> Result<Vec<Requirement>, PipmatrixError> {
    let mut requirements = Vec::new();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let captures =
            REQUIREMENT_RE.captures(trimmed).ok_or_else(|| PipmatrixError::InvalidRequirement {
                line: idx + 1,
                content: line.to_string(),
            })?;
        requirements.push(Requirement {
            name: captures[1].to_string(),
            extras: captures.get(2).map(|m| m.as_str().to_string()),
            operator: captures.get(3).map(|m| m.as_str().to_string()),
            version: captures.get(4).map(|m| m.as_str().to_string()),
        });
    }

    if requirements.is_empty() {
        return Err(PipmatrixError::EmptyInput);
    }
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_shapes() {
        let raw = "# pinned\nrequests==2.31.0\nflask\nuvicorn[standard]>=0.23\nnumpy~=1.26 ; python_version >= \"3.9\"\n";
        let reqs = parse(raw).unwrap();
        assert_eq!(reqs.len(), 4);

        assert_eq!(reqs[0].name, "requests");
        assert_eq!(reqs[0].exact_pin(), Some("2.31.0"));

        assert_eq!(reqs[1].name, "flask");
        assert!(reqs[1].operator.is_none());

        assert_eq!(reqs[2].extras.as_deref(), Some("[standard]"));
        assert_eq!(reqs[2].operator.as_deref(), Some(">="));
        assert!(reqs[2].exact_pin().is_none());

        assert_eq!(reqs[3].operator.as_deref(), Some("~="));
        assert_eq!(reqs[3].version.as_deref(), Some("1.26"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse(""), Err(PipmatrixError::EmptyInput)));
        assert!(matches!(parse("# only comments\n\n"), Err(PipmatrixError::EmptyInput)));
    }

    #[test]
    fn invalid_line_reports_position() {
        let raw = "requests==2.31.0\n==1.0\n";
        match parse(raw) {
            Err(PipmatrixError::InvalidRequirement { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "==1.0");
            }
            other => panic!("expected InvalidRequirement, got {other:?}"),
        }
    }

    #[test]
    fn validate_collects_all_errors() {
        let raw = "good==1.0\nbad name here\nalso//bad\n";
        let errors = validate_lines(raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Line 2"));
        assert!(errors[1].contains("Line 3"));
    }

    #[test]
    fn validate_distinguishes_empty_from_comment_only() {
        assert_eq!(validate_lines("").unwrap_err()[0], "Empty input: no lines to validate.");
        assert_eq!(
            validate_lines("# nothing\n\n").unwrap_err()[0],
            "No meaningful requirement lines found."
        );
    }

    #[test]
    fn validate_accepts_clean_file() {
        assert!(validate_lines("requests>=2.0\n# note\nflask\n").is_ok());
    }

    #[test]
    fn strip_lines_drops_noise() {
        let lines = strip_lines("  requests==2.0  \n\n# comment\nflask\n");
        assert_eq!(lines, vec!["requests==2.0", "flask"]);
    }
}
