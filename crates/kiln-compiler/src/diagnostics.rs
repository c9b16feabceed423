//! Structured diagnostics extracted from bundler failures.
//!
//! Rolldown reports build failures through its own diagnostic types.
//! This module flattens them into a stable, cloneable shape so callers
//! (and the error type in `lib.rs`) never depend on upstream error
//! internals. Extraction parses the formatted representation, which
//! keeps the crate insulated from upstream type churn.

use serde::{Deserialize, Serialize};

/// One diagnostic from a failed build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub help: Option<String>,
}

/// Category of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseError,
    MissingExport,
    CircularDependency,
    UnresolvedEntry,
    UnresolvedImport,
    Plugin,
    Transform,
    Other,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ParseError => "parse error",
            Self::MissingExport => "missing export",
            Self::CircularDependency => "circular dependency",
            Self::UnresolvedEntry => "unresolved entry",
            Self::UnresolvedImport => "unresolved import",
            Self::Plugin => "plugin error",
            Self::Transform => "transform error",
            Self::Other => "build error",
        };
        f.write_str(name)
    }
}

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Extract diagnostics from a bundler error.
///
/// Works from the debug representation; batched diagnostics are split
/// so every underlying failure surfaces individually.
pub fn extract_from_rolldown_error(error: &dyn std::fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let text = format!("{error:?}");

    if text.contains("BatchedBuildDiagnostic") {
        let parts: Vec<&str> = text
            .split("BatchedBuildDiagnostic")
            .filter(|s| !s.trim().is_empty())
            .collect();
        if parts.len() > 1 {
            return parts.into_iter().map(extract_single).collect();
        }
    }

    vec![extract_single(&text)]
}

fn extract_single(text: &str) -> ExtractedDiagnostic {
    let kind = classify(text);
    let severity = if text.contains("warning") || text.contains("Warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    ExtractedDiagnostic {
        kind,
        severity,
        message: text.trim().to_string(),
        file: extract_file_path(text),
        line: extract_position(text).map(|(line, _)| line),
        column: extract_position(text).and_then(|(_, column)| column),
        help: extract_help(text),
    }
}

fn classify(text: &str) -> DiagnosticKind {
    if text.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if text.contains("Parse") || text.contains("Syntax") || text.contains("Expected") {
        DiagnosticKind::ParseError
    } else if text.contains("Circular") || text.contains("cycle") {
        DiagnosticKind::CircularDependency
    } else if text.contains("UnresolvedEntry") || text.contains("unresolved entry") {
        DiagnosticKind::UnresolvedEntry
    } else if text.contains("UnresolvedImport") || text.contains("Cannot resolve") {
        DiagnosticKind::UnresolvedImport
    } else if text.contains("Plugin") || text.contains("plugin") {
        DiagnosticKind::Plugin
    } else if text.contains("Transform") || text.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other
    }
}

/// Find the first thing that looks like a source file path.
fn extract_file_path(text: &str) -> Option<String> {
    for ext in [".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".mdx", ".md", ".css"] {
        let Some(pos) = text.find(ext) else { continue };
        let before = &text[..pos + ext.len()];
        // Paths arrive quoted or after a preposition.
        for marker in ["\"", "'", "in ", "at ", "file: "] {
            if let Some(start) = before.rfind(marker) {
                let candidate = before[start + marker.len()..].trim();
                if !candidate.is_empty() && !candidate.contains(['\n', '"', '\'']) {
                    return Some(candidate.to_string());
                }
            }
        }
    }
    None
}

/// Parse a trailing `:line:column` or `:line` position marker.
fn extract_position(text: &str) -> Option<(u32, Option<u32>)> {
    // Scan for ":<digits>" pairs; the first hit after a path-ish token
    // is taken as line (and optionally column).
    let bytes = text.as_bytes();
    let mut i = 0;
    while let Some(rel) = text[i..].find(':') {
        let pos = i + rel;
        let after = &text[pos + 1..];
        let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
        if !digits.is_empty() && pos > 0 && !bytes[pos - 1].is_ascii_whitespace() {
            let line = digits.parse().ok()?;
            let rest = &after[digits.len()..];
            let column = rest.strip_prefix(':').and_then(|r| {
                let cdigits: String = r.chars().take_while(char::is_ascii_digit).collect();
                cdigits.parse().ok()
            });
            return Some((line, column));
        }
        i = pos + 1;
    }
    None
}

fn extract_help(text: &str) -> Option<String> {
    for marker in ["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(marker) {
            let line = text[pos + marker.len()..].lines().next()?.trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unresolved_imports() {
        let diags =
            extract_from_rolldown_error(&"Cannot resolve \"missing-pkg\" in \"app/root.tsx\"");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedImport);
        assert_eq!(diags[0].severity, DiagnosticSeverity::Error);
    }

    #[test]
    fn extracts_file_and_position() {
        let diag = &extract_from_rolldown_error(&"Parse error in app/routes/home.tsx:14:7")[0];
        assert_eq!(diag.kind, DiagnosticKind::ParseError);
        assert_eq!(diag.file.as_deref(), Some("app/routes/home.tsx"));
        assert_eq!(diag.line, Some(14));
        assert_eq!(diag.column, Some(7));
    }

    #[test]
    fn batched_errors_split_into_many() {
        let text = "BatchedBuildDiagnostic Cannot resolve \"a\" in \"x.ts\" \
                    BatchedBuildDiagnostic Cannot resolve \"b\" in \"y.ts\"";
        let diags = extract_from_rolldown_error(&text);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn help_text_is_captured() {
        let diag = &extract_from_rolldown_error(
            &"MissingExport \"loader\"\nhelp: did you mean \"load\"?",
        )[0];
        assert_eq!(diag.kind, DiagnosticKind::MissingExport);
        assert_eq!(diag.help.as_deref(), Some("did you mean \"load\"?"));
    }

    #[test]
    fn unknown_errors_fall_through_to_other() {
        let diag = &extract_from_rolldown_error(&"something went sideways")[0];
        assert_eq!(diag.kind, DiagnosticKind::Other);
    }
}
