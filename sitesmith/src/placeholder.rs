//! Placeholder substitution engine
//!
//! Replaces `{{ key }}` and `{{ user.key }}` tokens in template file
//! content with user-entered form values. Substitution is a pure
//! function of `(content, data, kind)`: keys absent from the data are
//! left untouched, so re-rendering always starts from the original
//! fetched content rather than a previously rendered file.

use crate::form::{FieldValue, FormData};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(?:user\.)?([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}")
        .expect("placeholder pattern is valid")
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("token pattern is valid"));

static VALID_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:user\.)?[a-zA-Z_][a-zA-Z0-9_]*$").expect("name pattern is valid")
});

/// How a template file's content is treated during substitution
///
/// Computed once per file from the path extension and threaded through
/// the renderer, so the processing decision is explicit rather than
/// re-derived at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Script sources where substituted values must stay valid syntax
    /// (js, jsx, ts, tsx)
    Code,
    /// Markup, stylesheet, and text documents (html, htm, css, scss,
    /// sass, json, md, txt)
    Document,
    /// Anything else (binary assets); passed through unmodified
    Opaque,
}

impl FileKind {
    /// Classify a file by its path extension
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("js" | "jsx" | "ts" | "tsx") => Self::Code,
            Some("html" | "htm" | "css" | "scss" | "sass" | "json" | "md" | "txt") => {
                Self::Document
            }
            _ => Self::Opaque,
        }
    }

    /// Whether files of this kind go through placeholder substitution
    #[must_use]
    pub const fn is_processable(self) -> bool {
        !matches!(self, Self::Opaque)
    }
}

/// A problem found while scanning placeholder syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// What category of problem this is
    pub kind: SyntaxIssueKind,
    /// Human-readable description
    pub message: String,
}

/// Category of placeholder syntax problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxIssueKind {
    /// `{{` and `}}` counts differ
    UnbalancedBraces,
    /// A token's body is not a valid placeholder identifier
    MalformedName,
}

/// Substitute placeholders in `content` with values from `data`
///
/// Every occurrence of `{{ key }}` or `{{ user.key }}` whose key is
/// present in `data` is replaced; other tokens are left as-is. Value
/// formatting depends on the file kind:
///
/// - [`FileKind::Code`]: lists become JSON array literals, cleared
///   values become the literal `null`
/// - [`FileKind::Document`]: lists are comma-joined, cleared values
///   become the empty string
/// - [`FileKind::Opaque`]: content is returned unchanged
#[must_use]
pub fn render(content: &str, data: &FormData, kind: FileKind) -> String {
    if kind == FileKind::Opaque {
        return content.to_string();
    }

    PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures<'_>| {
            data.get(&caps[1]).map_or_else(
                || caps[0].to_string(),
                |value| format_value(value, kind),
            )
        })
        .into_owned()
}

fn format_value(value: &FieldValue, kind: FileKind) -> String {
    match value {
        FieldValue::Null => match kind {
            FileKind::Code => "null".to_string(),
            _ => String::new(),
        },
        FieldValue::Text(s) => s.clone(),
        FieldValue::Flag(b) => b.to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::List(items) => match kind {
            FileKind::Code => serde_json::Value::from(items.clone()).to_string(),
            _ => items.join(", "),
        },
    }
}

/// Collect the distinct placeholder names used in `content`
///
/// `{{user.name}}` and `{{name}}` both contribute the name `name`.
#[must_use]
pub fn extract_placeholder_names(content: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Scan `content` for placeholder syntax problems
///
/// Reports a count mismatch between `{{` and `}}`, and any token whose
/// body is not a valid identifier (optionally prefixed with `user.`).
#[must_use]
pub fn validate_brace_syntax(content: &str) -> Vec<SyntaxIssue> {
    let mut issues = Vec::new();

    let opening = content.matches("{{").count();
    let closing = content.matches("}}").count();
    if opening != closing {
        issues.push(SyntaxIssue {
            kind: SyntaxIssueKind::UnbalancedBraces,
            message: format!(
                "unbalanced placeholder braces: {opening} opening, {closing} closing"
            ),
        });
    }

    for caps in TOKEN.captures_iter(content) {
        let body = caps[1].trim();
        if !VALID_NAME.is_match(body) {
            issues.push(SyntaxIssue {
                kind: SyntaxIssueKind::MalformedName,
                message: format!("malformed placeholder name: '{body}'"),
            });
        }
    }

    issues
}
