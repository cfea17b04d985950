//! Common utilities for TypeScript rendering and naming.
//!
//! This module provides shared helper functions used by the registry and the emitter.

use std::collections::HashSet;
use std::sync::LazyLock;

use heck::ToUpperCamelCase;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Predefined type names that a declaration may not reuse.
pub static TS_BUILTIN_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "any",
        "unknown",
        "never",
        "string",
        "number",
        "boolean",
        "object",
        "symbol",
        "bigint",
        "undefined",
        "void",
        "null",
    ]
    .into_iter()
    .collect()
});

/// Check if a name needs quoting to be used as a property key.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in JavaScript/TypeScript string literals.
/// Escapes backslashes, double quotes and line breaks.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Quote a string if needed for use as a property key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// PascalCase a single naming segment, dropping characters that cannot
/// appear in an identifier. May return an empty string.
pub fn pascal_segment(segment: &str) -> String {
    segment
        .to_upper_camel_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect()
}

/// Turn an arbitrary name into a usable declaration name.
///
/// Valid identifiers that are neither reserved words nor builtin type names
/// are kept verbatim; everything else is PascalCased, with a leading `_`
/// when the result would start with a digit.
pub fn sanitize_type_name(name: &str) -> String {
    if !needs_quoting(name)
        && !TS_RESERVED_WORDS.contains(name)
        && !TS_BUILTIN_TYPES.contains(name)
    {
        return name.to_string();
    }

    let pascal = pascal_segment(name);
    if pascal.is_empty() {
        return "AnonymousType".to_string();
    }
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{pascal}");
    }
    pascal
}

/// Body lines of a JSDoc block for a field, without the comment markers.
pub fn jsdoc_lines(description: Option<&str>, deprecated: bool) -> Vec<String> {
    let mut lines: Vec<String> = description
        .map(|d| d.trim().lines().map(|l| l.trim_end().replace("*/", "*\\/")).collect())
        .unwrap_or_default();

    if deprecated {
        match lines.first_mut() {
            Some(first) => *first = format!("@deprecated {first}"),
            None => lines.push("@deprecated".to_string()),
        }
    }
    lines
}
