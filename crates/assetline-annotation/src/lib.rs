//! Build directive extraction for assetline.
//!
//! Source files carry build-time directives in the block comment that opens
//! the file. Two syntaxes are understood:
//!
//! ```text
//! /*
//!  * @entry
//!  * @moduleId: test/my-module
//!  * @compile: 'false'
//!  * @path: "/a/b-c/hello"
//!  */
//! ```
//!
//! and the legacy command form:
//!
//! ```text
//! /* !!cmd: buildless=false */
//! ```
//!
//! Only the first block comment is searched, and only when it sits at the very
//! start of the buffer (leading whitespace aside). A directive that appears in
//! any later comment is invisible.
//!
//! # Example
//!
//! ```
//! use assetline_annotation::{Annotation, read_annotation};
//!
//! let source = "/* @entry @moduleId: 'app/main' */\nbody { color: red; }";
//! assert_eq!(read_annotation(source, "entry"), Some(Annotation::Flag));
//! assert_eq!(read_annotation(source, "moduleId"), Some(Annotation::Value("app/main")));
//! assert_eq!(read_annotation(source, "compile"), None);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// First `/* ... */` comment, anchored at the start of the buffer.
static LEADING_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*/\*[^*]*\*+(?:[^/*][^*]*\*+)*/").expect("invalid leading comment regex")
});

/// `@name`, `@name: value`, `@name: 'value'`, `@name: "value"`.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@([-A-Za-z0-9_]+)(?:[ \t]*:[ \t]*(?:([-A-Za-z0-9_./]+)|['"]([^'"]+)['"]))?"#)
        .expect("invalid directive regex")
});

/// `!!cmd: name=value`.
static LEGACY_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!!cmd:[ \t]*([-A-Za-z0-9_]+)[ \t]*=[ \t]*([-A-Za-z0-9_]+)")
        .expect("invalid legacy directive regex")
});

/// Value of a directive found in the leading comment.
///
/// Borrows from the source buffer; quote delimiters are stripped and nothing
/// is unescaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation<'a> {
    /// Directive present without a value (`@entry`).
    Flag,
    /// Directive with a bare or quoted value (`@compile: false`).
    Value(&'a str),
}

impl<'a> Annotation<'a> {
    /// The directive value, or `None` for a bare flag.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Flag => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Whether the directive switches its option on.
    ///
    /// A bare flag is truthy. A value is truthy unless it is empty or one of
    /// `false`, `0`, `no`, `off`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag => true,
            Self::Value(value) => !matches!(*value, "" | "false" | "0" | "no" | "off"),
        }
    }

    /// Whether the directive carries exactly the given value.
    #[must_use]
    pub fn is_value(&self, expected: &str) -> bool {
        self.as_str() == Some(expected)
    }
}

/// Return the block comment that opens `source`, including its delimiters.
///
/// Returns `None` when the buffer does not start (after whitespace) with a
/// complete `/* ... */` comment.
#[must_use]
pub fn leading_comment(source: &str) -> Option<&str> {
    LEADING_COMMENT.find(source).map(|m| m.as_str())
}

/// Read the directive `name` from the leading comment of `source`.
///
/// The modern `@name` grammar is searched first. The legacy `!!cmd:` grammar
/// is consulted only when no modern directive has this exact name, even if
/// other modern directives are present.
#[must_use]
pub fn read_annotation<'a>(source: &'a str, name: &str) -> Option<Annotation<'a>> {
    let comment = leading_comment(source)?;
    find_directive(comment, name).or_else(|| find_legacy_directive(comment, name))
}

fn find_directive<'a>(comment: &'a str, name: &str) -> Option<Annotation<'a>> {
    let caps = DIRECTIVE
        .captures_iter(comment)
        .find(|caps| &caps[1] == name)?;

    Some(
        caps.get(2)
            .or_else(|| caps.get(3))
            .map_or(Annotation::Flag, |value| Annotation::Value(value.as_str())),
    )
}

fn find_legacy_directive<'a>(comment: &'a str, name: &str) -> Option<Annotation<'a>> {
    LEGACY_DIRECTIVE
        .captures_iter(comment)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2))
        .map(|value| Annotation::Value(value.as_str()))
}
