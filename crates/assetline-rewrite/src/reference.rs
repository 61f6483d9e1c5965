//! Locating `url(...)` and `@import "..."` references in CSS text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\s*\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("invalid url() regex")
});

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s*['"]([^'"]+)['"]"#).expect("invalid @import regex")
});

static ABSOLUTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+:)?/").expect("invalid absolute url regex"));

static MODULE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]+):(.+)$").expect("invalid module reference regex"));

/// Syntactic form of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `url(...)`, with or without quotes.
    Url,
    /// `@import "..."` or `@import '...'`.
    Import,
}

/// One resource reference inside CSS text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Syntactic form.
    pub kind: ReferenceKind,
    /// Argument text, without quotes.
    pub raw: &'a str,
    /// Byte range of `raw` within the scanned CSS.
    pub span: Range<usize>,
}

/// Target of a reference argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Absolute URL or `data:` URI; never rewritten.
    External,
    /// `module:remainder` cross-module reference.
    Module {
        /// Module token before the colon.
        module: &'a str,
        /// Path within the module's asset root.
        path: &'a str,
    },
    /// Path relative to the referencing file.
    Relative(&'a str),
}

/// Classify a reference argument.
#[must_use]
pub fn classify(raw: &str) -> Target<'_> {
    if ABSOLUTE_PATTERN.is_match(raw) || raw.starts_with("data:") {
        return Target::External;
    }
    match MODULE_PATTERN.captures(raw) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(module), Some(path)) => Target::Module {
                module: module.as_str(),
                path: path.as_str(),
            },
            _ => Target::Relative(raw),
        },
        None => Target::Relative(raw),
    }
}

/// Find all references in `css`, ordered by position.
///
/// Overlapping matches keep the one that starts first.
#[must_use]
pub fn scan_references(css: &str) -> Vec<Reference<'_>> {
    let mut references: Vec<Reference<'_>> = [
        (&*URL_PATTERN, ReferenceKind::Url),
        (&*IMPORT_PATTERN, ReferenceKind::Import),
    ]
    .into_iter()
    .flat_map(|(pattern, kind)| {
        pattern
            .captures_iter(css)
            .filter_map(move |caps| caps.get(1))
            .map(move |arg| Reference {
                kind,
                raw: arg.as_str(),
                span: arg.range(),
            })
    })
    .collect();

    references.sort_by_key(|reference| reference.span.start);

    let mut end = 0;
    references.retain(|reference| {
        let keep = reference.span.start >= end;
        if keep {
            end = reference.span.end;
        }
        keep
    });
    references
}
