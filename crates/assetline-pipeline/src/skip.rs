//! Decides whether a stylesheet is built on its own.

use std::fmt;
use std::path::Path;

use assetline_annotation::read_annotation;

/// Why a file was not compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File name starts with `_` (partial, only imported by other files).
    Partial,
    /// Leading comment carries `@compile: false`.
    CompileDisabled,
    /// Leading comment carries a truthy legacy `ignore` directive.
    LegacyIgnore,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Partial => "partial (name starts with `_`)",
            Self::CompileDisabled => "disabled by `@compile`",
            Self::LegacyIgnore => "disabled by `ignore`",
        })
    }
}

/// Return the reason `path` should not be compiled, if any.
///
/// `legacy_ignore` enables the older `@ignore` / `!!cmd: ignore=true` opt-out.
pub fn should_skip(path: &Path, source: &str, legacy_ignore: bool) -> Option<SkipReason> {
    let is_partial = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'));
    if is_partial {
        return Some(SkipReason::Partial);
    }

    if read_annotation(source, "compile").is_some_and(|a| a.is_value("false")) {
        return Some(SkipReason::CompileDisabled);
    }

    if legacy_ignore && read_annotation(source, "ignore").is_some_and(|a| a.is_truthy()) {
        return Some(SkipReason::LegacyIgnore);
    }

    None
}
