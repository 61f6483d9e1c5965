//! URL templates for rewritten asset references.
//!
//! A pattern is a literal string with up to three placeholders:
//!
//! - `{name}` - owning module name
//! - `{version}` - owning module version (empty when undeclared)
//! - `{path}` - asset path relative to the module's asset root
//!
//! Any other `{...}` sequence is kept literally.

use std::fmt;

/// Default URL prefix for emitted asset URLs.
pub const DEFAULT_PREFIX: &str = "/g";

/// Placeholder recognized in a [`UrlPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{name}`
    Name,
    /// `{version}`
    Version,
    /// `{path}`
    Path,
}

impl Placeholder {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "version" => Some(Self::Version),
            "path" => Some(Self::Path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Parsed URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    source: String,
    segments: Vec<Segment>,
}

impl UrlPattern {
    /// Parse a pattern string.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let placeholder = after
                .find('}')
                .and_then(|close| Placeholder::from_key(&after[..close]).map(|p| (p, close)));

            if let Some((placeholder, close)) = placeholder {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(placeholder));
                rest = &after[close + 1..];
            } else {
                literal.push('{');
                rest = after;
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: pattern.to_owned(),
            segments,
        }
    }

    /// Default `<prefix>/{name}/{path}` pattern.
    ///
    /// Trailing slashes on `prefix` are dropped so the result never contains
    /// a doubled separator.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self::parse(&format!("{}/{{name}}/{{path}}", prefix.trim_end_matches('/')))
    }

    /// Whether the pattern uses `placeholder`.
    #[must_use]
    pub fn has_placeholder(&self, placeholder: Placeholder) -> bool {
        self.segments
            .iter()
            .any(|segment| *segment == Segment::Placeholder(placeholder))
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute placeholders.
    #[must_use]
    pub fn render(&self, name: &str, version: Option<&str>, path: &str) -> String {
        let mut url = String::with_capacity(self.source.len() + name.len() + path.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Placeholder(Placeholder::Name) => url.push_str(name),
                Segment::Placeholder(Placeholder::Version) => url.push_str(version.unwrap_or("")),
                Segment::Placeholder(Placeholder::Path) => url.push_str(path),
            }
        }
        url
    }
}

impl Default for UrlPattern {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern = UrlPattern::default();
        assert_eq!(pattern.as_str(), "/g/{name}/{path}");
        assert_eq!(
            pattern.render("app", Some("1.0.0"), "img/logo.png"),
            "/g/app/img/logo.png"
        );
    }

    #[test]
    fn test_with_prefix_trims_trailing_slash() {
        let pattern = UrlPattern::with_prefix("https://cdn.example.com/assets/");
        assert_eq!(
            pattern.render("app", None, "a.png"),
            "https://cdn.example.com/assets/app/a.png"
        );
    }

    #[test]
    fn test_version_placeholder() {
        let pattern = UrlPattern::parse("//cdn.example.com/{name}/{version}/{path}");
        assert!(pattern.has_placeholder(Placeholder::Version));
        assert_eq!(
            pattern.render("widgets", Some("2.1.0"), "icons/x.svg"),
            "//cdn.example.com/widgets/2.1.0/icons/x.svg"
        );
    }

    #[test]
    fn test_missing_version_renders_empty() {
        let pattern = UrlPattern::parse("/{name}@{version}/{path}");
        assert_eq!(pattern.render("app", None, "a.png"), "/app@/a.png");
    }

    #[test]
    fn test_unknown_placeholder_is_literal() {
        let pattern = UrlPattern::parse("/{host}/{name}/{path}{");
        assert!(!pattern.has_placeholder(Placeholder::Version));
        assert_eq!(pattern.render("app", None, "a.png"), "/{host}/app/a.png{");
    }

    #[test]
    fn test_repeated_placeholder() {
        let pattern = UrlPattern::parse("/{name}/{name}/{path}");
        assert_eq!(pattern.render("app", None, "a.png"), "/app/app/a.png");
    }

    #[test]
    fn test_display_round_trips_source() {
        let pattern = UrlPattern::parse("/x/{path}");
        assert_eq!(pattern.to_string(), "/x/{path}");
        assert!(pattern.has_placeholder(Placeholder::Path));
        assert!(!pattern.has_placeholder(Placeholder::Name));
    }
}
