//! Line-level directives shared by list files and app-set manifests.

use crate::apps::SourceKind;

const INCLUDE_KEYWORD: &str = "@include";

/// One meaningful line of a list or manifest file.
///
/// Patterns are tried in a fixed priority order: include directive, typed
/// entry, then raw literal. Blank lines and `#` comments produce no directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `@include <path>`
    Include(String),
    /// `<kind>:<value>` where kind is a known source tag
    Entry(SourceKind, String),
    /// Anything else, trimmed
    Literal(String),
}

impl Directive {
    /// Parse a single line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(rest) = line.strip_prefix(INCLUDE_KEYWORD) {
            if rest.is_empty() {
                tracing::warn!("ignoring @include without a path");
                return None;
            }
            // "@includefoo" is not an include
            if rest.starts_with(char::is_whitespace) {
                return Some(Self::Include(rest.trim().to_string()));
            }
        }

        if let Some((tag, value)) = line.split_once(':')
            && let Some(kind) = SourceKind::from_tag(tag.trim())
            && !value.trim().is_empty()
        {
            return Some(Self::Entry(kind, value.trim().to_string()));
        }

        Some(Self::Literal(line.to_string()))
    }
}
