//! Content type matching against the configured set of XML media types.

use http::HeaderValue;
use mime::Mime;
use std::fmt;
use std::sync::Arc;

/// Media types treated as XML when nothing else is configured.
pub const DEFAULT_CONTENT_TYPES: [&str; 4] =
    ["application/xml", "text/xml", "application/rss+xml", "application/atom+xml"];

/// A predicate consulted after the type set, for matching rules that cannot
/// be expressed as an exact media type.
pub(crate) type MatchPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// An ordered set of media types, canonicalized once at construction.
///
/// Matching is case-insensitive and ignores parameters: the header value is
/// reduced to its essence (`type/subtype`) before comparison, so
/// `Application/XML; charset=utf-8` matches a configured `application/xml`.
pub struct ContentTypeMatcher {
    types: Vec<String>,
    custom: Option<MatchPredicate>,
}

impl ContentTypeMatcher {
    /// Builds the matcher from raw configured type strings.
    ///
    /// An empty list selects [`DEFAULT_CONTENT_TYPES`]; a supplied list
    /// replaces the defaults entirely.
    pub(crate) fn new(raw_types: Vec<String>, custom: Option<MatchPredicate>) -> Self {
        let mut types: Vec<String> = if raw_types.is_empty() {
            DEFAULT_CONTENT_TYPES.iter().map(|t| (*t).to_string()).collect()
        } else {
            raw_types.iter().map(|t| normalize_type(t)).collect()
        };
        types.dedup();
        Self { types, custom }
    }

    /// Checks a request's `Content-Type` header value against the set.
    ///
    /// A missing or non-ascii header never matches.
    pub fn matches(&self, content_type: Option<&HeaderValue>) -> bool {
        let Some(value) = content_type else {
            return false;
        };
        let Ok(raw) = value.to_str() else {
            return false;
        };
        let essence = normalize_type(raw);
        self.types.iter().any(|t| *t == essence)
            || self.custom.as_ref().is_some_and(|predicate| predicate(&essence))
    }
}

impl fmt::Debug for ContentTypeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeMatcher")
            .field("types", &self.types)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Reduces a media type string to its lower-cased essence.
///
/// Nonstandard configured strings that `mime` refuses to parse fall back to
/// stripping everything after the first `;` by hand.
fn normalize_type(raw: &str) -> String {
    match raw.parse::<Mime>() {
        Ok(parsed) => parsed.essence_str().to_ascii_lowercase(),
        Err(_) => raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase(),
    }
}
