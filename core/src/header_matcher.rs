//! `HeaderMatcher` — Named predicate over an optional attribute value
//!
//! Adds two kinds on top of [`StringMatcher`]:
//!
//! - `Range` — the value parses as a base-10 `i64` inside `[start, end)`
//! - `Present` — the attribute is (or is not) present at all
//!
//! The embedded `StringMatcher` is always case-sensitive. `invert_match` is
//! applied last, to every kind, including the absent-value case.

use crate::{MatchKind, MatcherError, StringMatcher};
use std::fmt;

/// Which predicate a [`HeaderMatcher`] evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderMatchKind {
    /// Whole-string equality.
    Exact,
    /// Value starts with the pattern.
    Prefix,
    /// Value ends with the pattern.
    Suffix,
    /// Pattern occurs anywhere in the value.
    Contains,
    /// Value is fully matched by a regular expression.
    SafeRegex,
    /// Value is an integer in a half-open range.
    Range,
    /// Attribute presence.
    Present,
}

impl HeaderMatchKind {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Contains => "contains",
            Self::SafeRegex => "safe_regex",
            Self::Range => "range",
            Self::Present => "present",
        }
    }
}

impl fmt::Display for HeaderMatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MatchKind> for HeaderMatchKind {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Exact => Self::Exact,
            MatchKind::Prefix => Self::Prefix,
            MatchKind::Suffix => Self::Suffix,
            MatchKind::Contains => Self::Contains,
            MatchKind::SafeRegex => Self::SafeRegex,
        }
    }
}

/// Fails with the original kind for `Range` and `Present`.
impl TryFrom<HeaderMatchKind> for MatchKind {
    type Error = HeaderMatchKind;

    fn try_from(kind: HeaderMatchKind) -> Result<Self, Self::Error> {
        match kind {
            HeaderMatchKind::Exact => Ok(Self::Exact),
            HeaderMatchKind::Prefix => Ok(Self::Prefix),
            HeaderMatchKind::Suffix => Ok(Self::Suffix),
            HeaderMatchKind::Contains => Ok(Self::Contains),
            HeaderMatchKind::SafeRegex => Ok(Self::SafeRegex),
            HeaderMatchKind::Range | HeaderMatchKind::Present => Err(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Payload {
    String(StringMatcher),
    /// Half-open `[start, end)`, `start <= end`.
    Range { start: i64, end: i64 },
    Present(bool),
}

/// Immutable predicate over a named, optional attribute value.
///
/// Mirrors the xDS / gRPC RBAC `HeaderMatcher`. The name is carried for the
/// caller's lookup and for equality; matching only ever sees the value.
///
/// # Example
///
/// ```
/// use amatch::{HeaderMatchKind, HeaderMatcher};
///
/// // Inverted exact match: absent values match, because inversion comes last.
/// let m = HeaderMatcher::create("x", HeaderMatchKind::Exact, "a", 0, 0, false, true).unwrap();
/// assert!(m.matches(None));
/// assert!(!m.matches(Some("a")));
/// assert!(m.matches(Some("b")));
/// assert_eq!(m.to_string(), "x not exact=a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderMatcher {
    name: String,
    payload: Payload,
    invert_match: bool,
}

impl HeaderMatcher {
    /// Build a matcher from the flat xDS-style argument list.
    ///
    /// Only the arguments relevant to `kind` are read: `pattern` for the five
    /// string kinds, `range_start`/`range_end` for `Range`, `present_match`
    /// for `Present`. String kinds are always case-sensitive.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::InvalidPattern`] if a `SafeRegex` pattern does not compile
    /// - [`MatcherError::InvalidRange`] if `Range` is given `range_start > range_end`
    #[allow(clippy::too_many_arguments)] // Flat shape of the policy proto
    pub fn create(
        name: impl Into<String>,
        kind: HeaderMatchKind,
        pattern: impl Into<String>,
        range_start: i64,
        range_end: i64,
        present_match: bool,
        invert_match: bool,
    ) -> Result<Self, MatcherError> {
        let name = name.into();
        let payload = match MatchKind::try_from(kind) {
            Ok(string_kind) => Payload::String(StringMatcher::create(string_kind, pattern, true)?),
            Err(HeaderMatchKind::Range) => {
                if range_start > range_end {
                    tracing::warn!(
                        header = %name,
                        start = range_start,
                        end = range_end,
                        "rejecting range matcher: end cannot be smaller than start"
                    );
                    return Err(MatcherError::InvalidRange {
                        start: range_start,
                        end: range_end,
                    });
                }
                Payload::Range {
                    start: range_start,
                    end: range_end,
                }
            }
            Err(_) => Payload::Present(present_match),
        };

        Ok(Self::built(name, payload, invert_match))
    }

    fn built(name: String, payload: Payload, invert_match: bool) -> Self {
        let matcher = Self {
            name,
            payload,
            invert_match,
        };
        tracing::debug!(kind = %matcher.kind(), %matcher, "built header matcher");
        matcher
    }

    /// String-kind matcher (always case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if a regex pattern does not compile.
    pub fn string(
        name: impl Into<String>,
        kind: MatchKind,
        pattern: impl Into<String>,
        invert_match: bool,
    ) -> Result<Self, MatcherError> {
        Self::create(name, kind.into(), pattern, 0, 0, false, invert_match)
    }

    /// Integer range matcher over `[start, end)`.
    ///
    /// `start == end` is legal and never matches.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidRange`] if `start > end`.
    pub fn range(
        name: impl Into<String>,
        start: i64,
        end: i64,
        invert_match: bool,
    ) -> Result<Self, MatcherError> {
        Self::create(name, HeaderMatchKind::Range, "", start, end, false, invert_match)
    }

    /// Presence matcher. Matches when presence equals `present_match`.
    #[must_use]
    pub fn present(name: impl Into<String>, present_match: bool, invert_match: bool) -> Self {
        Self::built(name.into(), Payload::Present(present_match), invert_match)
    }

    /// The attribute name this matcher applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of predicate.
    #[must_use]
    pub fn kind(&self) -> HeaderMatchKind {
        match &self.payload {
            Payload::String(m) => m.kind().into(),
            Payload::Range { .. } => HeaderMatchKind::Range,
            Payload::Present(_) => HeaderMatchKind::Present,
        }
    }

    /// The embedded string matcher, for the five string kinds.
    #[must_use]
    pub fn string_matcher(&self) -> Option<&StringMatcher> {
        match &self.payload {
            Payload::String(m) => Some(m),
            _ => None,
        }
    }

    /// `(start, end)` bounds, for `Range`.
    #[must_use]
    pub fn range_bounds(&self) -> Option<(i64, i64)> {
        match self.payload {
            Payload::Range { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Expected presence, for `Present`.
    #[must_use]
    pub fn present_match(&self) -> Option<bool> {
        match self.payload {
            Payload::Present(expected) => Some(expected),
            _ => None,
        }
    }

    /// Whether the result is negated.
    #[must_use]
    pub fn invert_match(&self) -> bool {
        self.invert_match
    }

    /// Evaluate against the attribute value, `None` meaning absent.
    ///
    /// Never fails: absent values and unparseable integers are non-matches
    /// before `invert_match` is applied.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        let base = match (&self.payload, value) {
            (Payload::Present(expected), v) => v.is_some() == *expected,
            (_, None) => false,
            (Payload::Range { start, end }, Some(v)) => v
                .parse::<i64>()
                .is_ok_and(|n| *start <= n && n < *end),
            (Payload::String(m), Some(v)) => m.matches(v),
        };
        base != self.invert_match
    }
}

/// Canonical form: `<name> [not ]<payload>`.
impl fmt::Display for HeaderMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.invert_match { "not " } else { "" };
        write!(f, "{} {not}", self.name)?;
        match &self.payload {
            Payload::String(m) => write!(f, "{m}"),
            Payload::Range { start, end } => write!(f, "range=[{start}, {end})"),
            Payload::Present(expected) => write!(f, "present={expected}"),
        }
    }
}
