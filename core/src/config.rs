//! Config types for declarative matcher construction.
//!
//! These types describe a matcher the way a policy document does and are
//! serde-deserializable from JSON, or from YAML through [`from_yaml`] (feature
//! `yaml`). Runtime matchers are never
//! deserialized directly; configs are built into them, going through the same
//! validation as the constructors.
//!
//! | Config type | Runtime type | Built via |
//! |-------------|-------------|-----------|
//! | [`StringMatcherConfig`] | [`StringMatcher`] | `build()` / `TryFrom` |
//! | [`HeaderMatcherConfig`] | [`HeaderMatcher`] | `build()` / `TryFrom` |
//!
//! ```yaml
//! name: x-user-age
//! value_match:
//!   range: { start: 18, end: 65 }
//! invert_match: false
//! ```

use crate::{HeaderMatchKind, HeaderMatcher, MatchKind, MatcherError, StringMatcher};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a YAML document did not produce a config.
#[cfg(feature = "yaml")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Not valid YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Valid YAML, but not the expected config shape.
    #[error("invalid config: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Deserialize a config type from YAML.
///
/// Match specs use the single-key map form (`{ range: { start: 1, end: 2 } }`),
/// which `serde_yaml` only accepts as `!tag` syntax when deserializing an enum
/// directly. The document is read into a `serde_json::Value` and the config is
/// deserialized from that.
///
/// # Errors
///
/// [`ConfigError::Yaml`] on malformed YAML, [`ConfigError::Shape`] when the
/// document does not describe a `T`.
#[cfg(feature = "yaml")]
pub fn from_yaml<T: serde::de::DeserializeOwned>(yaml: &str) -> Result<T, ConfigError> {
    let value: serde_json::Value = serde_yaml::from_str(yaml)?;
    Ok(serde_json::from_value(value)?)
}

/// A string match specification: which strategy, and the pattern.
///
/// Serialized externally tagged: `{ "exact": "/api" }`, `{ "safe_regex": "v\\d+" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMatchSpec {
    /// Whole-string equality.
    Exact(String),
    /// Value starts with the pattern.
    Prefix(String),
    /// Value ends with the pattern.
    Suffix(String),
    /// Pattern occurs anywhere in the value.
    Contains(String),
    /// Anchored regular expression (Rust `regex` syntax).
    SafeRegex(String),
}

impl StringMatchSpec {
    /// The kind this spec compiles to.
    #[must_use]
    pub fn kind(&self) -> MatchKind {
        match self {
            Self::Exact(_) => MatchKind::Exact,
            Self::Prefix(_) => MatchKind::Prefix,
            Self::Suffix(_) => MatchKind::Suffix,
            Self::Contains(_) => MatchKind::Contains,
            Self::SafeRegex(_) => MatchKind::SafeRegex,
        }
    }

    /// The pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Exact(p)
            | Self::Prefix(p)
            | Self::Suffix(p)
            | Self::Contains(p)
            | Self::SafeRegex(p) => p,
        }
    }

    /// Compile into a [`StringMatcher`].
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if the regex is invalid.
    pub fn to_string_matcher(&self, case_sensitive: bool) -> Result<StringMatcher, MatcherError> {
        StringMatcher::create(self.kind(), self.pattern(), case_sensitive)
    }

    fn from_matcher(matcher: &StringMatcher) -> Self {
        let pattern = matcher.pattern().to_owned();
        match matcher.kind() {
            MatchKind::Exact => Self::Exact(pattern),
            MatchKind::Prefix => Self::Prefix(pattern),
            MatchKind::Suffix => Self::Suffix(pattern),
            MatchKind::Contains => Self::Contains(pattern),
            MatchKind::SafeRegex => Self::SafeRegex(pattern),
        }
    }
}

impl fmt::Display for StringMatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.kind(), self.pattern())
    }
}

/// Configuration for a [`StringMatcher`].
///
/// ```json
/// { "value_match": { "prefix": "/api" }, "ignore_case": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringMatcherConfig {
    /// Strategy and pattern.
    pub value_match: StringMatchSpec,
    /// ASCII case-insensitive matching (default: false).
    #[serde(default)]
    pub ignore_case: bool,
}

impl StringMatcherConfig {
    /// Build the runtime matcher.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if the regex is invalid.
    pub fn build(&self) -> Result<StringMatcher, MatcherError> {
        self.value_match.to_string_matcher(!self.ignore_case)
    }
}

impl TryFrom<StringMatcherConfig> for StringMatcher {
    type Error = MatcherError;

    fn try_from(config: StringMatcherConfig) -> Result<Self, Self::Error> {
        config.build()
    }
}

impl From<&StringMatcher> for StringMatcherConfig {
    fn from(matcher: &StringMatcher) -> Self {
        Self {
            value_match: StringMatchSpec::from_matcher(matcher),
            ignore_case: !matcher.case_sensitive(),
        }
    }
}

/// Bounds of a range match, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// Inclusive lower bound.
    pub start: i64,
    /// Exclusive upper bound.
    pub end: i64,
}

/// What a [`HeaderMatcher`] checks.
///
/// The five string kinds share [`StringMatchSpec`]'s shape; `range` and
/// `present` are header-only:
///
/// ```yaml
/// { exact: "application/json" }
/// { range: { start: 0, end: 100 } }
/// { present: true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMatchSpec {
    /// Whole-string equality.
    Exact(String),
    /// Value starts with the pattern.
    Prefix(String),
    /// Value ends with the pattern.
    Suffix(String),
    /// Pattern occurs anywhere in the value.
    Contains(String),
    /// Anchored regular expression.
    SafeRegex(String),
    /// Integer value in `[start, end)`.
    Range(RangeSpec),
    /// Attribute presence.
    Present(bool),
}

impl HeaderMatchSpec {
    /// The kind this spec compiles to.
    #[must_use]
    pub fn kind(&self) -> HeaderMatchKind {
        match self {
            Self::Exact(_) => HeaderMatchKind::Exact,
            Self::Prefix(_) => HeaderMatchKind::Prefix,
            Self::Suffix(_) => HeaderMatchKind::Suffix,
            Self::Contains(_) => HeaderMatchKind::Contains,
            Self::SafeRegex(_) => HeaderMatchKind::SafeRegex,
            Self::Range(_) => HeaderMatchKind::Range,
            Self::Present(_) => HeaderMatchKind::Present,
        }
    }
}

impl From<StringMatchSpec> for HeaderMatchSpec {
    fn from(spec: StringMatchSpec) -> Self {
        match spec {
            StringMatchSpec::Exact(p) => Self::Exact(p),
            StringMatchSpec::Prefix(p) => Self::Prefix(p),
            StringMatchSpec::Suffix(p) => Self::Suffix(p),
            StringMatchSpec::Contains(p) => Self::Contains(p),
            StringMatchSpec::SafeRegex(p) => Self::SafeRegex(p),
        }
    }
}

/// Configuration for a [`HeaderMatcher`].
///
/// ```json
/// { "name": "x-env", "value_match": { "exact": "prod" }, "invert_match": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatcherConfig {
    /// Attribute name the matcher applies to.
    pub name: String,
    /// What to check.
    pub value_match: HeaderMatchSpec,
    /// Negate the result, absent values included (default: false).
    #[serde(default)]
    pub invert_match: bool,
}

impl HeaderMatcherConfig {
    /// Parse a single matcher config from YAML.
    ///
    /// # Errors
    ///
    /// See [`from_yaml`].
    #[cfg(feature = "yaml")]
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        from_yaml(yaml)
    }

    /// Build the runtime matcher.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::InvalidPattern`] if a regex is invalid
    /// - [`MatcherError::InvalidRange`] if `start > end`
    pub fn build(&self) -> Result<HeaderMatcher, MatcherError> {
        let (pattern, start, end, present) = match &self.value_match {
            HeaderMatchSpec::Exact(p)
            | HeaderMatchSpec::Prefix(p)
            | HeaderMatchSpec::Suffix(p)
            | HeaderMatchSpec::Contains(p)
            | HeaderMatchSpec::SafeRegex(p) => (p.as_str(), 0, 0, false),
            HeaderMatchSpec::Range(r) => ("", r.start, r.end, false),
            HeaderMatchSpec::Present(p) => ("", 0, 0, *p),
        };
        HeaderMatcher::create(
            self.name.as_str(),
            self.value_match.kind(),
            pattern,
            start,
            end,
            present,
            self.invert_match,
        )
    }
}

impl TryFrom<HeaderMatcherConfig> for HeaderMatcher {
    type Error = MatcherError;

    fn try_from(config: HeaderMatcherConfig) -> Result<Self, Self::Error> {
        config.build()
    }
}

impl From<&HeaderMatcher> for HeaderMatcherConfig {
    fn from(matcher: &HeaderMatcher) -> Self {
        let value_match = if let Some(m) = matcher.string_matcher() {
            StringMatchSpec::from_matcher(m).into()
        } else if let Some((start, end)) = matcher.range_bounds() {
            HeaderMatchSpec::Range(RangeSpec { start, end })
        } else {
            HeaderMatchSpec::Present(matcher.present_match().unwrap_or_default())
        };
        Self {
            name: matcher.name().to_owned(),
            value_match,
            invert_match: matcher.invert_match(),
        }
    }
}

impl HeaderMatcher {
    /// The config this matcher can be rebuilt from.
    #[must_use]
    pub fn to_config(&self) -> HeaderMatcherConfig {
        HeaderMatcherConfig::from(self)
    }
}
