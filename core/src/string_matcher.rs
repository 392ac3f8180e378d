//! `StringMatcher` — Immutable predicate over a single string value
//!
//! Five strategies: exact, prefix, suffix, contains, and regex. The literal
//! strategies optionally fold **ASCII only**; non-ASCII bytes are compared
//! verbatim even when `case_sensitive` is false. Regex case sensitivity is
//! fixed when the expression is compiled.
//!
//! Regex matching is always anchored at both ends: `a+b` matches `"aab"` but
//! not `"xaabx"`.

use crate::MatcherError;
use regex_automata::meta;
use regex_syntax::hir::{Hir, Look};
use regex_syntax::ParserBuilder;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Which string matching strategy a [`StringMatcher`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
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
}

impl MatchKind {
    /// Canonical lowercase name, as used in [`StringMatcher`]'s display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Contains => "contains",
            Self::SafeRegex => "safe_regex",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled regex together with the source it was built from.
///
/// The source is parsed once and anchored at the syntax-tree level, so flags
/// in the source (verbose mode comments included) cannot reach the anchors.
/// Equality and hashing look only at `source`.
struct CompiledRegex {
    source: String,
    hir: Hir,
    regex: meta::Regex,
}

#[derive(Debug, thiserror::Error)]
enum RegexError {
    #[error(transparent)]
    Parse(#[from] regex_syntax::Error),
    #[error(transparent)]
    Build(#[from] meta::BuildError),
}

impl CompiledRegex {
    fn compile(source: String, case_sensitive: bool) -> Result<Self, RegexError> {
        let parsed = ParserBuilder::new()
            .case_insensitive(!case_sensitive)
            .build()
            .parse(&source)?;
        let hir = Hir::concat(vec![Hir::look(Look::Start), parsed, Hir::look(Look::End)]);
        let regex = meta::Regex::builder().build_from_hir(&hir)?;
        Ok(Self { source, hir, regex })
    }

    /// Build a fresh engine from the already-parsed tree.
    fn recompile(&self) -> Self {
        tracing::debug!(pattern = %self.source, "recompiling regex for cloned matcher");
        let regex = meta::Regex::builder()
            .build_from_hir(&self.hir)
            .unwrap_or_else(|e| unreachable!("regex {:?} built once already: {e}", self.source));
        Self {
            source: self.source.clone(),
            hir: self.hir.clone(),
            regex,
        }
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledRegex {}

impl Hash for CompiledRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.source).finish()
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum Strategy {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    SafeRegex(CompiledRegex),
}

/// Immutable string predicate, the xDS `StringMatcher` shape.
///
/// Equality is structural over kind, case sensitivity and pattern text.
/// Cloning a regex matcher recompiles it from source, so clones never share
/// a compiled engine.
///
/// # Example
///
/// ```
/// use amatch::{MatchKind, StringMatcher};
///
/// let matcher = StringMatcher::create(MatchKind::Exact, "foo", false).unwrap();
/// assert!(matcher.matches("FOO"));
/// assert_eq!(matcher.to_string(), "exact=foo, case_sensitive=false");
///
/// let matcher = StringMatcher::safe_regex("a+b", true).unwrap();
/// assert!(matcher.matches("aab"));
/// assert!(!matcher.matches("xaabx"));
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct StringMatcher {
    strategy: Strategy,
    case_sensitive: bool,
}

impl StringMatcher {
    /// Build a matcher of the given kind.
    ///
    /// Literal kinds accept any pattern, including the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if `kind` is
    /// [`MatchKind::SafeRegex`] and `pattern` does not compile.
    pub fn create(
        kind: MatchKind,
        pattern: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, MatcherError> {
        let pattern = pattern.into();
        let strategy = match kind {
            MatchKind::Exact => Strategy::Exact(pattern),
            MatchKind::Prefix => Strategy::Prefix(pattern),
            MatchKind::Suffix => Strategy::Suffix(pattern),
            MatchKind::Contains => Strategy::Contains(pattern),
            MatchKind::SafeRegex => match CompiledRegex::compile(pattern.clone(), case_sensitive) {
                Ok(compiled) => Strategy::SafeRegex(compiled),
                Err(e) => {
                    tracing::warn!(%pattern, error = %e, "rejecting invalid regex matcher");
                    return Err(MatcherError::InvalidPattern {
                        pattern,
                        message: e.to_string(),
                    });
                }
            },
        };

        let matcher = Self {
            strategy,
            case_sensitive,
        };
        tracing::debug!(%matcher, "built string matcher");
        Ok(matcher)
    }

    /// Exact equality matcher.
    #[must_use]
    pub fn exact(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self::literal(Strategy::Exact(pattern.into()), case_sensitive)
    }

    /// Prefix matcher.
    #[must_use]
    pub fn prefix(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self::literal(Strategy::Prefix(pattern.into()), case_sensitive)
    }

    /// Suffix matcher.
    #[must_use]
    pub fn suffix(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self::literal(Strategy::Suffix(pattern.into()), case_sensitive)
    }

    /// Substring matcher.
    #[must_use]
    pub fn contains(pattern: impl Into<String>, case_sensitive: bool) -> Self {
        Self::literal(Strategy::Contains(pattern.into()), case_sensitive)
    }

    /// Anchored regex matcher.
    ///
    /// Uses the `regex` crate's engine, which guarantees linear-time matching.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if `pattern` does not compile.
    pub fn safe_regex(
        pattern: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, MatcherError> {
        Self::create(MatchKind::SafeRegex, pattern, case_sensitive)
    }

    fn literal(strategy: Strategy, case_sensitive: bool) -> Self {
        Self {
            strategy,
            case_sensitive,
        }
    }

    /// The matching strategy.
    #[must_use]
    pub fn kind(&self) -> MatchKind {
        match self.strategy {
            Strategy::Exact(_) => MatchKind::Exact,
            Strategy::Prefix(_) => MatchKind::Prefix,
            Strategy::Suffix(_) => MatchKind::Suffix,
            Strategy::Contains(_) => MatchKind::Contains,
            Strategy::SafeRegex(_) => MatchKind::SafeRegex,
        }
    }

    /// The literal pattern, or the regex source as supplied (unanchored).
    #[must_use]
    pub fn pattern(&self) -> &str {
        match &self.strategy {
            Strategy::Exact(p)
            | Strategy::Prefix(p)
            | Strategy::Suffix(p)
            | Strategy::Contains(p) => p,
            Strategy::SafeRegex(re) => &re.source,
        }
    }

    /// Whether matching is case-sensitive.
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Check `value` against this matcher. Never fails.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let cs = self.case_sensitive;
        match &self.strategy {
            Strategy::Exact(p) => {
                if cs {
                    value == p.as_str()
                } else {
                    value.eq_ignore_ascii_case(p)
                }
            }
            Strategy::Prefix(p) => {
                if cs {
                    value.starts_with(p.as_str())
                } else {
                    starts_with_ignore_ascii_case(value, p)
                }
            }
            Strategy::Suffix(p) => {
                if cs {
                    value.ends_with(p.as_str())
                } else {
                    ends_with_ignore_ascii_case(value, p)
                }
            }
            Strategy::Contains(p) => {
                if cs {
                    value.contains(p.as_str())
                } else {
                    // Both sides are folded independently.
                    value
                        .to_ascii_lowercase()
                        .contains(p.to_ascii_lowercase().as_str())
                }
            }
            Strategy::SafeRegex(re) => re.regex.is_match(value),
        }
    }
}

fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    value
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

fn ends_with_ignore_ascii_case(value: &str, suffix: &str) -> bool {
    value
        .len()
        .checked_sub(suffix.len())
        .and_then(|start| value.as_bytes().get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix.as_bytes()))
}

impl Clone for StringMatcher {
    fn clone(&self) -> Self {
        let strategy = match &self.strategy {
            Strategy::Exact(p) => Strategy::Exact(p.clone()),
            Strategy::Prefix(p) => Strategy::Prefix(p.clone()),
            Strategy::Suffix(p) => Strategy::Suffix(p.clone()),
            Strategy::Contains(p) => Strategy::Contains(p.clone()),
            Strategy::SafeRegex(re) => Strategy::SafeRegex(re.recompile()),
        };
        Self {
            strategy,
            case_sensitive: self.case_sensitive,
        }
    }
}

/// Canonical form: `<kind>=<pattern>`, plus `, case_sensitive=false` when folding.
///
/// Stable for logging and deduplication; not meant to be parsed back.
impl fmt::Display for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.pattern())?;
        if !self.case_sensitive {
            f.write_str(", case_sensitive=false")?;
        }
        Ok(())
    }
}
