//! amatch - attribute matchers for authorization policies
//!
//! The evaluation primitive underneath a policy rule engine: given the value of
//! a named request attribute (usually a header) and a matcher compiled from
//! policy, decide whether the value satisfies the matcher.
//!
//! # Architecture
//!
//! - [`StringMatcher`] — Immutable predicate over a single string
//!   (exact, prefix, suffix, contains, regex) with optional ASCII case folding
//! - [`HeaderMatcher`] — Named predicate over an *optional* value. Wraps a
//!   case-sensitive `StringMatcher` and adds half-open integer ranges,
//!   presence checks, and a global invert flag
//! - [`InputMatcher`] — The seam a rule engine consumes: `Option<&str> -> bool`
//!
//! # Key Invariants
//!
//! 1. **Construction is the only fallible step**: `matches` is total. Bad
//!    numeric input and absent values are non-matches, never errors.
//!
//! 2. **Absence before inversion**: for every kind except `Present`, an absent
//!    value has a base result of `false`. `invert_match` flips it afterwards,
//!    so an inverted matcher *does* match an absent attribute.
//!
//! 3. **Structural equality**: regex matchers compare by source text, and
//!    `Display` output is identical for equal matchers.
//!
//! # Example
//!
//! ```
//! use amatch::prelude::*;
//!
//! let matcher = HeaderMatcher::range("x-user-age", 18, 65, false).unwrap();
//!
//! assert!(matcher.matches(Some("30")));
//! assert!(!matcher.matches(Some("65"))); // end is exclusive
//! assert!(!matcher.matches(Some("thirty")));
//! assert!(!matcher.matches(None));
//! assert_eq!(matcher.to_string(), "x-user-age range=[18, 65)");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod header_matcher;
mod input_matcher;
mod string_matcher;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use header_matcher::{HeaderMatchKind, HeaderMatcher};
pub use input_matcher::InputMatcher;
pub use string_matcher::{MatchKind, StringMatcher};

#[cfg(feature = "serde")]
pub use config::{
    HeaderMatchSpec, HeaderMatcherConfig, RangeSpec, StringMatchSpec, StringMatcherConfig,
};

#[cfg(feature = "yaml")]
pub use config::{from_yaml, ConfigError};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use amatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        HeaderMatchKind, HeaderMatcher, InputMatcher, MatchKind, MatcherError, StringMatcher,
    };

    #[cfg(feature = "serde")]
    pub use crate::{
        HeaderMatchSpec, HeaderMatcherConfig, RangeSpec, StringMatchSpec, StringMatcherConfig,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from matcher construction.
///
/// These are configuration errors: they surface when a policy is compiled,
/// never while matching. Fix the policy and rebuild the matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// The supplied regex does not compile.
    #[error("invalid regex pattern \"{pattern}\" specified in matcher: {message}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying regex error message.
        message: String,
    },
    /// A range matcher was given `start > end`.
    #[error("invalid range specifier [{start}, {end}): end cannot be smaller than start")]
    InvalidRange {
        /// Inclusive lower bound as supplied.
        start: i64,
        /// Exclusive upper bound as supplied.
        end: i64,
    },
}
