//! `InputMatcher` — The seam between matchers and a rule engine
//!
//! A rule engine resolves an attribute to `Option<&str>` (absent or present)
//! and asks each matcher for a boolean. It does not need to know which kind
//! of matcher it is holding.

use crate::{HeaderMatcher, StringMatcher};
use std::fmt::Debug;
use std::sync::Arc;

/// Matches against an optional attribute value.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: a compiled policy is shared
/// read-only by every request-evaluation path.
///
/// # Example
///
/// ```
/// use amatch::{InputMatcher, StringMatcher};
///
/// let matcher: Box<dyn InputMatcher> = Box::new(StringMatcher::prefix("/api/", true));
/// assert!(matcher.matches(Some("/api/users")));
/// assert!(!matcher.matches(None));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `InputMatcher`",
    label = "this type cannot match against an optional attribute value",
    note = "use StringMatcher or HeaderMatcher, or implement `matches(&self, Option<&str>) -> bool`"
)]
pub trait InputMatcher: Send + Sync + Debug {
    /// Check the attribute value, `None` meaning the attribute is absent.
    fn matches(&self, value: Option<&str>) -> bool;
}

/// Absent values never match a bare string matcher.
impl InputMatcher for StringMatcher {
    fn matches(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| StringMatcher::matches(self, v))
    }
}

impl InputMatcher for HeaderMatcher {
    fn matches(&self, value: Option<&str>) -> bool {
        HeaderMatcher::matches(self, value)
    }
}

#[diagnostic::do_not_recommend]
impl InputMatcher for Box<dyn InputMatcher> {
    fn matches(&self, value: Option<&str>) -> bool {
        (**self).matches(value)
    }
}

impl<T: InputMatcher + ?Sized> InputMatcher for Arc<T> {
    fn matches(&self, value: Option<&str>) -> bool {
        (**self).matches(value)
    }
}
