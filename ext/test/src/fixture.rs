//! Conformance test fixture runner
//!
//! Loads YAML fixtures, builds the described [`HeaderMatcher`] through the
//! config path, and checks each case against a [`TestContext`].
//!
//! ```yaml
//! name: adult age range
//! description: half-open integer range
//! matcher:
//!   name: x-user-age
//!   value_match: { range: { start: 18, end: 65 } }
//! cases:
//!   - { name: inside, context: { x-user-age: "30" }, expect: true }
//!   - { name: absent, context: {}, expect: false }
//! ```

use crate::TestContext;
use amatch::{HeaderMatcher, HeaderMatcherConfig, MatcherError};
use serde::Deserialize;
use std::collections::HashMap;

/// A complete test fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw matcher config; deserialized as [`HeaderMatcherConfig`] when run,
    /// so that malformed configs can be fixtures too.
    pub matcher: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// When set, building the matcher must fail with this error.
    #[serde(default)]
    pub expect_error: Option<ExpectedError>,
}

/// Test case: attributes in, boolean out.
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    pub expect: bool,
}

/// Which construction failure an error fixture expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedError {
    /// The config does not deserialize.
    InvalidConfig,
    /// [`MatcherError::InvalidPattern`].
    InvalidPattern,
    /// [`MatcherError::InvalidRange`].
    InvalidRange,
}

/// Why a fixture's matcher could not be built.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("config does not deserialize: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

impl LoadError {
    fn kind(&self) -> ExpectedError {
        match self {
            Self::Config(_) => ExpectedError::InvalidConfig,
            Self::Matcher(MatcherError::InvalidPattern { .. }) => ExpectedError::InvalidPattern,
            Self::Matcher(MatcherError::InvalidRange { .. }) => ExpectedError::InvalidRange,
        }
    }
}

impl TestCase {
    /// Build a `TestContext` from this case's attribute map.
    pub fn build_context(&self) -> TestContext {
        self.context
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    pub actual: bool,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Deserialize and build the matcher.
    pub fn load(&self) -> Result<HeaderMatcher, LoadError> {
        let config: HeaderMatcherConfig = serde_json::from_value(self.matcher.clone())?;
        Ok(config.build()?)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Result<Vec<CaseResult>, LoadError> {
        let matcher = self.load()?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let actual = case.build_context().evaluate(&matcher);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect,
                    actual,
                }
            })
            .collect())
    }

    /// Run the fixture and panic on the first failure
    pub fn run_and_assert(&self) {
        if let Some(expected) = self.expect_error {
            match self.load() {
                Ok(m) => panic!(
                    "Fixture '{}' expected {expected:?}, but built {m}",
                    self.name
                ),
                Err(e) => assert_eq!(
                    e.kind(),
                    expected,
                    "Fixture '{}' failed with the wrong error: {e}",
                    self.name
                ),
            }
            return;
        }

        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to load: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: inverted exact
matcher:
  name: x-env
  value_match: { exact: prod }
  invert_match: true
cases:
  - { name: match, context: { x-env: prod }, expect: false }
  - { name: other, context: { x-env: dev }, expect: true }
  - { name: absent, expect: true }
---
name: backwards range
matcher:
  name: num
  value_match: { range: { start: 2, end: 1 } }
expect_error: invalid_range
"#;

    #[test]
    fn parses_multi_document_yaml() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].cases.len(), 3);
        assert_eq!(fixtures[1].expect_error, Some(ExpectedError::InvalidRange));
    }

    #[test]
    fn runs_cases() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        let results = fixtures[0].run().unwrap();
        assert!(results.iter().all(|r| r.passed));
        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn reports_failing_case() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong expectation
matcher: { name: x, value_match: { present: true } }
cases:
  - { name: absent, expect: true }
"#,
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert!(!results[0].actual);
    }

    #[test]
    fn malformed_config_is_a_load_error() {
        let fixture = Fixture::from_yaml(
            r#"
name: unknown kind
matcher: { name: x, value_match: { glob: "*" } }
"#,
        )
        .unwrap();
        assert_eq!(
            fixture.load().unwrap_err().kind(),
            ExpectedError::InvalidConfig
        );
    }
}
