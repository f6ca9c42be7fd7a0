//! Scenario descriptors: the declarative expectations for one test case.
//!
//! A scenario is authored as a YAML document and loaded once per
//! evaluation. It names the language/platform discriminators used for
//! rule lookup and the expected skills, files, and documentation
//! fetches of a correct run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, ValidationError};

/// A parsed scenario document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    /// Scenario name (for reporting).
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Language discriminator for scanner rule lookup.
    #[serde(default)]
    pub language: Option<String>,

    /// Platform discriminator for version rule lookup.
    #[serde(default)]
    pub platform: Option<String>,

    /// Expected agent behavior.
    #[serde(default)]
    pub expected: Expectations,
}

impl ScenarioDescriptor {
    /// Load a scenario from a YAML file.
    ///
    /// A missing file is a fatal startup error, distinct from the
    /// non-fatal rule-document skips.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ValidationError::InputNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// The `expected` block of a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectations {
    /// Skills the agent must invoke (compared as a set).
    #[serde(default)]
    pub skills_invoked: Vec<String>,

    /// Files the agent must create, with content assertions.
    #[serde(default)]
    pub files_created: Vec<ExpectedFile>,

    /// Documentation fetch expectations; absent means the doc-fetch
    /// checkpoint is a no-op.
    #[serde(default)]
    pub documentation_fetches: Option<DocFetchExpectation>,
}

/// One expected file with content assertions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFile {
    /// Exact path the created file must have.
    pub path: String,

    /// Substrings that must appear in the file content.
    #[serde(default)]
    pub must_contain: Vec<String>,

    /// Substrings that must not appear in the file content.
    #[serde(default)]
    pub must_not_contain: Vec<String>,
}

/// Expected documentation-fetch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocFetchExpectation {
    /// Minimum acceptable fetch count (inclusive).
    #[serde(default)]
    pub min_fetches: u32,

    /// Maximum acceptable fetch count (inclusive); above it is a soft
    /// warning, not a failure.
    #[serde(default = "default_max_fetches")]
    pub max_fetches: u32,

    /// Domains that should appear among the fetched domains
    /// (substring match, +2 efficiency each).
    #[serde(default)]
    pub expected_domains: Vec<String>,

    /// URL patterns that should have been fetched; diagnostic only,
    /// never scored.
    #[serde(default)]
    pub expected_pages: Vec<ExpectedPage>,
}

impl DocFetchExpectation {
    /// True when no field constrains anything (an empty
    /// `documentation_fetches:` block). Such an expectation is treated
    /// the same as an absent one: the checkpoint is skipped rather than
    /// trivially awarded.
    pub fn is_unconstrained(&self) -> bool {
        self.min_fetches == 0
            && self.max_fetches == default_max_fetches()
            && self.expected_domains.is_empty()
            && self.expected_pages.is_empty()
    }
}

impl Default for DocFetchExpectation {
    fn default() -> Self {
        Self {
            min_fetches: 0,
            max_fetches: default_max_fetches(),
            expected_domains: Vec::new(),
            expected_pages: Vec::new(),
        }
    }
}

fn default_max_fetches() -> u32 {
    100
}

/// One expected documentation page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedPage {
    /// Regex matched against fetched URLs.
    pub pattern: String,

    /// Human-readable description used in diagnostics.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_minimal_yaml() {
        let yaml = "language: python\nplatform: github-actions\n";
        let scenario: ScenarioDescriptor = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(scenario.language.as_deref(), Some("python"));
        assert_eq!(scenario.platform.as_deref(), Some("github-actions"));
        assert!(scenario.expected.skills_invoked.is_empty());
        assert!(scenario.expected.documentation_fetches.is_none());
    }

    #[test]
    fn test_scenario_full_yaml() {
        let yaml = r#"
name: python-basic
language: python
platform: github-actions
expected:
  skills_invoked:
    - scan
    - report
  files_created:
    - path: config.yaml
      must_contain:
        - "version: 2"
      must_not_contain:
        - password
  documentation_fetches:
    min_fetches: 2
    max_fetches: 10
    expected_domains:
      - docs.sonarsource.com
    expected_pages:
      - pattern: "docs\\.sonarsource\\.com/.*python"
        description: Python scanner docs
"#;
        let scenario: ScenarioDescriptor = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(scenario.expected.skills_invoked, vec!["scan", "report"]);
        assert_eq!(scenario.expected.files_created.len(), 1);
        assert_eq!(scenario.expected.files_created[0].path, "config.yaml");

        let docs = scenario
            .expected
            .documentation_fetches
            .expect("doc fetch expectation");
        assert_eq!(docs.min_fetches, 2);
        assert_eq!(docs.max_fetches, 10);
        assert_eq!(docs.expected_pages.len(), 1);
    }

    #[test]
    fn test_max_fetches_defaults_to_100() {
        let yaml = "expected:\n  documentation_fetches:\n    min_fetches: 1\n";
        let scenario: ScenarioDescriptor = serde_yaml::from_str(yaml).expect("parse");
        let docs = scenario.expected.documentation_fetches.expect("expectation");
        assert_eq!(docs.min_fetches, 1);
        assert_eq!(docs.max_fetches, 100);
    }

    #[test]
    fn test_empty_doc_fetch_block_is_unconstrained() {
        let yaml = "expected:\n  documentation_fetches: {}\n";
        let scenario: ScenarioDescriptor = serde_yaml::from_str(yaml).expect("parse");
        let docs = scenario.expected.documentation_fetches.expect("expectation");
        assert!(docs.is_unconstrained());

        let yaml = "expected:\n  documentation_fetches:\n    min_fetches: 1\n";
        let scenario: ScenarioDescriptor = serde_yaml::from_str(yaml).expect("parse");
        let docs = scenario.expected.documentation_fetches.expect("expectation");
        assert!(!docs.is_unconstrained());
    }

    #[test]
    fn test_load_missing_file_is_input_not_found() {
        let err = ScenarioDescriptor::load(Path::new("/nonexistent/scenario.yaml"))
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::InputNotFound(_)));
    }
}
