//! Rule-store documents consumed by checkpoints.
//!
//! Three declarative rule documents drive the pattern-based
//! checkpoints: scanner selection, security compliance, and version
//! currency. The engine never reads the filesystem directly during
//! evaluation; it receives a [`RuleStore`] bundle so tests can inject
//! in-memory fixtures. A missing rule document is an absent entry, not
//! an error - the dependent checkpoint is skipped with a warning.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ValidationError};

/// Rule id for the hardcoded-credential scan; the only security rule
/// the evaluator applies.
pub const NO_HARDCODED_TOKENS: &str = "no-hardcoded-tokens";

/// Compile a rule-supplied pattern, attributing errors to the pattern.
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ValidationError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

// ── scanner-selection.json ────────────────────────────────────────────────

/// Scanner-selection rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerRules {
    #[serde(default)]
    pub rules: Vec<ScannerRule>,
}

impl ScannerRules {
    /// Find the unique rule bundle for a language discriminator.
    pub fn for_language(&self, language: &str) -> Option<&ScannerRule> {
        self.rules.iter().find(|r| r.language == language)
    }
}

/// Per-language scanner expectations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerRule {
    pub language: String,

    /// Patterns whose presence marks the correct scanner.
    #[serde(default)]
    pub correct_patterns: Vec<String>,

    /// Patterns whose presence marks an incorrect scanner.
    #[serde(default)]
    pub incorrect_patterns: Vec<IncorrectPattern>,

    /// Name of the scanner the agent was expected to pick.
    #[serde(default)]
    pub expected_scanner: String,
}

/// An incorrect-scanner pattern with its human-readable reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncorrectPattern {
    pub pattern: String,

    #[serde(default)]
    pub reason: String,
}

// ── security-compliance.json ──────────────────────────────────────────────

/// Security-compliance rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityRules {
    #[serde(default)]
    pub rules: Vec<SecurityRule>,
}

impl SecurityRules {
    /// Look up a rule by id.
    pub fn by_id(&self, id: &str) -> Option<&SecurityRule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

/// A named security rule with its violation patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityRule {
    pub id: String,

    #[serde(default)]
    pub patterns: Vec<SecurityPattern>,
}

/// One violation pattern and the failure message it carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityPattern {
    pub regex: String,

    #[serde(default)]
    pub failure_message: String,
}

// ── version-currency.json ─────────────────────────────────────────────────

/// Version-currency rule document, keyed by platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRules {
    #[serde(default)]
    pub platforms: HashMap<String, PlatformVersions>,
}

/// Version checks for one platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformVersions {
    #[serde(default)]
    pub actions: Vec<ActionRule>,
}

/// Version rule for one action/component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRule {
    pub name: String,

    /// Regex whose first capture group (or whole match) yields the
    /// version string used in a file.
    pub pattern: String,

    /// The version considered current; a leading `v` is stripped
    /// before comparison.
    #[serde(default)]
    pub current_version: String,

    /// Versions flagged as deprecated (same prefix-stripped comparison).
    #[serde(default)]
    pub deprecated_versions: Vec<String>,
}

// ── the injected bundle ───────────────────────────────────────────────────

/// The rule bundle handed to the evaluator.
///
/// Each slot is `None` when the corresponding rule document was not
/// found, which the dependent checkpoint treats as "skip with warning".
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    pub scanner: Option<ScannerRules>,
    pub security: Option<SecurityRules>,
    pub versions: Option<VersionRules>,
}

impl RuleStore {
    pub const SCANNER_FILE: &'static str = "scanner-selection.json";
    pub const SECURITY_FILE: &'static str = "security-compliance.json";
    pub const VERSIONS_FILE: &'static str = "version-currency.json";

    /// Load the rule documents found in an assertions directory.
    ///
    /// Missing files load as absent documents; malformed files are
    /// parse errors and abort the run.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            scanner: load_optional(&dir.join(Self::SCANNER_FILE))?,
            security: load_optional(&dir.join(Self::SECURITY_FILE))?,
            versions: load_optional(&dir.join(Self::VERSIONS_FILE))?,
        })
    }
}

fn load_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "rule document not found, skipping");
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scanner_rules_for_language() {
        let rules: ScannerRules = serde_json::from_value(json!({
            "rules": [
                {"language": "python", "correct_patterns": ["sonar-scanner"], "expected_scanner": "sonar-scanner-cli"},
                {"language": "java", "correct_patterns": ["sonar:sonar"], "expected_scanner": "maven"}
            ]
        }))
        .expect("parse");

        assert_eq!(
            rules.for_language("java").expect("java rule").expected_scanner,
            "maven"
        );
        assert!(rules.for_language("go").is_none());
    }

    #[test]
    fn test_security_rules_by_id() {
        let rules: SecurityRules = serde_json::from_value(json!({
            "rules": [{
                "id": "no-hardcoded-tokens",
                "patterns": [{"regex": "sonar\\.token=\\S+", "failure_message": "Hardcoded token"}]
            }]
        }))
        .expect("parse");

        assert!(rules.by_id(NO_HARDCODED_TOKENS).is_some());
        assert!(rules.by_id("other-rule").is_none());
    }

    #[test]
    fn test_load_dir_missing_files_are_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(RuleStore::SECURITY_FILE),
            r#"{"rules": []}"#,
        )
        .expect("write");

        let store = RuleStore::load_dir(dir.path()).expect("load");
        assert!(store.scanner.is_none());
        assert!(store.security.is_some());
        assert!(store.versions.is_none());
    }

    #[test]
    fn test_load_dir_malformed_document_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(RuleStore::SCANNER_FILE), "not json").expect("write");

        assert!(RuleStore::load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_compile_invalid_pattern() {
        let err = compile("[unclosed").expect_err("should fail");
        assert!(matches!(err, ValidationError::Pattern { .. }));
    }
}
