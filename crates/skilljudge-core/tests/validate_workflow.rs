//! End-to-end validation workflow: scenario + record + rule files on
//! disk, through the evaluator, verdict merged back into the record.

use std::fs;
use std::path::Path;

use skilljudge_core::{
    merge_verdict, DiscardSink, ExecutionRecord, RuleStore, ScenarioDescriptor, Validator,
    VerdictStatus,
};

const SCENARIO_YAML: &str = r#"
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
"#;

const RESULT_JSON: &str = r#"{
  "scenario": "python-basic",
  "language": "python",
  "skills_invoked": ["scan", "report"],
  "files_created": [
    {"path": "config.yaml", "content": "version: 2\nserver: local\n"}
  ],
  "documentation_fetches": {"total_count": 0, "pages": [], "domains": []}
}"#;

const SECURITY_RULES_JSON: &str = r#"{
  "rules": [{
    "id": "no-hardcoded-tokens",
    "patterns": [
      {"regex": "sonar\\.token=\\S+", "failure_message": "Hardcoded Sonar token found"}
    ]
  }]
}"#;

fn write_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let scenario_path = dir.join("scenario.yaml");
    let result_path = dir.join("result.json");
    let assertions_dir = dir.join("assertions");
    fs::create_dir(&assertions_dir).expect("mkdir assertions");

    fs::write(&scenario_path, SCENARIO_YAML).expect("write scenario");
    fs::write(&result_path, RESULT_JSON).expect("write result");
    fs::write(
        assertions_dir.join(RuleStore::SECURITY_FILE),
        SECURITY_RULES_JSON,
    )
    .expect("write security rules");

    (scenario_path, result_path, assertions_dir)
}

#[test]
fn test_validate_and_persist_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (scenario_path, result_path, assertions_dir) = write_fixtures(dir.path());

    let scenario = ScenarioDescriptor::load(&scenario_path).expect("load scenario");
    let record = ExecutionRecord::load(&result_path).expect("load record");
    let rules = RuleStore::load_dir(&assertions_dir).expect("load rules");

    // Scanner and version rule documents are absent: both checkpoints
    // are skipped without failures.
    assert!(rules.scanner.is_none());
    assert!(rules.versions.is_none());

    let mut sink = DiscardSink;
    let report = Validator::new(&scenario, &record, &rules, &mut sink)
        .validate_all()
        .expect("evaluate");

    // 10 (skills) + 5 (file) accuracy, 20 security, nothing else.
    assert_eq!(report.scores.accuracy, 15);
    assert_eq!(report.scores.security, 20);
    assert_eq!(report.scores.efficiency, 0);
    assert_eq!(report.scores.currency, 0);
    assert_eq!(report.scores.total, 35);
    assert_eq!(report.status, VerdictStatus::Failed);
    assert!(report.failures.is_empty());

    merge_verdict(&result_path, &report).expect("persist");
    let persisted = fs::read_to_string(&result_path).expect("read back");
    let doc: serde_json::Value = serde_json::from_str(&persisted).expect("parse");
    assert_eq!(doc["status"], "failed");
    assert_eq!(doc["scores"]["total"], 35);
    assert_eq!(doc["validation"]["status"], "FAILED");

    // Idempotent write: persisting the same verdict again changes
    // nothing.
    merge_verdict(&result_path, &report).expect("persist again");
    assert_eq!(fs::read_to_string(&result_path).expect("reread"), persisted);
}

#[test]
fn test_security_violation_drives_verdict_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (scenario_path, result_path, assertions_dir) = write_fixtures(dir.path());

    // Replace the clean result with one that leaks a token.
    fs::write(
        &result_path,
        r#"{
  "skills_invoked": ["scan", "report"],
  "files_created": [
    {"path": "config.yaml", "content": "version: 2\nsonar.token=abc123\n"}
  ]
}"#,
    )
    .expect("write result");

    let scenario = ScenarioDescriptor::load(&scenario_path).expect("load scenario");
    let record = ExecutionRecord::load(&result_path).expect("load record");
    let rules = RuleStore::load_dir(&assertions_dir).expect("load rules");

    let mut sink = DiscardSink;
    let report = Validator::new(&scenario, &record, &rules, &mut sink)
        .validate_all()
        .expect("evaluate");

    assert_eq!(report.scores.security, 0, "one violation zeroes the category");
    assert!(report
        .failures
        .contains(&"Hardcoded Sonar token found".to_string()));
    assert_eq!(report.status, VerdictStatus::Failed);
}

#[test]
fn test_missing_inputs_are_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(ScenarioDescriptor::load(&dir.path().join("missing.yaml")).is_err());
    assert!(ExecutionRecord::load(&dir.path().join("missing.json")).is_err());
}
