//! Execution records: the recorded actual behavior of one agent run.
//!
//! Records are JSON documents produced by the test harness. After an
//! evaluation, the verdict is merged back into the record on disk
//! (`validation`, `scores`, and `status` fields) with a single
//! read-modify-write so repeated evaluations are idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::checkpoint::VerdictReport;
use crate::error::{Result, ValidationError};

/// A parsed execution record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Scenario name this record belongs to (for reporting).
    #[serde(default)]
    pub scenario: Option<String>,

    /// Language of the scenario (for summary grouping).
    #[serde(default)]
    pub language: Option<String>,

    /// Skills the agent actually invoked.
    #[serde(default)]
    pub skills_invoked: Vec<String>,

    /// Files the agent created, in creation order.
    #[serde(default)]
    pub files_created: Vec<CreatedFile>,

    /// Recorded documentation fetches.
    #[serde(default)]
    pub documentation_fetches: DocFetches,
}

impl ExecutionRecord {
    /// Load an execution record from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ValidationError::InputNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// One created file with its content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedFile {
    pub path: String,

    #[serde(default)]
    pub content: String,
}

/// Summary of documentation fetches performed during the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocFetches {
    /// Total fetch count (may exceed `pages.len()` on repeat fetches).
    #[serde(default)]
    pub total_count: u32,

    /// Individual fetched pages in fetch order.
    #[serde(default)]
    pub pages: Vec<FetchedPage>,

    /// Hostnames fetched from (may contain duplicates).
    #[serde(default)]
    pub domains: Vec<String>,
}

/// One fetched documentation page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Merge a verdict back into the record file at `path`.
///
/// Reads the document fresh, inserts `validation` (the full report),
/// `scores` (category map including total), and `status` (lowercased
/// `passed`/`failed`), then rewrites the file with two-space-indented
/// JSON. Writing the same verdict twice yields byte-identical output.
pub fn merge_verdict(path: &Path, report: &VerdictReport) -> Result<()> {
    if !path.exists() {
        return Err(ValidationError::InputNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let mut doc: Value = serde_json::from_str(&text)?;
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| ValidationError::MalformedRecord("record root must be an object".into()))?;

    obj.insert("validation".to_string(), serde_json::to_value(report)?);
    obj.insert("scores".to_string(), serde_json::to_value(report.scores)?);
    obj.insert(
        "status".to_string(),
        Value::String(report.status.record_str().to_string()),
    );

    fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{MaxScores, ScoreCard, VerdictStatus};

    fn sample_report() -> VerdictReport {
        let mut scores = ScoreCard::default();
        scores.accuracy = 15;
        scores.security = 20;
        scores.finalize();
        VerdictReport {
            status: VerdictStatus::from_total(scores.total),
            scores,
            max_scores: MaxScores::default(),
            checkpoints: vec![],
            failures: vec![],
        }
    }

    #[test]
    fn test_record_parses_with_missing_sections() {
        let record: ExecutionRecord = serde_json::from_str(r#"{"skills_invoked": ["scan"]}"#)
            .expect("parse");
        assert_eq!(record.skills_invoked, vec!["scan"]);
        assert!(record.files_created.is_empty());
        assert_eq!(record.documentation_fetches.total_count, 0);
    }

    #[test]
    fn test_merge_verdict_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("result.json");
        fs::write(&path, r#"{"scenario": "basic", "skills_invoked": []}"#).expect("write");

        let report = sample_report();
        merge_verdict(&path, &report).expect("first merge");
        let first = fs::read_to_string(&path).expect("read");
        merge_verdict(&path, &report).expect("second merge");
        let second = fs::read_to_string(&path).expect("read");

        assert_eq!(first, second, "repeated merge must be byte-identical");
        let doc: Value = serde_json::from_str(&second).expect("parse");
        assert_eq!(doc["status"], "failed");
        assert_eq!(doc["scores"]["total"], 35);
        assert_eq!(doc["scenario"], "basic", "existing fields are preserved");
    }

    #[test]
    fn test_merge_verdict_rejects_non_object_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("result.json");
        fs::write(&path, "[1, 2, 3]").expect("write");

        let err = merge_verdict(&path, &sample_report()).expect_err("should fail");
        assert!(matches!(err, ValidationError::MalformedRecord(_)));
    }

    #[test]
    fn test_load_missing_record_is_input_not_found() {
        let err = ExecutionRecord::load(Path::new("/nonexistent/result.json"))
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::InputNotFound(_)));
    }
}
