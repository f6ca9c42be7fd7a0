//! Result-directory aggregation.
//!
//! Loads the evaluated result documents for one model, groups them by
//! language and status, and derives the statistics consumed by the
//! summary and comparison reports. Pure consumers of the evaluator's
//! persisted output; no scoring logic lives here.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::checkpoint::ScoreCard;
use crate::error::{Result, ValidationError};
use crate::record::DocFetches;

/// One loaded result document (an execution record after evaluation).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultDoc {
    #[serde(default)]
    pub scenario: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    /// Lowercased verdict written by the evaluator; anything else
    /// (including absence) counts as pending.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub scores: Option<ScoreCard>,

    #[serde(default)]
    pub validation: Option<ValidationSection>,

    #[serde(default)]
    pub documentation_fetches: Option<DocFetches>,

    /// Source file name, filled in by the loader.
    #[serde(skip)]
    pub file: String,
}

impl ResultDoc {
    pub fn language_or_unknown(&self) -> &str {
        self.language.as_deref().unwrap_or("unknown")
    }

    pub fn scenario_or_unknown(&self) -> &str {
        self.scenario.as_deref().unwrap_or("unknown")
    }

    pub fn outcome(&self) -> Outcome {
        match self.status.as_deref() {
            Some("passed") => Outcome::Passed,
            Some("failed") => Outcome::Failed,
            _ => Outcome::Pending,
        }
    }

    pub fn total_score(&self) -> i32 {
        self.scores.map(|s| s.total).unwrap_or(0)
    }

    pub fn doc_fetch_count(&self) -> u32 {
        self.documentation_fetches
            .as_ref()
            .map(|d| d.total_count)
            .unwrap_or(0)
    }
}

/// The `validation` block persisted into a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationSection {
    #[serde(default)]
    pub failures: Vec<String>,
}

/// Classification of a result document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Pending,
}

/// Load all `*.json` result documents in a directory, sorted by file
/// name for deterministic report ordering.
pub fn load_results(dir: &Path) -> Result<Vec<ResultDoc>> {
    if !dir.is_dir() {
        return Err(ValidationError::InputNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)?;
        let mut doc: ResultDoc = serde_json::from_str(&text)?;
        doc.file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        results.push(doc);
    }
    Ok(results)
}

/// Per-language pass/fail tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
}

impl LanguageStats {
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Aggregate statistics over one model's result directory.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub model: String,
    pub results: Vec<ResultDoc>,
    pub by_language: BTreeMap<String, LanguageStats>,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    /// Percentage of passed results.
    pub pass_rate: f64,
    /// Average total score over results that carry scores.
    pub avg_score: f64,
    /// Average fetch count over results that recorded any fetches.
    pub avg_doc_fetches: f64,
}

impl ModelSummary {
    /// Build summary statistics from loaded results.
    pub fn new(model: &str, results: Vec<ResultDoc>) -> Self {
        let mut by_language: BTreeMap<String, LanguageStats> = BTreeMap::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut pending = 0;

        let mut score_sum = 0i64;
        let mut score_count = 0usize;
        let mut fetch_sum = 0u64;
        let mut fetch_count = 0usize;

        for result in &results {
            let stats = by_language
                .entry(result.language_or_unknown().to_string())
                .or_default();
            stats.total += 1;
            match result.outcome() {
                Outcome::Passed => {
                    stats.passed += 1;
                    passed += 1;
                }
                Outcome::Failed => {
                    stats.failed += 1;
                    failed += 1;
                }
                Outcome::Pending => {
                    stats.pending += 1;
                    pending += 1;
                }
            }

            if let Some(scores) = result.scores {
                score_sum += i64::from(scores.total);
                score_count += 1;
            }
            let fetches = result.doc_fetch_count();
            if fetches > 0 {
                fetch_sum += u64::from(fetches);
                fetch_count += 1;
            }
        }

        let total = results.len();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };
        let avg_score = if score_count == 0 {
            0.0
        } else {
            score_sum as f64 / score_count as f64
        };
        let avg_doc_fetches = if fetch_count == 0 {
            0.0
        } else {
            fetch_sum as f64 / fetch_count as f64
        };

        Self {
            model: model.to_string(),
            results,
            by_language,
            passed,
            failed,
            pending,
            pass_rate,
            avg_score,
            avg_doc_fetches,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Per-model aggregate statistics for the cross-model comparison table.
#[derive(Debug, Clone)]
pub struct ModelStats {
    pub model: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub avg_score: f64,
    pub avg_accuracy: f64,
    pub avg_security: f64,
    pub avg_efficiency: f64,
    pub avg_currency: f64,
    pub avg_usability: f64,
    pub avg_doc_fetches: f64,
}

impl ModelStats {
    /// Average every score category over all results (absent scores
    /// count as zero, matching the summary-report convention).
    pub fn from_results(model: &str, results: &[ResultDoc]) -> Self {
        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.outcome() == Outcome::Passed)
            .count();
        let failed = results
            .iter()
            .filter(|r| r.outcome() == Outcome::Failed)
            .count();

        let avg = |f: &dyn Fn(&ResultDoc) -> i64| -> f64 {
            if total == 0 {
                0.0
            } else {
                results.iter().map(|r| f(r)).sum::<i64>() as f64 / total as f64
            }
        };

        let score = |r: &ResultDoc| r.scores.unwrap_or_default();

        Self {
            model: model.to_string(),
            total,
            passed,
            failed,
            pass_rate: if total == 0 {
                0.0
            } else {
                passed as f64 / total as f64 * 100.0
            },
            avg_score: avg(&|r| i64::from(score(r).total)),
            avg_accuracy: avg(&|r| i64::from(score(r).accuracy)),
            avg_security: avg(&|r| i64::from(score(r).security)),
            avg_efficiency: avg(&|r| i64::from(score(r).efficiency)),
            avg_currency: avg(&|r| i64::from(score(r).currency)),
            avg_usability: avg(&|r| i64::from(score(r).usability)),
            avg_doc_fetches: avg(&|r| i64::from(r.doc_fetch_count())),
        }
    }
}
