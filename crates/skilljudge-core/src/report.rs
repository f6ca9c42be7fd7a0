//! Report emitters: console and Markdown artifacts.
//!
//! Pure consumers of the evaluator's structured output. Three
//! renderers: the per-run verdict box, the per-model Markdown/console
//! summary, and the cross-model comparison table.

use chrono::Utc;

use crate::checkpoint::{MaxScores, VerdictReport};
use crate::summary::{ModelStats, ModelSummary, Outcome};

/// Render the end-of-run verdict box shown after `validate`.
pub fn render_verdict(report: &VerdictReport) -> String {
    let rule = "=".repeat(44);
    let max = MaxScores::default();
    let mark = if report.status.is_passed() {
        "\u{2713}"
    } else {
        "\u{2717}"
    };

    let mut out = String::new();
    out.push_str(&format!("\n{rule}\n"));
    out.push_str(&format!("TEST {} {mark}\n", report.status));
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("Score: {}/100\n", report.scores.total));
    out.push_str(&format!("  Accuracy:   {}/{}\n", report.scores.accuracy, max.accuracy));
    out.push_str(&format!("  Security:   {}/{}\n", report.scores.security, max.security));
    out.push_str(&format!("  Efficiency: {}/{}\n", report.scores.efficiency, max.efficiency));
    out.push_str(&format!("  Currency:   {}/{}\n", report.scores.currency, max.currency));
    out.push_str(&format!("  Usability:  {}/{}\n", report.scores.usability, max.usability));
    out.push_str(&format!("{rule}\n"));
    out
}

/// Render the per-model summary as Markdown.
pub fn render_summary_markdown(summary: &ModelSummary) -> String {
    let mut md = String::new();
    let total = summary.total();
    let failed_rate = if total == 0 {
        0.0
    } else {
        summary.failed as f64 / total as f64 * 100.0
    };

    md.push_str("# Test Suite Summary\n\n");
    md.push_str(&format!("**Model:** {}\n", summary.model));
    md.push_str(&format!("**Date:** {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S")));
    md.push_str(&format!("**Total Scenarios:** {total}\n\n"));

    md.push_str("## Overall Results\n\n");
    md.push_str(&format!(
        "- **Passed:** {} ({:.1}%)\n",
        summary.passed, summary.pass_rate
    ));
    md.push_str(&format!("- **Failed:** {} ({failed_rate:.1}%)\n", summary.failed));
    if summary.pending > 0 {
        md.push_str(&format!("- **Pending:** {}\n", summary.pending));
    }
    md.push_str(&format!("- **Average Score:** {:.1}/100\n", summary.avg_score));
    if summary.avg_doc_fetches > 0.0 {
        md.push_str(&format!(
            "- **Avg Documentation Fetches:** {:.1} pages/scenario\n",
            summary.avg_doc_fetches
        ));
    }
    md.push_str("\n---\n\n## Results by Language\n\n");

    md.push_str("| Language | Total | Passed | Failed | Pass Rate |\n");
    md.push_str("|----------|-------|--------|--------|-----------|\n");
    for (language, stats) in &summary.by_language {
        let mark = if stats.failed == 0 { "\u{2713}" } else { "\u{2717}" };
        md.push_str(&format!(
            "| {language} | {} | {} | {} | {:.1}% {mark} |\n",
            stats.total,
            stats.passed,
            stats.failed,
            stats.pass_rate()
        ));
    }
    md.push_str("\n---\n\n");

    if summary.failed > 0 {
        md.push_str("## Failed Scenarios\n\n");
        for result in &summary.results {
            if result.outcome() != Outcome::Failed {
                continue;
            }
            md.push_str(&format!(
                "### {}/{}\n",
                result.language_or_unknown(),
                result.scenario_or_unknown()
            ));
            md.push_str(&format!("**Score:** {}/100\n\n", result.total_score()));

            let failures = result
                .validation
                .as_ref()
                .map(|v| v.failures.as_slice())
                .unwrap_or_default();
            if !failures.is_empty() {
                md.push_str("**Issues:**\n");
                for failure in failures {
                    md.push_str(&format!("- {failure}\n"));
                }
                md.push('\n');
            }
            md.push_str(&format!(
                "**Details:** `results/{}/{}`\n\n",
                summary.model, result.file
            ));
        }
        md.push_str("---\n\n");
    }

    md.push_str("## Score Breakdown\n\n");
    md.push_str(
        "| Scenario | Accuracy | Security | Efficiency | Currency | Usability | Total | Doc Fetches |\n",
    );
    md.push_str(
        "|---------|---------|---------|-----------|---------|-----------|------|-------------|\n",
    );

    let mut ordered: Vec<_> = summary.results.iter().collect();
    ordered.sort_by(|a, b| b.total_score().cmp(&a.total_score()));
    for result in ordered {
        let scores = result.scores.unwrap_or_default();
        md.push_str(&format!(
            "| {}/{} | {}/40 | {}/20 | {}/15 | {}/15 | {}/10 | {}/100 | {} |\n",
            result.language_or_unknown(),
            result.scenario_or_unknown(),
            scores.accuracy,
            scores.security,
            scores.efficiency,
            scores.currency,
            scores.usability,
            scores.total,
            result.doc_fetch_count()
        ));
    }

    md.push_str("\n---\n\n## Recommendations\n\n");
    md.push_str(recommendation(summary.pass_rate));
    md.push('\n');
    md
}

fn recommendation(pass_rate: f64) -> &'static str {
    if pass_rate >= 95.0 {
        "**Excellent:** Model performs very well across all scenarios."
    } else if pass_rate >= 80.0 {
        "**Good:** Model performs well but has some areas for improvement."
    } else if pass_rate >= 60.0 {
        "**Fair:** Model needs improvement in several areas."
    } else {
        "**Poor:** Model requires significant improvements."
    }
}

/// Render the per-model summary for the console.
pub fn render_summary_console(summary: &ModelSummary) -> String {
    let rule = "=".repeat(77);
    let mut out = String::new();

    out.push_str(&format!("\n{rule}\nTest Suite Summary Report\n{rule}\n\n"));
    out.push_str(&format!("Model: {}\n", summary.model));
    out.push_str(&format!("Total Scenarios: {}\n", summary.total()));
    out.push_str(&format!(
        "Passed: {} ({:.1}%)\n",
        summary.passed, summary.pass_rate
    ));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    if summary.pending > 0 {
        out.push_str(&format!("Pending: {}\n", summary.pending));
    }

    out.push_str(&format!("\n{rule}\nResults by Category\n{rule}\n\n"));
    for (language, stats) in &summary.by_language {
        let mark = if stats.failed == 0 { "\u{2713}" } else { "\u{2717}" };
        out.push_str(&format!(
            "{language:15} {}/{:2}   {mark} {:.1}%\n",
            stats.passed,
            stats.total,
            stats.pass_rate()
        ));
    }

    if summary.failed > 0 {
        out.push_str(&format!("\n{rule}\nFailed Scenarios\n{rule}\n\n"));
        for result in &summary.results {
            if result.outcome() == Outcome::Failed {
                let name = format!(
                    "{}/{}",
                    result.language_or_unknown(),
                    result.scenario_or_unknown()
                );
                out.push_str(&format!(
                    "\u{2717} {name:45} Score: {}/100\n",
                    result.total_score()
                ));
            }
        }
    }

    out.push_str(&format!("\n{rule}\n"));
    out
}

/// Render the cross-model comparison report as Markdown: the overall
/// table, best-in-category callouts, and a per-model breakdown.
pub fn render_comparison_markdown(stats: &[ModelStats]) -> String {
    let mut md = String::new();
    md.push_str("# Model Comparison\n\n");
    md.push_str(&format!("**Date:** {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S")));
    md.push_str(&format!(
        "**Models Compared:** {}\n\n",
        stats.iter().map(|s| s.model.as_str()).collect::<Vec<_>>().join(", ")
    ));

    md.push_str("## Overall Comparison\n\n");
    md.push_str(
        "| Model | Scenarios | Passed | Failed | Pass Rate | Avg Score | Accuracy | Security | Efficiency | Currency | Usability | Avg Docs |\n",
    );
    md.push_str(
        "|-------|-----------|--------|--------|-----------|-----------|----------|----------|------------|----------|-----------|----------|\n",
    );
    for s in stats {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% | {:.1}/100 | {:.1}/40 | {:.1}/20 | {:.1}/15 | {:.1}/15 | {:.1}/10 | {:.1} |\n",
            s.model,
            s.total,
            s.passed,
            s.failed,
            s.pass_rate,
            s.avg_score,
            s.avg_accuracy,
            s.avg_security,
            s.avg_efficiency,
            s.avg_currency,
            s.avg_usability,
            s.avg_doc_fetches
        ));
    }

    let best = |key: &dyn Fn(&ModelStats) -> f64| {
        stats.iter().max_by(|a, b| key(a).total_cmp(&key(b)))
    };
    if let Some(best_pass_rate) = best(&|s| s.pass_rate) {
        md.push_str("\n---\n\n## Best in Category\n\n");
        md.push_str(&format!(
            "- **Best Pass Rate:** {} ({:.1}%)\n",
            best_pass_rate.model, best_pass_rate.pass_rate
        ));
        if let Some(s) = best(&|s| s.avg_score) {
            md.push_str(&format!(
                "- **Best Average Score:** {} ({:.1}/100)\n",
                s.model, s.avg_score
            ));
        }
        if let Some(s) = best(&|s| s.avg_security) {
            md.push_str(&format!(
                "- **Best Security:** {} ({:.1}/20)\n",
                s.model, s.avg_security
            ));
        }
        if let Some(s) = best(&|s| s.avg_efficiency) {
            md.push_str(&format!(
                "- **Best Efficiency:** {} ({:.1}/15)\n",
                s.model, s.avg_efficiency
            ));
        }
    }

    if !stats.is_empty() {
        md.push_str("\n---\n\n## Detailed Performance Breakdown\n\n");
        for s in stats {
            md.push_str(&format!("### {}\n\n", s.model));
            md.push_str("**Overall Performance:**\n");
            md.push_str(&format!("- Scenarios: {}\n", s.total));
            md.push_str(&format!("- Pass Rate: {:.1}%\n", s.pass_rate));
            md.push_str(&format!("- Average Score: {:.1}/100\n\n", s.avg_score));

            md.push_str("**Score Breakdown:**\n");
            md.push_str(&format!("- Accuracy: {:.1}/40\n", s.avg_accuracy));
            md.push_str(&format!("- Security: {:.1}/20\n", s.avg_security));
            md.push_str(&format!("- Efficiency: {:.1}/15\n", s.avg_efficiency));
            md.push_str(&format!("- Currency: {:.1}/15\n", s.avg_currency));
            md.push_str(&format!("- Usability: {:.1}/10\n\n", s.avg_usability));

            if s.avg_doc_fetches > 0.0 {
                md.push_str("**Documentation Usage:**\n");
                md.push_str(&format!(
                    "- Average Doc Fetches: {:.1} pages/scenario\n\n",
                    s.avg_doc_fetches
                ));
            }
        }
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{ScoreCard, VerdictStatus};
    use crate::summary::ResultDoc;

    fn report(total: i32) -> VerdictReport {
        let mut scores = ScoreCard {
            accuracy: total,
            ..Default::default()
        };
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
    fn test_render_verdict_failed() {
        let text = render_verdict(&report(35));
        assert!(text.contains("TEST FAILED"));
        assert!(text.contains("Score: 35/100"));
        assert!(text.contains("Accuracy:   35/40"));
    }

    #[test]
    fn test_render_verdict_passed() {
        let text = render_verdict(&report(85));
        assert!(text.contains("TEST PASSED"));
    }

    #[test]
    fn test_summary_markdown_sections() {
        let results = vec![
            ResultDoc {
                scenario: Some("basic".into()),
                language: Some("python".into()),
                status: Some("failed".into()),
                scores: Some(ScoreCard {
                    accuracy: 10,
                    total: 10,
                    ..Default::default()
                }),
                ..Default::default()
            },
            ResultDoc {
                scenario: Some("deep".into()),
                language: Some("java".into()),
                status: Some("passed".into()),
                scores: Some(ScoreCard {
                    accuracy: 40,
                    security: 20,
                    efficiency: 15,
                    currency: 10,
                    total: 85,
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];
        let summary = ModelSummary::new("test-model", results);
        let md = render_summary_markdown(&summary);

        assert!(md.contains("**Model:** test-model"));
        assert!(md.contains("## Results by Language"));
        assert!(md.contains("### python/basic"));
        assert!(md.contains("## Score Breakdown"));
        // Highest score first in the breakdown table.
        let deep = md.find("java/deep").expect("java row");
        let basic = md.find("python/basic | 10/40").expect("python row");
        assert!(deep < basic);
    }

    #[test]
    fn test_recommendation_bands() {
        assert!(recommendation(100.0).contains("Excellent"));
        assert!(recommendation(85.0).contains("Good"));
        assert!(recommendation(70.0).contains("Fair"));
        assert!(recommendation(10.0).contains("Poor"));
    }

    #[test]
    fn test_comparison_table_row_per_model() {
        let a = ModelStats::from_results("model-a", &[]);
        let b = ModelStats::from_results("model-b", &[]);
        let md = render_comparison_markdown(&[a, b]);
        assert!(md.contains("| model-a |"));
        assert!(md.contains("| model-b |"));
    }

    #[test]
    fn test_comparison_best_in_category_and_breakdown() {
        let strong = ResultDoc {
            status: Some("passed".into()),
            scores: Some(ScoreCard {
                accuracy: 40,
                security: 20,
                efficiency: 15,
                currency: 15,
                usability: 0,
                total: 90,
            }),
            ..Default::default()
        };
        let weak = ResultDoc {
            status: Some("failed".into()),
            scores: Some(ScoreCard {
                accuracy: 10,
                security: 0,
                efficiency: 3,
                currency: 0,
                usability: 0,
                total: 13,
            }),
            ..Default::default()
        };
        let a = ModelStats::from_results("model-a", &[strong]);
        let b = ModelStats::from_results("model-b", &[weak]);
        let md = render_comparison_markdown(&[a, b]);

        assert!(md.contains("## Best in Category"));
        assert!(md.contains("- **Best Pass Rate:** model-a (100.0%)"));
        assert!(md.contains("- **Best Average Score:** model-a (90.0/100)"));
        assert!(md.contains("- **Best Security:** model-a (20.0/20)"));

        assert!(md.contains("## Detailed Performance Breakdown"));
        assert!(md.contains("### model-b"));
        assert!(md.contains("- Accuracy: 10.0/40"));
    }

    #[test]
    fn test_comparison_empty_stats_has_no_best_section() {
        let md = render_comparison_markdown(&[]);
        assert!(md.contains("## Overall Comparison"));
        assert!(!md.contains("## Best in Category"));
        assert!(!md.contains("## Detailed Performance Breakdown"));
    }
}
