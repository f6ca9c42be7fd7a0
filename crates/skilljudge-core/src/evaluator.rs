//! Checkpoint evaluation engine.
//!
//! Runs a fixed ordered battery of six checkpoints against one
//! (scenario, execution record, rule bundle) triple and produces a
//! [`VerdictReport`]. Checkpoints are independent but write into a
//! shared scorecard and failure log, so they run strictly in order to
//! keep diagnostic ordering reproducible.

use regex::Regex;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::debug;

use crate::checkpoint::{
    CheckpointResult, CheckpointStatus, MaxScores, ScoreCard, VerdictReport, VerdictStatus,
};
use crate::error::Result;
use crate::record::ExecutionRecord;
use crate::rules::{self, ActionRule, RuleStore, NO_HARDCODED_TOKENS};
use crate::scenario::ScenarioDescriptor;
use crate::sink::{LineStyle, OutputSink};

/// One evaluation run over a scenario/record pair.
///
/// Stateless with respect to other runs; consumes itself on
/// [`validate_all`].
///
/// [`validate_all`]: Validator::validate_all
pub struct Validator<'a> {
    scenario: &'a ScenarioDescriptor,
    record: &'a ExecutionRecord,
    rules: &'a RuleStore,
    sink: &'a mut dyn OutputSink,
    scores: ScoreCard,
    checkpoints: Vec<CheckpointResult>,
    failures: Vec<String>,
}

impl<'a> Validator<'a> {
    pub fn new(
        scenario: &'a ScenarioDescriptor,
        record: &'a ExecutionRecord,
        rules: &'a RuleStore,
        sink: &'a mut dyn OutputSink,
    ) -> Self {
        Self {
            scenario,
            record,
            rules,
            sink,
            scores: ScoreCard::default(),
            checkpoints: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Run all six checkpoints in order and build the verdict.
    ///
    /// Assertion failures never abort the run; only unparseable rule
    /// patterns propagate as errors.
    pub fn validate_all(mut self) -> Result<VerdictReport> {
        self.sink.line(LineStyle::Section, "Validating Test Results");

        self.check_skill_invocation();
        self.check_scanner_selection()?;
        self.check_files_created();
        self.check_security_compliance()?;
        self.check_version_currency()?;
        self.check_documentation_fetches()?;

        // Recomputed from the categories here, not trusted mid-run:
        // security penalties can drive its category negative.
        self.scores.finalize();
        let status = VerdictStatus::from_total(self.scores.total);
        debug!(total = self.scores.total, %status, "evaluation complete");

        Ok(VerdictReport {
            status,
            scores: self.scores,
            max_scores: MaxScores::default(),
            checkpoints: self.checkpoints,
            failures: self.failures,
        })
    }

    /// Checkpoint 1: expected vs. invoked skills, compared as sets.
    ///
    /// Missing skills fail the checkpoint (one failure entry each);
    /// extra skills are tolerated as a warning with no score change.
    fn check_skill_invocation(&mut self) {
        self.sink
            .line(LineStyle::Checkpoint, "Validating skill invocation...");

        let expected: BTreeSet<&str> = self
            .scenario
            .expected
            .skills_invoked
            .iter()
            .map(String::as_str)
            .collect();
        let actual: BTreeSet<&str> = self
            .record
            .skills_invoked
            .iter()
            .map(String::as_str)
            .collect();

        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let extra: Vec<&str> = actual.difference(&expected).copied().collect();

        if missing.is_empty() && extra.is_empty() {
            self.scores.accuracy += 10;
            self.sink.line(LineStyle::Pass, "All expected skills invoked");
            self.checkpoints.push(CheckpointResult::passed(
                "skill_invocation",
                "All expected skills invoked correctly",
            ));
            return;
        }

        for skill in &missing {
            self.failures.push(format!("Missing skill: {skill}"));
            self.sink
                .line(LineStyle::Fail, &format!("Missing skill: {skill}"));
        }
        if !extra.is_empty() {
            self.sink.line(
                LineStyle::Warn,
                &format!("Unexpected skills: {}", extra.join(", ")),
            );
        }

        if missing.is_empty() {
            self.checkpoints.push(CheckpointResult::warning(
                "skill_invocation",
                format!("Extra skills invoked: {}", extra.join(", ")),
            ));
        } else {
            self.checkpoints.push(CheckpointResult::failed(
                "skill_invocation",
                format!(
                    "Missing: [{}], extra: [{}]",
                    missing.join(", "),
                    extra.join(", ")
                ),
            ));
        }
    }

    /// Checkpoint 2: scanner selection via language-keyed patterns.
    ///
    /// Skipped (not scored, not failed) when no rule document or no
    /// rule for the scenario's language exists. One flag runs across
    /// all files: a correct-pattern match sets it, an incorrect-pattern
    /// match clears it and records a failure, and a later file can set
    /// it again without clearing already-recorded failures.
    fn check_scanner_selection(&mut self) -> Result<()> {
        self.sink
            .line(LineStyle::Checkpoint, "Validating scanner selection...");

        let Some(scanner_rules) = &self.rules.scanner else {
            self.sink.line(LineStyle::Warn, "No scanner assertions found");
            return Ok(());
        };
        let Some(language) = self.scenario.language.as_deref() else {
            self.sink.line(LineStyle::Warn, "Scenario defines no language");
            return Ok(());
        };
        let Some(rule) = scanner_rules.for_language(language) else {
            self.sink
                .line(LineStyle::Warn, &format!("No rules for language: {language}"));
            return Ok(());
        };

        let correct_patterns: Vec<Regex> = rule
            .correct_patterns
            .iter()
            .map(|p| rules::compile(p))
            .collect::<Result<_>>()?;
        let incorrect_patterns: Vec<(Regex, &str)> = rule
            .incorrect_patterns
            .iter()
            .map(|ip| rules::compile(&ip.pattern).map(|re| (re, ip.reason.as_str())))
            .collect::<Result<_>>()?;

        let mut correct_scanner = false;
        for file in &self.record.files_created {
            if correct_patterns.iter().any(|re| re.is_match(&file.content)) {
                correct_scanner = true;
            }
            for (re, reason) in &incorrect_patterns {
                if re.is_match(&file.content) {
                    self.failures.push(format!("Incorrect scanner: {reason}"));
                    self.sink.line(LineStyle::Fail, reason);
                    correct_scanner = false;
                }
            }
        }

        if correct_scanner {
            self.scores.accuracy += 10;
            self.sink.line(LineStyle::Pass, "Correct scanner selected");
            self.checkpoints.push(CheckpointResult::passed(
                "scanner_selection",
                format!("Correct {} used", rule.expected_scanner),
            ));
        } else {
            self.checkpoints.push(CheckpointResult::failed(
                "scanner_selection",
                "Incorrect scanner selection",
            ));
        }
        Ok(())
    }

    /// Checkpoint 3: expected files exist with required content.
    ///
    /// +5 accuracy per expected file that produced zero failures; the
    /// accuracy category's 40-point ceiling is the only bound.
    fn check_files_created(&mut self) {
        self.sink
            .line(LineStyle::Checkpoint, "Validating file creation...");

        let expected_files = &self.scenario.expected.files_created;
        let mut validated = 0usize;

        for expected in expected_files {
            let Some(actual) = self
                .record
                .files_created
                .iter()
                .find(|f| f.path == expected.path)
            else {
                self.failures.push(format!("File not created: {}", expected.path));
                self.sink
                    .line(LineStyle::Fail, &format!("File not created: {}", expected.path));
                continue;
            };

            let mut clean = true;
            for item in &expected.must_contain {
                if !actual.content.contains(item) {
                    self.failures
                        .push(format!("Missing content in {}: {item}", expected.path));
                    self.sink.line(LineStyle::Fail, &format!("Missing: {item}"));
                    clean = false;
                }
            }
            for item in &expected.must_not_contain {
                if actual.content.contains(item) {
                    self.failures
                        .push(format!("Forbidden content in {}: {item}", expected.path));
                    self.sink
                        .line(LineStyle::Fail, &format!("Contains forbidden: {item}"));
                    clean = false;
                }
            }

            if clean {
                self.scores.accuracy += 5;
                validated += 1;
                self.sink
                    .line(LineStyle::Pass, &format!("File {} validated", expected.path));
            }
        }

        let message = format!("{validated}/{} expected files validated", expected_files.len());
        if validated == expected_files.len() {
            self.checkpoints
                .push(CheckpointResult::passed("files_created", message));
        } else {
            self.checkpoints
                .push(CheckpointResult::failed("files_created", message));
        }
    }

    /// Checkpoint 4: hardcoded-credential scan.
    ///
    /// Applies only the `no-hardcoded-tokens` rule. Every pattern match
    /// is a failure and an immediate -20 security penalty with no
    /// floor; a clean scan awards +20.
    fn check_security_compliance(&mut self) -> Result<()> {
        self.sink
            .line(LineStyle::Checkpoint, "Validating security compliance...");

        let Some(security_rules) = &self.rules.security else {
            self.sink.line(LineStyle::Warn, "No security assertions found");
            return Ok(());
        };
        let Some(rule) = security_rules.by_id(NO_HARDCODED_TOKENS) else {
            self.sink
                .line(LineStyle::Warn, &format!("No {NO_HARDCODED_TOKENS} rule defined"));
            return Ok(());
        };

        let patterns: Vec<(Regex, &str)> = rule
            .patterns
            .iter()
            .map(|p| rules::compile(&p.regex).map(|re| (re, p.failure_message.as_str())))
            .collect::<Result<_>>()?;

        // Base award; each violation below subtracts 20, so one
        // violation zeroes the category and further ones negate it.
        self.scores.security += 20;

        let mut violations = 0u32;
        for file in &self.record.files_created {
            for (re, message) in &patterns {
                if re.is_match(&file.content) {
                    self.failures.push((*message).to_string());
                    self.sink.line(LineStyle::Fail, message);
                    self.scores.security -= 20;
                    violations += 1;
                }
            }
        }

        if violations == 0 {
            self.sink.line(LineStyle::Pass, "No security violations found");
            self.checkpoints.push(CheckpointResult::passed(
                "security_compliance",
                "All security checks passed",
            ));
        } else {
            self.checkpoints.push(CheckpointResult::failed(
                "security_compliance",
                format!("{violations} security violation(s) found"),
            ));
        }
        Ok(())
    }

    /// Checkpoint 5: version currency of platform action references.
    ///
    /// Score is `floor(current / total * 15)`, truncating toward zero;
    /// zero applicable checks leaves the category untouched.
    fn check_version_currency(&mut self) -> Result<()> {
        self.sink
            .line(LineStyle::Checkpoint, "Validating version currency...");

        let Some(version_rules) = &self.rules.versions else {
            self.sink.line(LineStyle::Warn, "No version assertions found");
            return Ok(());
        };
        let Some(platform) = self.scenario.platform.as_deref() else {
            self.sink.line(LineStyle::Warn, "Scenario defines no platform");
            return Ok(());
        };
        let Some(platform_rules) = version_rules.platforms.get(platform) else {
            self.sink
                .line(LineStyle::Warn, &format!("No version rules for platform: {platform}"));
            return Ok(());
        };

        let actions: Vec<(Regex, &ActionRule)> = platform_rules
            .actions
            .iter()
            .map(|a| rules::compile(&a.pattern).map(|re| (re, a)))
            .collect::<Result<_>>()?;

        let mut current_versions = 0u32;
        let mut total_checks = 0u32;
        let mut deprecated_found = false;

        for file in &self.record.files_created {
            for (re, action) in &actions {
                for caps in re.captures_iter(&file.content) {
                    let matched = match caps.get(1) {
                        Some(group) => group.as_str(),
                        None => &caps[0],
                    };
                    total_checks += 1;

                    if matched == strip_version_prefix(&action.current_version) {
                        current_versions += 1;
                    } else if action
                        .deprecated_versions
                        .iter()
                        .any(|v| matched == strip_version_prefix(v))
                    {
                        deprecated_found = true;
                        self.failures
                            .push(format!("Deprecated version: {}@v{matched}", action.name));
                        self.sink
                            .line(LineStyle::Fail, &format!("Deprecated: {}@v{matched}", action.name));
                    }
                }
            }
        }

        if total_checks == 0 {
            self.sink.line(LineStyle::Warn, "No version checks applicable");
            return Ok(());
        }

        let score = (f64::from(current_versions) / f64::from(total_checks) * 15.0) as i32;
        self.scores.currency += score;
        self.sink.line(
            LineStyle::Pass,
            &format!("Version currency: {current_versions}/{total_checks} current"),
        );

        let message = format!("{current_versions}/{total_checks} version references current");
        let status = if current_versions == total_checks {
            CheckpointStatus::Passed
        } else if deprecated_found {
            CheckpointStatus::Failed
        } else {
            CheckpointStatus::Warning
        };
        self.checkpoints.push(CheckpointResult {
            name: "version_currency".to_string(),
            status,
            message,
            details: None,
        });
        Ok(())
    }

    /// Checkpoint 6: documentation fetch counts, domains, and pages.
    ///
    /// A no-op when the scenario defines no expectation (or only an
    /// empty, unconstrained one). Fetch count
    /// within the inclusive `[min, max]` window earns +3 efficiency;
    /// below min is a failure, above max only a warning. Each expected
    /// domain found as a substring earns +2; expected pages are
    /// diagnostic only.
    fn check_documentation_fetches(&mut self) -> Result<()> {
        self.sink
            .line(LineStyle::Checkpoint, "Validating documentation fetches...");

        // An empty expectation block constrains nothing and is the
        // same as no block at all: skip instead of trivially awarding.
        let expected = match &self.scenario.expected.documentation_fetches {
            Some(expected) if !expected.is_unconstrained() => expected,
            _ => {
                self.sink
                    .line(LineStyle::Warn, "No documentation fetch expectations defined");
                return Ok(());
            }
        };

        let fetches = &self.record.documentation_fetches;
        let total = fetches.total_count;
        let domains: BTreeSet<&str> = fetches.domains.iter().map(String::as_str).collect();

        self.sink
            .line(LineStyle::Note, &format!("Total documentation fetches: {total}"));
        if !domains.is_empty() {
            let joined = domains.iter().copied().collect::<Vec<_>>().join(", ");
            self.sink
                .line(LineStyle::Note, &format!("Domains accessed: {joined}"));
        }

        if total < expected.min_fetches {
            self.failures.push(format!(
                "Too few documentation fetches: {total} < {}",
                expected.min_fetches
            ));
            self.sink.line(
                LineStyle::Fail,
                &format!("Too few fetches ({total} < {})", expected.min_fetches),
            );
        } else if total > expected.max_fetches {
            self.sink.line(
                LineStyle::Warn,
                &format!("Many fetches ({total} > {})", expected.max_fetches),
            );
        } else {
            self.scores.efficiency += 3;
            self.sink
                .line(LineStyle::Pass, &format!("Appropriate number of fetches ({total})"));
        }

        for domain in &expected.expected_domains {
            if domains.iter().any(|fd| fd.contains(domain.as_str())) {
                self.scores.efficiency += 2;
                self.sink
                    .line(LineStyle::Pass, &format!("Fetched from {domain}"));
            } else {
                self.sink
                    .line(LineStyle::Warn, &format!("No fetches from {domain}"));
            }
        }

        for page in &expected.expected_pages {
            let re = rules::compile(&page.pattern)?;
            if fetches.pages.iter().any(|p| re.is_match(&p.url)) {
                self.sink
                    .line(LineStyle::Pass, &format!("Fetched: {}", page.description));
            } else {
                self.sink
                    .line(LineStyle::Warn, &format!("Missing: {}", page.description));
            }
        }

        let status = if total >= expected.min_fetches {
            CheckpointStatus::Passed
        } else {
            CheckpointStatus::Warning
        };
        let details = json!({
            "total_count": total,
            "domains": domains.iter().copied().collect::<Vec<_>>(),
            "pages": fetches.pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
        });
        self.checkpoints.push(
            CheckpointResult {
                name: "documentation_fetches".to_string(),
                status,
                message: format!("{total} documentation pages fetched"),
                details: None,
            }
            .with_details(details),
        );
        Ok(())
    }
}

/// Strip a leading `v` prefix before version equality comparison.
fn strip_version_prefix(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}
