//! skilljudge - validation and scoring of recorded agent test runs.
//!
//! Compares a declarative scenario (expected skills, files,
//! documentation fetches) against a recorded execution result and
//! produces a weighted scorecard, per-checkpoint verdicts, and failure
//! diagnostics:
//! - [`ScenarioDescriptor`]: the declarative expectations (YAML)
//! - [`ExecutionRecord`]: the recorded actual behavior (JSON)
//! - [`RuleStore`]: externally supplied pattern/version rule documents
//! - [`Validator`]: the six-checkpoint evaluation engine
//! - [`VerdictReport`]: scores, checkpoints, failures, pass/fail
//!
//! The engine is single-threaded and fully synchronous; rules are
//! injected so evaluations can run against in-memory fixtures.

pub mod checkpoint;
pub mod error;
pub mod evaluator;
pub mod record;
pub mod report;
pub mod rules;
pub mod scenario;
pub mod sink;
pub mod summary;
pub mod telemetry;
pub mod tracking;

pub use checkpoint::{
    CheckpointResult, CheckpointStatus, MaxScores, ScoreCard, VerdictReport, VerdictStatus,
    PASS_THRESHOLD,
};
pub use error::{Result, ValidationError};
pub use evaluator::Validator;
pub use record::{merge_verdict, CreatedFile, DocFetches, ExecutionRecord, FetchedPage};
pub use rules::{RuleStore, ScannerRules, SecurityRules, VersionRules, NO_HARDCODED_TOKENS};
pub use scenario::{DocFetchExpectation, Expectations, ExpectedFile, ScenarioDescriptor};
pub use sink::{ConsoleSink, DiscardSink, LineStyle, OutputSink, RecordingSink};
pub use summary::{load_results, ModelStats, ModelSummary, ResultDoc};
pub use telemetry::init_tracing;
pub use tracking::TrackingFile;

/// skilljudge core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
