//! Scenario registry and runner
//!
//! Scenarios are awaited one at a time in the order they are handed to
//! [`TestRunner::run_scenario`]. Whatever a scenario raises (an assertion, a
//! transport error, a panic) is recorded as a failure at that boundary and the
//! run moves on to the next scenario.

use std::any::Any;
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Instant;

use colored::Colorize;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub group: String,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Accumulated results of a run
///
/// `passed + failed == tests.len()` holds after every [`record`](Self::record).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsSummary {
    passed: usize,
    failed: usize,
    tests: Vec<TestResult>,
}

impl ResultsSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: TestResult) -> &TestResult {
        match result.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
        }
        self.tests.push(result);
        &self.tests[self.tests.len() - 1]
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn tests(&self) -> &[TestResult] {
        &self.tests
    }

    /// Rounded pass percentage; 0 for an empty run.
    pub fn score(&self) -> u32 {
        if self.total() == 0 {
            return 0;
        }
        (self.passed as f64 / self.total() as f64 * 100.0).round() as u32
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Results written to: {}", path.display());
        Ok(())
    }
}

/// Operator-facing progress output
pub struct Reporter {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Reporter {
    /// Report to stdout, colored when stdout is a terminal
    pub fn stdout() -> Self {
        let color = std::io::stdout().is_terminal();
        Self::new(Box::new(std::io::stdout()), color)
    }

    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self { out, color }
    }

    fn line(&mut self, text: &str) {
        // Progress output is best-effort; a closed stdout must not fail the run.
        let _ = writeln!(self.out, "{}", text);
    }

    pub fn banner(&mut self, title: &str) {
        self.line(&format!("\n=== {} ===\n", title));
    }

    pub fn section(&mut self, title: &str) {
        self.line(title);
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    pub fn passed(&mut self, name: &str) {
        let mark = if self.color { "✓".green().to_string() } else { "✓".to_string() };
        self.line(&format!("  {} {}", mark, name));
    }

    pub fn failed(&mut self, name: &str, error: &str) {
        let mark = if self.color { "✗".red().to_string() } else { "✗".to_string() };
        self.line(&format!("  {} {}", mark, name));
        self.line(&format!("    Error: {}", error));
    }

    pub fn notice(&mut self, message: &str) {
        let mark = if self.color { "!".yellow().to_string() } else { "!".to_string() };
        self.line(&format!("  {} {}", mark, message));
    }

    pub fn summary(&mut self, summary: &ResultsSummary) {
        self.line("\n=== Results ===");
        self.line(&format!("Passed: {}", summary.passed()));
        self.line(&format!("Failed: {}", summary.failed()));
        self.line(&format!("Score: {}%\n", summary.score()));
        let _ = self.out.flush();
    }
}

/// Sequential scenario runner
pub struct TestRunner {
    summary: ResultsSummary,
    reporter: Reporter,
}

impl TestRunner {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            summary: ResultsSummary::new(),
            reporter,
        }
    }

    pub fn reporter(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    pub fn summary(&self) -> &ResultsSummary {
        &self.summary
    }

    /// Drive one scenario to completion and record its outcome
    pub async fn run_scenario<F>(&mut self, name: &str, group: &str, scenario: F) -> &TestResult
    where
        F: Future<Output = HarnessResult<()>>,
    {
        debug!("Running scenario: {}", name);
        let start = Instant::now();

        let outcome = match AssertUnwindSafe(scenario).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(HarnessError::ScenarioPanicked(panic_message(payload.as_ref()))),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let result = match outcome {
            Ok(()) => {
                self.reporter.passed(name);
                TestResult {
                    name: name.to_string(),
                    group: group.to_string(),
                    status: TestStatus::Passed,
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.reporter.failed(name, &message);
                TestResult {
                    name: name.to_string(),
                    group: group.to_string(),
                    status: TestStatus::Failed,
                    error: Some(message),
                    duration_ms,
                }
            }
        };

        self.summary.record(result)
    }

    /// Print the results block and hand back the accumulated summary
    pub fn finish(mut self) -> ResultsSummary {
        self.reporter.summary(&self.summary);
        info!(
            "Run complete: {} passed, {} failed",
            self.summary.passed(),
            self.summary.failed()
        );
        self.summary
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
