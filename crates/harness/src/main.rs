//! crudcheck - runs the verification suite against a project tree
//!
//! Exit code 0 when every selected scenario passed, 1 otherwise (including
//! when the run itself could not be set up).

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crudcheck_harness::runner::Reporter;
use crudcheck_harness::scenarios::{self, Group};
use crudcheck_harness::{HarnessConfig, HarnessResult, ResultsSummary, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "crudcheck")]
#[command(about = "Verification harness for single-resource CRUD web projects")]
struct Args {
    /// Project root to check (defaults to the current directory)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Configuration file (defaults to <project>/crudcheck.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run only these groups
    #[arg(short, long, value_enum)]
    group: Vec<Group>,

    /// Run only the scenario with this exact name (repeatable)
    #[arg(short, long)]
    name: Vec<String>,

    /// Command that starts the backend, e.g. "node server/server.js".
    /// Split on whitespace with no shell quoting; use `server.command` in
    /// crudcheck.toml for arguments that contain spaces.
    #[arg(long)]
    server_cmd: Option<String>,

    /// Host the backend is reached on
    #[arg(long)]
    host: Option<String>,

    /// Port the backend listens on
    #[arg(long)]
    port: Option<u16>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// How long to wait for the backend to become healthy, in milliseconds
    #[arg(long)]
    readiness_timeout_ms: Option<u64>,

    /// Show the backend's own stdout/stderr
    #[arg(long)]
    server_logs: bool,

    /// Write results as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn load_config(&self) -> HarnessResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::discover(self.project.as_deref().unwrap_or(Path::new(".")))?,
        };

        if let Some(project) = &self.project {
            config.project_root = project.clone();
        }
        if !self.group.is_empty() {
            config.groups = self.group.clone();
        }
        if !self.name.is_empty() {
            config.names = self.name.clone();
        }
        if let Some(cmd) = &self.server_cmd {
            config.server.command = cmd.split_whitespace().map(str::to_string).collect();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(timeout) = self.timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if let Some(timeout) = self.readiness_timeout_ms {
            config.server.readiness.timeout_ms = timeout;
        }
        if self.server_logs {
            config.server.inherit_output = true;
        }
        if self.output.is_some() {
            config.output = self.output.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let code = match tokio::runtime::Runtime::new() {
        Ok(rt) => match rt.block_on(async_main(args)) {
            Ok(summary) => summary.exit_code(),
            Err(e) => {
                error!("Test runner error: {}", e);
                eprintln!("Test runner error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            1
        }
    };

    std::process::exit(code);
}

async fn async_main(args: Args) -> HarnessResult<ResultsSummary> {
    let config = args.load_config()?;

    let mut runner = TestRunner::new(Reporter::stdout());
    runner.reporter().banner("crudcheck - Visible Tests");

    scenarios::run(&config, &mut runner).await?;
    let summary = runner.finish();

    if let Some(path) = &config.output {
        summary.write_json(path)?;
    }

    Ok(summary)
}
