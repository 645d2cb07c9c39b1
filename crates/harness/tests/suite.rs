mod common;

use crudcheck_harness::runner::Reporter;
use crudcheck_harness::scenarios::{self, Group};
use crudcheck_harness::{HarnessConfig, ResultsSummary, TestRunner, TestStatus};

fn sample_config(port: u16, readiness_timeout_ms: u64) -> HarnessConfig {
    let mut config = HarnessConfig::load(&common::sample_app().join("crudcheck.toml"))
        .expect("load sample config");
    config.server = common::placeholder_server(port, readiness_timeout_ms);
    config.request_timeout_ms = 5_000;
    config
}

async fn run(config: &HarnessConfig) -> ResultsSummary {
    let mut runner = TestRunner::new(Reporter::new(Box::new(std::io::sink()), false));
    scenarios::run(config, &mut runner).await.expect("suite runs");
    runner.finish()
}

#[tokio::test]
async fn test_sample_app_passes_everything() {
    let backend = common::spawn_backend(common::sample_app().join("public")).await;
    let config = sample_config(backend.port, 2_000);
    config.validate().unwrap();

    let summary = run(&config).await;

    let failures: Vec<_> = summary
        .tests()
        .iter()
        .filter(|t| !t.passed())
        .map(|t| format!("{}: {}", t.name, t.error.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "{:#?}", failures);
    assert_eq!(summary.total(), 28);
    assert_eq!(summary.score(), 100);
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn test_api_scenarios_fail_when_backend_is_down() {
    let port = common::closed_port().await;
    let mut config = sample_config(port, 300);
    config.groups = vec![Group::Api];

    let summary = run(&config).await;

    assert_eq!(summary.total(), 6);
    assert_eq!(summary.failed(), 6);
    assert_eq!(summary.exit_code(), 1);
    for test in summary.tests() {
        assert_eq!(test.group, "API");
        assert_eq!(test.error.as_deref(), Some("Server failed to start"), "{}", test.name);
    }
}

#[tokio::test]
async fn test_static_groups_never_launch_backend() {
    let port = common::closed_port().await;
    let mut config = sample_config(port, 300);
    config.server.command = vec!["crudcheck-definitely-not-a-program".to_string()];
    config.groups = vec![Group::Structure, Group::Css];

    let summary = run(&config).await;

    assert_eq!(summary.total(), 12);
    assert!(summary.all_passed());
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let backend = common::spawn_backend(common::sample_app().join("public")).await;
    let config = sample_config(backend.port, 2_000);

    let outcome = |summary: &ResultsSummary| {
        summary
            .tests()
            .iter()
            .map(|t| (t.name.clone(), t.status))
            .collect::<Vec<(String, TestStatus)>>()
    };

    let first = run(&config).await;
    let second = run(&config).await;
    assert_eq!(outcome(&first), outcome(&second));
}

#[tokio::test]
async fn test_results_file_is_written() {
    let port = common::closed_port().await;
    let mut config = sample_config(port, 300);
    config.groups = vec![Group::Html];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/results.json");
    run(&config).await.write_json(&path).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["passed"], 5);
    assert_eq!(written["failed"], 0);
    assert_eq!(written["tests"].as_array().unwrap().len(), 5);
    assert_eq!(written["tests"][0]["status"], "passed");
    assert!(written["tests"][0].get("error").is_none());
}
