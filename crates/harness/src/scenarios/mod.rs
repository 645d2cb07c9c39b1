//! Scenario catalog and suite orchestration
//!
//! The catalog is a fixed, ordered list grouped as Structure, HTML, CSS,
//! JavaScript and API. Static scenarios only read the project tree; API
//! scenarios only talk to the backend. Neither kind mutates anything another
//! scenario reads, so any subset runs with the same per-scenario outcome.

mod api;
mod markup;
mod script;
mod structure;
mod styling;

use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{HarnessConfig, ProjectLayout};
use crate::error::HarnessResult;
use crate::http::{HttpClient, RequestSpec, ResponseRecord};
use crate::project::Project;
use crate::runner::TestRunner;
use crate::server::ServerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Structure,
    Html,
    Css,
    #[value(name = "javascript")]
    JavaScript,
    Api,
}

impl Group {
    pub const ALL: [Group; 5] = [Group::Structure, Group::Html, Group::Css, Group::JavaScript, Group::Api];

    pub fn label(&self) -> &'static str {
        match self {
            Group::Structure => "Structure",
            Group::Html => "HTML",
            Group::Css => "CSS",
            Group::JavaScript => "JavaScript",
            Group::Api => "API",
        }
    }
}

/// Inputs for scenarios that only inspect files
pub struct StaticContext {
    pub project: Project,
    pub layout: ProjectLayout,
}

/// Inputs for scenarios that talk to the backend
pub struct ApiContext {
    pub client: HttpClient,
    pub host: String,
    pub port: u16,
    /// Outcome of the health probe; checked first by every API scenario
    pub live: bool,
}

impl ApiContext {
    pub fn for_server(client: HttpClient, server: &ServerHandle) -> Self {
        Self {
            client,
            host: server.host().to_string(),
            port: server.port(),
            live: server.is_live(),
        }
    }

    pub fn get(&self, path: &str) -> RequestSpec {
        RequestSpec::get(&self.host, self.port, path)
    }

    pub fn post(&self, path: &str) -> RequestSpec {
        RequestSpec::post(&self.host, self.port, path)
    }

    pub async fn send(&self, spec: RequestSpec) -> HarnessResult<ResponseRecord> {
        self.client.send(&spec).await
    }
}

pub type StaticCheck = fn(&StaticContext) -> HarnessResult<()>;
pub type ApiCheck = for<'a> fn(&'a ApiContext) -> BoxFuture<'a, HarnessResult<()>>;

#[derive(Clone, Copy)]
pub enum Check {
    Static(StaticCheck),
    Api(ApiCheck),
}

/// One independently named check
#[derive(Clone)]
pub struct Scenario {
    pub name: String,
    pub group: Group,
    pub check: Check,
}

impl Scenario {
    pub(crate) fn file(group: Group, name: impl Into<String>, check: StaticCheck) -> Self {
        Self { name: name.into(), group, check: Check::Static(check) }
    }

    pub(crate) fn api(name: impl Into<String>, check: ApiCheck) -> Self {
        Self { name: name.into(), group: Group::Api, check: Check::Api(check) }
    }

    pub fn needs_server(&self) -> bool {
        matches!(self.check, Check::Api(_))
    }
}

/// The full catalog, in run order
pub fn catalog(layout: &ProjectLayout) -> Vec<Scenario> {
    let mut scenarios = structure::scenarios(layout);
    scenarios.extend(markup::scenarios());
    scenarios.extend(styling::scenarios());
    scenarios.extend(script::scenarios());
    scenarios.extend(api::scenarios());
    scenarios
}

/// Narrow the catalog by group and by name; empty filters select everything.
pub fn select(scenarios: Vec<Scenario>, groups: &[Group], names: &[String]) -> Vec<Scenario> {
    scenarios
        .into_iter()
        .filter(|s| groups.is_empty() || groups.contains(&s.group))
        .filter(|s| names.is_empty() || names.iter().any(|n| n == &s.name))
        .collect()
}

/// Run the selected scenarios in catalog order.
///
/// The backend is launched right before the first API scenario and is
/// terminated once every scenario has run.
pub async fn run(config: &HarnessConfig, runner: &mut TestRunner) -> HarnessResult<()> {
    let scenarios = select(catalog(&config.layout), &config.groups, &config.names);
    if scenarios.is_empty() {
        warn!("No scenarios match the selected groups and names");
    }

    let client = HttpClient::new(config.request_timeout())?;
    let static_ctx = StaticContext {
        project: Project::new(&config.project_root),
        layout: config.layout.clone(),
    };

    let mut server: Option<ServerHandle> = None;
    let mut api_ctx: Option<ApiContext> = None;
    let mut current_group: Option<Group> = None;

    for scenario in &scenarios {
        if current_group != Some(scenario.group) {
            if current_group.is_some() {
                runner.reporter().blank();
            }
            runner.reporter().section(&format!("{} Tests:", scenario.group.label()));
            current_group = Some(scenario.group);
        }

        match scenario.check {
            Check::Static(check) => {
                runner
                    .run_scenario(&scenario.name, scenario.group.label(), async {
                        check(&static_ctx)
                    })
                    .await;
            }
            Check::Api(check) => {
                if api_ctx.is_none() {
                    let handle = ServerHandle::launch(&config.server, static_ctx.project.root()).await;
                    if !handle.is_live() {
                        let reason = handle.startup_error().unwrap_or("backend is not responding");
                        runner.reporter().notice(&format!("Server startup failed: {}", reason));
                    }
                    api_ctx = Some(ApiContext::for_server(client.clone(), &handle));
                    server = Some(handle);
                }
                if let Some(ctx) = &api_ctx {
                    runner
                        .run_scenario(&scenario.name, scenario.group.label(), check(ctx))
                        .await;
                }
            }
        }
    }

    if let Some(mut handle) = server.take() {
        handle.shutdown().await;
        info!("Backend terminated");
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Helpers shared by the scenario groups
// ----------------------------------------------------------------------------

pub(crate) fn is_match(pattern: &str, text: &str) -> HarnessResult<bool> {
    Ok(Regex::new(pattern)?.is_match(text))
}

pub(crate) fn count_matches(pattern: &str, text: &str) -> HarnessResult<usize> {
    Ok(Regex::new(pattern)?.find_iter(text).count())
}

/// Loose truthiness for JSON values pulled out of project files
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_order_and_groups() {
        let scenarios = catalog(&ProjectLayout::default());
        assert_eq!(scenarios.len(), 28);

        let mut seen = Vec::new();
        for s in &scenarios {
            if seen.last() != Some(&s.group) {
                seen.push(s.group);
            }
        }
        assert_eq!(seen, Group::ALL.to_vec());
        assert!(scenarios.iter().all(|s| s.needs_server() == (s.group == Group::Api)));
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let scenarios = catalog(&ProjectLayout::default());
        let mut names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_select_filters() {
        let all = catalog(&ProjectLayout::default());

        let css = select(all.clone(), &[Group::Css], &[]);
        assert_eq!(css.len(), 4);
        assert!(css.iter().all(|s| s.group == Group::Css));

        let one = select(all.clone(), &[], &["API returns 404 for unknown endpoints".to_string()]);
        assert_eq!(one.len(), 1);
        assert!(one[0].needs_server());

        assert!(select(all, &[Group::Html], &["API returns 404 for unknown endpoints".to_string()]).is_empty());
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(Some(&json!("node server/server.js"))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(None));
    }
}
