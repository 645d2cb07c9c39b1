//! crudcheck verification harness
//!
//! This crate checks a single-resource CRUD web project end to end:
//! - Inspects the project tree for structural, markup, styling and script conventions
//! - Spawns the backend in its own process group and probes it for liveness
//! - Issues API requests and asserts on status codes and JSON shapes
//! - Records every scenario and reports a score plus an exit code
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Suite (scenarios::run)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  catalog() -> [Scenario]                                    │
//! │    ├── Structure / HTML / CSS / JavaScript  (Project)       │
//! │    └── API                                  (ApiContext)    │
//! │                                                             │
//! │  ServerHandle::launch()   NotStarted -> Launching           │
//! │                           -> Live | Unresponsive            │
//! │                           -> Terminated (killpg, once)      │
//! │                                                             │
//! │  TestRunner::run_scenario(name, future) -> TestResult       │
//! │    └── ensure(cond, msg)  /  HttpClient::send(RequestSpec)  │
//! │                                                             │
//! │  TestRunner::finish() -> ResultsSummary -> exit code        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assert;
pub mod config;
pub mod error;
pub mod http;
pub mod project;
pub mod runner;
pub mod scenarios;
pub mod server;

pub use assert::{ensure, ensure_status};
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use http::{HttpClient, ParsedBody, RequestSpec, ResponseRecord};
pub use runner::{ResultsSummary, TestResult, TestRunner, TestStatus};
pub use server::{ServerHandle, ServerState};
