//! Backend lifecycle - spawning, readiness probing and process-group teardown
//!
//! ```text
//! NotStarted -> Launching -> Live | Unresponsive -> Terminated
//! ```
//!
//! The backend runs in its own process group so teardown can signal every
//! process it forked. Teardown happens once, from [`ServerHandle::shutdown`],
//! [`ServerHandle::terminate`] or `Drop`, whichever comes first. The group
//! only gets SIGKILL when the leader is still running after the grace period.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::HarnessError;
use crate::http::{HttpClient, RequestSpec};

/// Per-probe bound, kept short so one hung probe does not eat the readiness budget.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long the group gets to exit after SIGTERM before SIGKILL.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

const EXIT_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    NotStarted,
    Launching,
    Live,
    Unresponsive,
    Terminated,
}

/// Configuration for spawning the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Program followed by its arguments
    pub command: Vec<String>,

    /// Working directory, relative to the project root (None = project root)
    pub working_dir: Option<PathBuf>,

    /// Host the harness connects to
    pub host: String,

    /// Port the backend listens on; exported to it as `PORT`
    pub port: u16,

    /// Path probed for liveness
    pub health_path: String,

    /// Extra environment for the backend
    pub env: BTreeMap<String, String>,

    /// Let the backend write to the harness's stdout/stderr
    pub inherit_output: bool,

    pub readiness: ReadinessPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: vec!["node".to_string(), "server/server.js".to_string()],
            working_dir: None,
            host: "localhost".to_string(),
            port: 3000,
            health_path: "/api/health".to_string(),
            env: BTreeMap::new(),
            inherit_output: false,
            readiness: ReadinessPolicy::default(),
        }
    }
}

/// Readiness polling: warm-up, then exponential backoff up to a deadline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    pub warmup_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            warmup_ms: 250,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

impl ReadinessPolicy {
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delays between probes: doubling from the initial backoff, capped.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        let max = self.max_backoff_ms.max(1);
        let mut next = self.initial_backoff_ms.clamp(1, max);
        std::iter::from_fn(move || {
            let current = next;
            next = next.saturating_mul(2).min(max);
            Some(Duration::from_millis(current))
        })
    }
}

/// Handle to the spawned backend
pub struct ServerHandle {
    child: Option<Child>,
    pid: Option<u32>,
    state: ServerState,
    startup_error: Option<String>,
    host: String,
    port: u16,
}

impl ServerHandle {
    /// Spawn the backend and wait until it is live or readiness gives up.
    ///
    /// Never fails: a spawn error or an unresponsive backend only leaves the
    /// handle in [`ServerState::Unresponsive`] with [`startup_error`](Self::startup_error) set.
    pub async fn launch(config: &ServerConfig, project_root: &Path) -> Self {
        let mut handle = Self {
            child: None,
            pid: None,
            state: ServerState::NotStarted,
            startup_error: None,
            host: config.host.clone(),
            port: config.port,
        };

        handle.state = ServerState::Launching;
        match spawn(config, project_root) {
            Ok(child) => {
                info!("Spawned backend (pid: {}) for port {}", child.id(), config.port);
                handle.pid = Some(child.id());
                handle.child = Some(child);
            }
            Err(e) => {
                warn!("{}", e);
                handle.startup_error = Some(e.to_string());
                handle.state = ServerState::Unresponsive;
                return handle;
            }
        }

        if handle.wait_for_live(config).await {
            info!("Backend is live at http://{}:{}", handle.host, handle.port);
            handle.state = ServerState::Live;
        } else {
            if handle.startup_error.is_none() {
                handle.startup_error = Some(format!(
                    "no healthy response from {} within {:?}",
                    config.health_path,
                    config.readiness.timeout()
                ));
            }
            handle.state = ServerState::Unresponsive;
        }
        handle
    }

    async fn wait_for_live(&mut self, config: &ServerConfig) -> bool {
        let client = match HttpClient::new(PROBE_TIMEOUT) {
            Ok(client) => client,
            Err(e) => {
                self.startup_error = Some(e.to_string());
                return false;
            }
        };
        let probe = RequestSpec::get(&config.host, config.port, &config.health_path);
        let policy = &config.readiness;

        sleep(policy.warmup()).await;

        let deadline = Instant::now() + policy.timeout();
        let mut backoff = policy.backoff();
        let mut attempts = 0usize;

        loop {
            attempts += 1;

            if let Some(status) = self.exit_status() {
                warn!("Backend exited during startup ({})", status);
                self.startup_error = Some(format!("backend exited during startup ({})", status));
                return false;
            }

            match client.send(&probe).await {
                Ok(resp) if resp.status == 200 => return true,
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status);
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for backend to start...");
                    }
                    debug!("Health probe failed: {}", e);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!("Health check failed after {} attempts", attempts);
                return false;
            }
            let delay = backoff.next().unwrap_or(PROBE_TIMEOUT);
            sleep(delay.min(deadline - now)).await;
        }
    }

    fn exit_status(&mut self) -> Option<std::process::ExitStatus> {
        self.child.as_mut().and_then(|c| c.try_wait().ok().flatten())
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// The liveness flag every API scenario checks first
    pub fn is_live(&self) -> bool {
        self.state == ServerState::Live
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn startup_error(&self) -> Option<&str> {
        self.startup_error.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Tear the backend down without blocking the runtime. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some((mut child, signalled)) = self.begin_teardown() {
            let deadline = Instant::now() + SHUTDOWN_GRACE;
            let mut exited = leader_exited(&mut child);
            while signalled && !exited && Instant::now() < deadline {
                sleep(EXIT_POLL).await;
                exited = leader_exited(&mut child);
            }
            self.finish_teardown(child, exited);
        }
    }

    /// Blocking variant of [`shutdown`](Self::shutdown), used from `Drop`.
    pub fn terminate(&mut self) {
        if let Some((mut child, signalled)) = self.begin_teardown() {
            let deadline = Instant::now() + SHUTDOWN_GRACE;
            let mut exited = leader_exited(&mut child);
            while signalled && !exited && Instant::now() < deadline {
                std::thread::sleep(EXIT_POLL);
                exited = leader_exited(&mut child);
            }
            self.finish_teardown(child, exited);
        }
    }

    /// SIGTERM the group. Returns the leader and whether the signal went out.
    fn begin_teardown(&mut self) -> Option<(Child, bool)> {
        if self.state == ServerState::Terminated {
            return None;
        }
        let Some(child) = self.child.take() else {
            self.state = ServerState::Terminated;
            return None;
        };
        info!("Stopping backend (pid: {})", child.id());

        #[cfg(unix)]
        let signalled = match signal_group(child.id(), nix::sys::signal::Signal::SIGTERM) {
            Ok(()) => true,
            Err(e) => {
                debug!("SIGTERM to group {} failed: {}", child.id(), e);
                false
            }
        };
        #[cfg(not(unix))]
        let signalled = false;

        Some((child, signalled))
    }

    /// SIGKILL the group only when the leader outlived the grace period, then reap.
    fn finish_teardown(&mut self, mut child: Child, exited: bool) {
        if !exited {
            warn!("Backend (pid: {}) still running after {:?}, killing", child.id(), SHUTDOWN_GRACE);
            #[cfg(unix)]
            {
                if let Err(e) = signal_group(child.id(), nix::sys::signal::Signal::SIGKILL) {
                    debug!("SIGKILL to group {} failed: {}", child.id(), e);
                }
            }
            let _ = child.kill();
        }
        let _ = child.wait();
        self.state = ServerState::Terminated;
    }
}

fn leader_exited(child: &mut Child) -> bool {
    matches!(child.try_wait(), Ok(Some(_)))
}

#[cfg(unix)]
fn signal_group(leader: u32, signal: nix::sys::signal::Signal) -> nix::Result<()> {
    nix::sys::signal::killpg(nix::unistd::Pid::from_raw(leader as i32), signal)
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn spawn(config: &ServerConfig, project_root: &Path) -> Result<Child, HarnessError> {
    let (program, args) = config
        .command
        .split_first()
        .ok_or_else(|| HarnessError::ServerSpawn("empty server command".to_string()))?;

    let working_dir = match &config.working_dir {
        Some(dir) => project_root.join(dir),
        None => project_root.to_path_buf(),
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&working_dir)
        .env("PORT", config.port.to_string())
        .envs(&config.env)
        .stdin(Stdio::null());

    if config.inherit_output {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.spawn()
        .map_err(|e| HarnessError::ServerSpawn(format!("Failed to spawn {}: {}", program, e)))
}
