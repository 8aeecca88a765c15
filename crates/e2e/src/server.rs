//! Server management - spawning the app under test and waiting until it answers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running server process
pub struct ServerHandle {
    child: Child,
    name: String,
}

impl ServerHandle {
    /// Spawn a server command and wait for its ready URL
    pub async fn spawn(config: &ServerConfig) -> E2eResult<Self> {
        info!("Spawning {}: {} {}", config.name, config.command, config.args.join(" "));

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args).envs(&config.env);
        if let Some(dir) = &config.cwd {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!("Failed to spawn {} ({}): {}", config.name, config.command, e))
        })?;

        let handle = ServerHandle {
            child,
            name: config.name.clone(),
        };

        wait_until_ready(&config.ready_url, Duration::from_millis(config.startup_timeout_ms)).await?;

        info!("{} is ready at {}", config.name, config.ready_url);
        Ok(handle)
    }

    /// Stop the server
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping {} (pid: {})", self.name, self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Poll `url` until it answers with a non-5xx status or `limit` elapses
pub async fn wait_until_ready(url: &str, limit: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < limit {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                return Ok(());
            }
            Ok(resp) => {
                warn!("Readiness check for {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", url);
                }
                // Connection refused is expected while the server is starting
                if !e.is_connect() {
                    warn!("Readiness check error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    Err(E2eError::ServerHealthCheck {
        url: url.to_string(),
        attempts,
    })
}

/// Configuration for spawning a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Label used in logs
    #[serde(default = "default_name")]
    pub name: String,

    /// Program to run, e.g. `npm`
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// URL polled until the server answers
    pub ready_url: String,

    /// Timeout for server startup
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_ms: u64,
}

fn default_name() -> String {
    "server".to_string()
}

fn default_startup_timeout() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    #[test]
    fn test_parse_server_config() {
        let config: ServerConfig = toml::from_str(
            r#"
name = "backend"
command = "npm"
args = ["run", "start:test"]
cwd = "../bloglist-backend"
ready_url = "http://localhost:3003/api/blogs"

[env]
NODE_ENV = "test"
"#,
        )
        .unwrap();

        assert_eq!(config.args, vec!["run", "start:test"]);
        assert_eq!(config.env.get("NODE_ENV").map(String::as_str), Some("test"));
        assert_eq!(config.startup_timeout_ms, 30_000);
    }

    #[tokio::test]
    async fn test_ready_on_client_error_status() {
        let app = Router::new().route("/", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        wait_until_ready(&format!("http://{}/", addr), Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_not_ready_times_out() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = wait_until_ready(&format!("http://{}/", addr), Duration::from_millis(300))
            .await
            .unwrap_err();
        match err {
            E2eError::ServerHealthCheck { attempts, .. } => assert!(attempts >= 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_missing_binary() {
        let config = ServerConfig {
            name: "frontend".to_string(),
            command: "definitely-not-a-real-binary".to_string(),
            args: vec![],
            cwd: None,
            env: BTreeMap::new(),
            ready_url: "http://127.0.0.1:9/".to_string(),
            startup_timeout_ms: 100,
        };
        assert!(matches!(ServerHandle::spawn(&config).await, Err(E2eError::ServerStartup(_))));
    }
}
