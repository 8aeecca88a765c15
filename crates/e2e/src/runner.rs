//! Scenario runner: reset the backend, drive the browser, collect results

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::backend::BackendClient;
use crate::catalog;
use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult, FailureKind};
use crate::playwright::{PlaywrightHandle, ScenarioDriver, StepResult};
use crate::scenario::{ensure_unique_names, Scenario};
use crate::server::ServerHandle;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: HarnessConfig,
    backend: BackendClient,
    driver: Box<dyn ScenarioDriver>,

    /// Servers started by the runner, stopped on drop
    servers: Vec<ServerHandle>,
}

impl TestRunner {
    /// Create a runner that drives Playwright from `project_dir`
    pub fn new(config: HarnessConfig) -> E2eResult<Self> {
        config.validate()?;
        let driver = PlaywrightHandle::new(config.playwright(), &config.browser.project_dir)?;
        Self::with_driver(config, Box::new(driver))
    }

    /// Create a runner with a custom driver
    pub fn with_driver(config: HarnessConfig, driver: Box<dyn ScenarioDriver>) -> E2eResult<Self> {
        let backend = BackendClient::new(
            &config.backend_url,
            Duration::from_millis(config.timeouts.request_ms),
        )?;
        Ok(Self {
            config,
            backend,
            driver,
            servers: Vec::new(),
        })
    }

    /// Start configured backend and front-end commands
    pub async fn start_servers(&mut self) -> E2eResult<()> {
        if !self.servers.is_empty() {
            return Ok(()); // Already running
        }

        for server in [&self.config.backend_server, &self.config.frontend_server]
            .into_iter()
            .flatten()
        {
            let handle = ServerHandle::spawn(server).await?;
            self.servers.push(handle);
        }
        Ok(())
    }

    /// Stop any servers this runner started
    pub fn stop_servers(&mut self) -> E2eResult<()> {
        for mut server in self.servers.drain(..) {
            server.stop()?;
        }
        Ok(())
    }

    pub fn scenarios(&self) -> E2eResult<Vec<Scenario>> {
        load_scenarios(&self.config)
    }

    /// Run every known scenario
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let scenarios = self.scenarios()?;
        Ok(self.run_scenarios(&scenarios).await)
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let scenarios: Vec<Scenario> = self
            .scenarios()?
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect();
        Ok(self.run_scenarios(&scenarios).await)
    }

    /// Run a specific scenario by name
    pub async fn run_named(&self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenario = self
            .scenarios()?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        Ok(self.run_scenarios(std::slice::from_ref(&scenario)).await)
    }

    /// Run scenarios one after another. A failing scenario never stops the
    /// ones after it.
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!("Test Results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        TestSuiteResult {
            started_at,
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Reset backend state, seed users, then run the scenario's steps
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let failed = |err: E2eError, steps: Vec<StepResult>| ScenarioResult {
            name: scenario.name.clone(),
            success: false,
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            failure: Some(FailureKind::from(&err)),
            error: Some(err.to_string()),
            screenshot_path: None,
        };

        if let Err(e) = self
            .backend
            .prepare(&self.config.seed_user, &scenario.extra_users)
            .await
        {
            return failed(e, Vec::new());
        }

        let run = match self.driver.run(scenario).await {
            Ok(run) => run,
            Err(e) => return failed(e, Vec::new()),
        };

        let (failure, error) = match run.first_failure() {
            Some(step) => {
                let err = E2eError::StepFailed {
                    step: format!("#{} {}", step.index + 1, step.step_name),
                    reason: step.error.clone().unwrap_or_else(|| "unknown error".to_string()),
                };
                (Some(step.failure.unwrap_or(FailureKind::Assertion)), Some(err.to_string()))
            }
            None if !run.passed(scenario) => (
                Some(FailureKind::Harness),
                Some(format!(
                    "only {} of {} steps reported",
                    run.steps.len(),
                    scenario.steps.len()
                )),
            ),
            None => (None, None),
        };

        ScenarioResult {
            name: scenario.name.clone(),
            success: error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: run.steps,
            failure,
            error,
            screenshot_path: run.screenshot_path,
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Built-in scenarios followed by YAML scenarios from `specs_dir`
pub fn load_scenarios(config: &HarnessConfig) -> E2eResult<Vec<Scenario>> {
    let mut scenarios = catalog::builtin(&config.seed_user)?;
    if let Some(dir) = &config.specs_dir {
        scenarios.extend(Scenario::load_all(dir)?);
    }
    ensure_unique_names(&scenarios)?;
    Ok(scenarios)
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_servers();
    }
}
