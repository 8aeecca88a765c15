//! Playwright browser automation
//!
//! Each scenario becomes one generated node script: a fresh browser context,
//! the steps in order, and a JSON line on stdout per finished step. The Rust
//! side bounds the whole process with the scenario timeout.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult, FailureKind};
use crate::locator::js_string;
use crate::scenario::Scenario;
use crate::step::Step;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub index: usize,
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
}

/// What a driver reports for one scenario run
#[derive(Debug, Clone, Default)]
pub struct ScenarioRun {
    pub steps: Vec<StepResult>,
    pub screenshot_path: Option<PathBuf>,
}

impl ScenarioRun {
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| !s.success)
    }

    /// Every step of `scenario` ran and passed
    pub fn passed(&self, scenario: &Scenario) -> bool {
        self.steps.len() == scenario.steps.len() && self.first_failure().is_none()
    }
}

/// Executes a scenario's steps in a browser
#[async_trait]
pub trait ScenarioDriver: Send + Sync {
    /// Run all steps in order, stopping at the first failure.
    ///
    /// Step failures are reported in the returned run; `Err` is reserved for
    /// the driver itself failing (browser missing, scenario timeout, ...).
    async fn run(&self, scenario: &Scenario) -> E2eResult<ScenarioRun>;
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    pub assertion_timeout_ms: u64,
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub scenario_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            assertion_timeout_ms: 5_000,
            action_timeout_ms: 5_000,
            navigation_timeout_ms: 15_000,
            scenario_timeout_ms: 120_000,
        }
    }
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,

    /// Directory whose `node_modules` provides `@playwright/test`
    project_dir: PathBuf,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig, project_dir: &Path) -> E2eResult<Self> {
        Self::check_playwright_installed(project_dir)?;

        std::fs::create_dir_all(&config.screenshot_dir)?;

        Ok(Self {
            config,
            project_dir: project_dir.to_path_buf(),
        })
    }

    /// Check that node can resolve `@playwright/test` from the project dir
    fn check_playwright_installed(project_dir: &Path) -> E2eResult<()> {
        let status = std::process::Command::new("node")
            .args(["-e", "require.resolve('@playwright/test')"])
            .current_dir(project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Build the Playwright script for a whole scenario
    pub fn build_script(&self, scenario: &Scenario) -> String {
        build_script(&self.config, scenario)
    }

    /// Run the generated script with node and collect step results
    async fn run_script(&self, scenario: &Scenario, script: &str) -> E2eResult<ScenarioRun> {
        // Written next to node_modules so `require` resolves
        let script_file = tempfile::Builder::new()
            .prefix(".bloglist-e2e-")
            .suffix(".cjs")
            .tempfile_in(&self.project_dir)?;
        std::fs::write(script_file.path(), script)?;

        debug!("Running Playwright script: {}", script_file.path().display());

        let child = TokioCommand::new("node")
            .arg(script_file.path())
            .current_dir(&self.project_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let limit = Duration::from_millis(self.config.scenario_timeout_ms);
        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(E2eError::Timeout(format!(
                    "scenario '{}' exceeded {} ms",
                    scenario.name, self.config.scenario_timeout_ms
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = parse_output(&stdout);

        if !output.status.success() && report.run.first_failure().is_none() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Playwright(format!(
                "Script failed before completing a step:\nstdout: {}\nstderr: {}",
                stdout.trim(),
                strip_ansi(stderr.trim())
            )));
        }
        if output.status.success() && !report.completed {
            warn!("Playwright script for '{}' exited without a completion marker", scenario.name);
        }

        Ok(report.run)
    }
}

#[async_trait]
impl ScenarioDriver for PlaywrightHandle {
    async fn run(&self, scenario: &Scenario) -> E2eResult<ScenarioRun> {
        let script = self.build_script(scenario);
        self.run_script(scenario, &script).await
    }
}

const SCRIPT_HEADER: &str = r#"
const { chromium, firefox, webkit, expect } = require('@playwright/test');

const emit = (event) => console.log(JSON.stringify(event));

const step = async (index, name, body) => {
  const started = Date.now();
  try {
    await body();
    emit({ event: 'step', index, name, ok: true, duration_ms: Date.now() - started });
  } catch (error) {
    const message = String((error && error.message) || error);
    emit({ event: 'step', index, name, ok: false, duration_ms: Date.now() - started, error: message });
    throw error;
  }
};
"#;

/// Build the node script for `scenario`
pub fn build_script(config: &PlaywrightConfig, scenario: &Scenario) -> String {
    let mut script = String::from(SCRIPT_HEADER);

    let failure_shot = config.screenshot_dir.join(format!("{}-failure.png", scenario.slug()));

    script.push_str(&format!(
        r#"
(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }},
    baseURL: {base_url}
  }});
  context.setDefaultTimeout({action});
  context.setDefaultNavigationTimeout({navigation});
  const page = await context.newPage();
  let failed = false;

  try {{
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        base_url = js_string(&config.base_url),
        action = config.action_timeout_ms,
        navigation = config.navigation_timeout_ms,
    ));

    for (i, step) in scenario.steps.iter().enumerate() {
        script.push_str(&format!(
            "    await step({}, {}, async () => {{\n{}\n    }});\n",
            i,
            js_string(&step.name()),
            step_to_js(config, step)
        ));
    }

    script.push_str(&format!(
        r#"    emit({{ event: 'done', ok: true }});
  }} catch (error) {{
    failed = true;
    try {{
      await page.screenshot({{ path: {shot}, fullPage: true }});
      emit({{ event: 'screenshot', path: {shot} }});
    }} catch (_) {{}}
    emit({{ event: 'done', ok: false }});
  }} finally {{
    page.removeAllListeners('dialog');
    await context.close();
    await browser.close();
  }}
  process.exit(failed ? 1 : 0);
}})();
"#,
        shot = js_string(&failure_shot.to_string_lossy()),
    ));

    script
}

/// Convert a step to JavaScript code
fn step_to_js(config: &PlaywrightConfig, step: &Step) -> String {
    let assert_timeout = |t: &Option<u64>| t.unwrap_or(config.assertion_timeout_ms);
    let action_timeout = |t: &Option<u64>| t.unwrap_or(config.action_timeout_ms);

    match step {
        Step::Goto { path } => format!("      await page.goto({});", js_string(path)),
        Step::ResetSession => {
            "      await page.evaluate(() => window.localStorage.clear());\n      await page.reload();".to_string()
        }
        Step::Click { locator, timeout_ms } => format!(
            "      await {}.click({{ timeout: {} }});",
            locator.to_js("page"),
            action_timeout(timeout_ms)
        ),
        Step::Fill { locator, value, timeout_ms } => format!(
            "      await {}.fill({}, {{ timeout: {} }});",
            locator.to_js("page"),
            js_string(value),
            action_timeout(timeout_ms)
        ),
        Step::WaitFor { locator, state, timeout_ms } => format!(
            "      await {}.waitFor({{ state: '{}', timeout: {} }});",
            locator.to_js("page"),
            state.as_str(),
            assert_timeout(timeout_ms)
        ),
        Step::ExpectVisible { locator, timeout_ms } => format!(
            "      await expect({}).toBeVisible({{ timeout: {} }});",
            locator.to_js("page"),
            assert_timeout(timeout_ms)
        ),
        Step::ExpectHidden { locator, timeout_ms } => format!(
            "      await expect({}).toBeHidden({{ timeout: {} }});",
            locator.to_js("page"),
            assert_timeout(timeout_ms)
        ),
        Step::ExpectText { locator, contains, timeout_ms } => format!(
            "      await expect({}).toContainText({}, {{ timeout: {} }});",
            locator.to_js("page"),
            js_string(contains),
            assert_timeout(timeout_ms)
        ),
        Step::ExpectCss { locator, property, value, timeout_ms } => format!(
            "      await expect({}).toHaveCSS({}, {}, {{ timeout: {} }});",
            locator.to_js("page"),
            js_string(property),
            js_string(value),
            assert_timeout(timeout_ms)
        ),
        Step::ExpectCount { locator, count, timeout_ms } => format!(
            "      await expect({}).toHaveCount({}, {{ timeout: {} }});",
            locator.to_js("page"),
            count,
            assert_timeout(timeout_ms)
        ),
        Step::HandleDialogs { accept } => {
            let answer = if *accept { "accept" } else { "dismiss" };
            format!(
                "      page.removeAllListeners('dialog');\n      page.on('dialog', (dialog) => dialog.{}());",
                answer
            )
        }
        Step::Screenshot { name } => {
            let path = config.screenshot_dir.join(format!("{}.png", name));
            format!(
                "      await page.screenshot({{ path: {}, fullPage: true }});",
                js_string(&path.to_string_lossy())
            )
        }
        Step::Log { message } => format!("      emit({{ event: 'log', message: {} }});", js_string(message)),
    }
}

/// One JSON line printed by the generated script
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptEvent {
    Step {
        index: usize,
        name: String,
        ok: bool,
        duration_ms: u64,
        #[serde(default)]
        error: Option<String>,
    },
    Log {
        message: String,
    },
    Screenshot {
        path: PathBuf,
    },
    Done {
        ok: bool,
    },
}

#[derive(Debug, Default)]
pub struct ScriptReport {
    pub run: ScenarioRun,
    pub completed: bool,
}

/// Collect step results from the script's stdout, ignoring non-JSON noise
pub fn parse_output(stdout: &str) -> ScriptReport {
    let mut report = ScriptReport::default();

    for line in stdout.lines().map(str::trim).filter(|l| l.starts_with('{')) {
        let event: ScriptEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                debug!("Ignoring script output line ({}): {}", e, line);
                continue;
            }
        };

        match event {
            ScriptEvent::Step { index, name, ok, duration_ms, error } => {
                let error = error.map(|e| strip_ansi(&e));
                let failure = error.as_deref().filter(|_| !ok).map(classify_failure);
                report.run.steps.push(StepResult {
                    index,
                    success: ok,
                    step_name: name,
                    duration_ms,
                    error,
                    failure,
                });
            }
            ScriptEvent::Log { message } => info!("[TEST LOG] {}", message),
            ScriptEvent::Screenshot { path } => report.run.screenshot_path = Some(path),
            ScriptEvent::Done { ok } => report.completed = ok,
        }
    }

    report
}

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));

static EXPECT_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"expect\(.*\)\.(not\.)?to[A-Z]\w*").expect("valid expect regex"));

static ACTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"locator\.(click|fill|press|check)").expect("valid action regex"));

static TIMEOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(timeout \d+ms exceeded|timed out \d+ms|TimeoutError)").expect("valid timeout regex")
});

pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Map a Playwright error message onto the failure taxonomy.
///
/// Failed expectations and actions whose target never became actionable are
/// assertion failures; explicit waits and navigation that ran out of time are
/// timeouts.
pub fn classify_failure(message: &str) -> FailureKind {
    if EXPECT_CALL.is_match(message) || ACTION_CALL.is_match(message) {
        FailureKind::Assertion
    } else if TIMEOUT.is_match(message) {
        FailureKind::Timeout
    } else {
        FailureKind::Assertion
    }
}
