//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};
use crate::model::SeedUser;
use crate::playwright::{Browser, PlaywrightConfig};
use crate::server::ServerConfig;

/// Top-level harness configuration, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Where the front-end is served
    pub frontend_url: String,

    /// Where the REST API (including `/api/testing`) is served
    pub backend_url: String,

    /// User seeded before every scenario
    pub seed_user: SeedUser,

    /// Browser settings
    pub browser: BrowserConfig,

    /// Timeouts
    pub timeouts: TimeoutConfig,

    /// Directory with extra YAML scenarios
    pub specs_dir: Option<PathBuf>,

    /// Output directory for results and failure screenshots
    pub output_dir: PathBuf,

    /// Optional commands to start the app under test
    pub backend_server: Option<ServerConfig>,
    pub frontend_server: Option<ServerConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            backend_url: "http://localhost:3003".to_string(),
            seed_user: SeedUser::primary(),
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            specs_dir: None,
            output_dir: PathBuf::from("test-results"),
            backend_server: None,
            frontend_server: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Directory whose `node_modules` provides `@playwright/test`
    pub project_dir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            project_dir: PathBuf::from("."),
        }
    }
}

/// All timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound for every assertion and explicit wait
    pub assertion_ms: u64,

    /// Bound for clicks and fills
    pub action_ms: u64,

    /// Bound for page navigation
    pub navigation_ms: u64,

    /// Hard bound for a whole scenario, browser launch included
    pub scenario_ms: u64,

    /// Bound for each testing API request
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            assertion_ms: 5_000,
            action_ms: 5_000,
            navigation_ms: 15_000,
            scenario_ms: 120_000,
            request_ms: 10_000,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make every scenario fail for reasons
    /// unrelated to the app
    pub fn validate(&self) -> E2eResult<()> {
        for (name, url) in [("frontend_url", &self.frontend_url), ("backend_url", &self.backend_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(E2eError::Config(format!("{} must be an http(s) URL, got '{}'", name, url)));
            }
        }

        let t = &self.timeouts;
        if t.assertion_ms == 0 || t.action_ms == 0 || t.navigation_ms == 0 || t.request_ms == 0 {
            return Err(E2eError::Config("timeouts must be non-zero".to_string()));
        }
        if t.scenario_ms <= t.navigation_ms {
            return Err(E2eError::Config(format!(
                "scenario timeout ({} ms) must exceed navigation timeout ({} ms)",
                t.scenario_ms, t.navigation_ms
            )));
        }

        if self.seed_user.username.is_empty() || self.seed_user.password.is_empty() {
            return Err(E2eError::Config("seed user needs a username and password".to_string()));
        }

        Ok(())
    }

    /// Playwright settings derived from this configuration
    pub fn playwright(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            base_url: self.frontend_url.trim_end_matches('/').to_string(),
            screenshot_dir: self.output_dir.join("screenshots"),
            viewport_width: self.browser.viewport_width,
            viewport_height: self.browser.viewport_height,
            browser: self.browser.browser,
            headless: self.browser.headless,
            assertion_timeout_ms: self.timeouts.assertion_ms,
            action_timeout_ms: self.timeouts.action_ms,
            navigation_timeout_ms: self.timeouts.navigation_ms,
            scenario_timeout_ms: self.timeouts.scenario_ms,
        }
    }
}
