//! Error types for E2E testing

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Health check for {url} failed after {attempts} attempts")]
    ServerHealthCheck { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npm install @playwright/test && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Whether this error happened before any browser step ran
    pub fn is_setup(&self) -> bool {
        matches!(self, E2eError::Setup(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Why a scenario failed, as reported in results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Reset or seeding failed; no browser step ran
    Setup,
    /// An expectation did not hold, or an action's target never became actionable
    Assertion,
    /// A wait, navigation or the whole scenario ran out of time
    Timeout,
    /// The harness itself failed (browser missing, script crashed)
    Harness,
}

impl From<&E2eError> for FailureKind {
    fn from(err: &E2eError) -> Self {
        match err {
            e if e.is_setup() => FailureKind::Setup,
            E2eError::StepFailed { .. } => FailureKind::Assertion,
            E2eError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::Harness,
        }
    }
}
