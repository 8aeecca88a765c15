//! Bloglist E2E Test Harness
//!
//! This crate drives acceptance tests for the bloglist app from Rust:
//! - Resets the backend through its testing API before every scenario
//! - Seeds the users a scenario needs
//! - Generates one Playwright script per scenario and runs it with node
//! - Collects per-step results into a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Bloglist E2E Runner (Rust)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_servers() -> [ServerHandle]     (optional)     │
//! │    └── run_scenario(scenario) -> ScenarioResult             │
//! │          ├── BackendClient::prepare()  reset + seed users   │
//! │          └── ScenarioDriver::run()     Playwright via node  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (built-in catalog or YAML)                        │
//! │    ├── name, tags, extra_users                              │
//! │    └── steps: [Step]                                        │
//! │          ├── goto / reset_session                           │
//! │          ├── click / fill { locator }                       │
//! │          ├── wait_for { locator, state, timeout_ms }        │
//! │          ├── expect_visible / expect_hidden                 │
//! │          ├── expect_text / expect_css / expect_count        │
//! │          └── handle_dialogs { accept }                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  helpers: login_with, create_blog, like, remove, ...        │
//! │  model:   SeedUser, BlogEntry, BlogList, Notification       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod helpers;
pub mod locator;
pub mod model;
pub mod playwright;
pub mod runner;
pub mod scenario;
pub mod server;
pub mod step;

pub use config::HarnessConfig;
pub use error::{E2eError, E2eResult, FailureKind};
pub use locator::Locator;
pub use runner::{ScenarioResult, TestRunner, TestSuiteResult};
pub use scenario::Scenario;
pub use step::Step;
