//! Scenario steps

use serde::{Deserialize, Serialize};

use crate::locator::Locator;

/// A single step in a scenario.
///
/// Steps run strictly in order inside one browser page. Every wait and
/// expectation is bounded: `timeout_ms` overrides the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the front-end URL
    Goto {
        #[serde(default = "default_path")]
        path: String,
    },

    /// Clear stored credentials and load the page again
    ResetSession,

    /// Click an element
    Click {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input field
    Fill {
        locator: Locator,
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait for an element to reach a state
    WaitFor {
        locator: Locator,
        #[serde(default)]
        state: WaitState,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    ExpectVisible {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Element is hidden or not rendered at all
    ExpectHidden {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Element text contains a substring
    ExpectText {
        locator: Locator,
        contains: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Computed style property equals a value
    ExpectCss {
        locator: Locator,
        property: String,
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Number of matching elements. `count: 0` means absent from the DOM.
    ExpectCount {
        locator: Locator,
        count: usize,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Register a handler that answers every dialog for the rest of the scenario
    HandleDialogs {
        #[serde(default = "default_accept")]
        accept: bool,
    },

    /// Take a screenshot
    Screenshot { name: String },

    /// Log a message (for debugging)
    Log { message: String },
}

fn default_path() -> String {
    "/".to_string()
}

fn default_accept() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl Step {
    /// Short name used in logs and reports
    pub fn name(&self) -> String {
        match self {
            Step::Goto { path } => format!("goto:{}", path),
            Step::ResetSession => "reset-session".to_string(),
            Step::Click { locator, .. } => format!("click:{}", locator),
            Step::Fill { locator, .. } => format!("fill:{}", locator),
            Step::WaitFor { locator, state, .. } => format!("wait-for:{}:{}", locator, state.as_str()),
            Step::ExpectVisible { locator, .. } => format!("expect-visible:{}", locator),
            Step::ExpectHidden { locator, .. } => format!("expect-hidden:{}", locator),
            Step::ExpectText { locator, contains, .. } => format!("expect-text:{}:{:?}", locator, contains),
            Step::ExpectCss { locator, property, value, .. } => {
                format!("expect-css:{}:{}={}", locator, property, value)
            }
            Step::ExpectCount { locator, count, .. } => format!("expect-count:{}:{}", locator, count),
            Step::HandleDialogs { accept } => {
                format!("handle-dialogs:{}", if *accept { "accept" } else { "dismiss" })
            }
            Step::Screenshot { name } => format!("screenshot:{}", name),
            Step::Log { message } => format!("log:{}", message.chars().take(30).collect::<String>()),
        }
    }

    pub fn click(locator: Locator) -> Self {
        Step::Click { locator, timeout_ms: None }
    }

    pub fn fill(locator: Locator, value: impl Into<String>) -> Self {
        Step::Fill {
            locator,
            value: value.into(),
            timeout_ms: None,
        }
    }

    pub fn wait_for(locator: Locator) -> Self {
        Step::WaitFor {
            locator,
            state: WaitState::Visible,
            timeout_ms: None,
        }
    }

    pub fn expect_visible(locator: Locator) -> Self {
        Step::ExpectVisible { locator, timeout_ms: None }
    }

    pub fn expect_hidden(locator: Locator) -> Self {
        Step::ExpectHidden { locator, timeout_ms: None }
    }

    pub fn expect_text(locator: Locator, contains: impl Into<String>) -> Self {
        Step::ExpectText {
            locator,
            contains: contains.into(),
            timeout_ms: None,
        }
    }

    pub fn expect_css(locator: Locator, property: impl Into<String>, value: impl Into<String>) -> Self {
        Step::ExpectCss {
            locator,
            property: property.into(),
            value: value.into(),
            timeout_ms: None,
        }
    }

    pub fn expect_count(locator: Locator, count: usize) -> Self {
        Step::ExpectCount {
            locator,
            count,
            timeout_ms: None,
        }
    }

    /// Set an explicit timeout on steps that support one
    pub fn with_timeout(mut self, ms: u64) -> Self {
        match &mut self {
            Step::Click { timeout_ms, .. }
            | Step::Fill { timeout_ms, .. }
            | Step::WaitFor { timeout_ms, .. }
            | Step::ExpectVisible { timeout_ms, .. }
            | Step::ExpectHidden { timeout_ms, .. }
            | Step::ExpectText { timeout_ms, .. }
            | Step::ExpectCss { timeout_ms, .. }
            | Step::ExpectCount { timeout_ms, .. } => *timeout_ms = Some(ms),
            _ => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let yaml = r#"
- action: goto
- action: click
  locator: { by: role, role: button, name: login }
- action: fill
  locator: { by: test_id, test_id: username }
  value: john
- action: expect_css
  locator: { by: css, selector: .error }
  property: border-style
  value: solid
  timeout_ms: 2000
- action: handle_dialogs
"#;
        let steps: Vec<Step> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step::Goto { path: "/".to_string() });
        assert_eq!(steps[1], Step::click(Locator::button("login")));
        assert_eq!(
            steps[3],
            Step::expect_css(Locator::css(".error"), "border-style", "solid").with_timeout(2000)
        );
        assert_eq!(steps[4], Step::HandleDialogs { accept: true });
    }

    #[test]
    fn test_step_names() {
        assert_eq!(Step::click(Locator::button("like")).name(), r#"click:role=button[name="like"]"#);
        assert_eq!(
            Step::expect_count(Locator::button("remove"), 0).name(),
            r#"expect-count:role=button[name="remove"]:0"#
        );
        let long = Step::Log { message: "x".repeat(100) };
        assert_eq!(long.name().len(), "log:".len() + 30);
    }

    #[test]
    fn test_with_timeout_ignores_untimed_steps() {
        let step = Step::Goto { path: "/".to_string() }.with_timeout(10);
        assert_eq!(step, Step::Goto { path: "/".to_string() });
    }
}
