//! Element locators, rendered to Playwright locator expressions

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a scenario addresses an element on the page.
///
/// Mirrors Playwright's user-facing locators so generated scripts read the
/// same as hand-written ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// ARIA role with an optional accessible name
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        exact: bool,
    },

    /// Text content (substring unless `exact`)
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
    },

    /// `data-testid` attribute
    TestId { test_id: String },

    /// Raw CSS selector
    Css { selector: String },

    /// The n-th (0-based) match of `parent`
    Nth { parent: Box<Locator>, index: usize },

    /// Matches of `parent` containing `has_text`
    Filter { parent: Box<Locator>, has_text: String },

    /// Matches of `parent` whose text matches the JavaScript regex `pattern`
    Matching { parent: Box<Locator>, pattern: String },

    /// `child` searched inside `parent`
    Within { parent: Box<Locator>, child: Box<Locator> },
}

impl Locator {
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
        }
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self::role("button", name)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text {
            text: text.into(),
            exact: false,
        }
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Locator::TestId { test_id: id.into() }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css {
            selector: selector.into(),
        }
    }

    /// Require an exact accessible name / text match
    pub fn exact(self) -> Self {
        match self {
            Locator::Role { role, name, .. } => Locator::Role { role, name, exact: true },
            Locator::Text { text, .. } => Locator::Text { text, exact: true },
            other => other,
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Locator::Nth {
            parent: Box::new(self),
            index,
        }
    }

    pub fn has_text(self, text: impl Into<String>) -> Self {
        Locator::Filter {
            parent: Box::new(self),
            has_text: text.into(),
        }
    }

    pub fn matching(self, pattern: impl Into<String>) -> Self {
        Locator::Matching {
            parent: Box::new(self),
            pattern: pattern.into(),
        }
    }

    pub fn within(self, child: Locator) -> Self {
        Locator::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    /// Render as a JavaScript expression evaluated against `root`
    /// (normally `page`)
    pub fn to_js(&self, root: &str) -> String {
        match self {
            Locator::Role { role, name, exact } => match name {
                Some(name) => format!(
                    "{}.getByRole({}, {{ name: {}, exact: {} }})",
                    root,
                    js_string(role),
                    js_string(name),
                    exact
                ),
                None => format!("{}.getByRole({})", root, js_string(role)),
            },
            Locator::Text { text, exact } => {
                format!("{}.getByText({}, {{ exact: {} }})", root, js_string(text), exact)
            }
            Locator::TestId { test_id } => format!("{}.getByTestId({})", root, js_string(test_id)),
            Locator::Css { selector } => format!("{}.locator({})", root, js_string(selector)),
            Locator::Nth { parent, index } => format!("{}.nth({})", parent.to_js(root), index),
            Locator::Filter { parent, has_text } => {
                format!("{}.filter({{ hasText: {} }})", parent.to_js(root), js_string(has_text))
            }
            Locator::Matching { parent, pattern } => format!(
                "{}.filter({{ hasText: new RegExp({}) }})",
                parent.to_js(root),
                js_string(pattern)
            ),
            Locator::Within { parent, child } => child.to_js(&parent.to_js(root)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Role { role, name: Some(name), .. } => write!(f, "role={}[name={:?}]", role, name),
            Locator::Role { role, name: None, .. } => write!(f, "role={}", role),
            Locator::Text { text, .. } => write!(f, "text={:?}", text),
            Locator::TestId { test_id } => write!(f, "testid={}", test_id),
            Locator::Css { selector } => write!(f, "css={}", selector),
            Locator::Nth { parent, index } => write!(f, "{} >> nth={}", parent, index),
            Locator::Filter { parent, has_text } => write!(f, "{} >> has-text={:?}", parent, has_text),
            Locator::Matching { parent, pattern } => write!(f, "{} >> has-text=/{}/", parent, pattern),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
        }
    }
}

/// Quote a string as a JavaScript string literal.
///
/// JSON string syntax is a subset of JS string syntax, so this handles quotes,
/// backslashes and control characters in scenario data.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_locator() {
        assert_eq!(
            Locator::button("login").to_js("page"),
            r#"page.getByRole("button", { name: "login", exact: false })"#
        );
        assert_eq!(
            Locator::button("create").exact().to_js("page"),
            r#"page.getByRole("button", { name: "create", exact: true })"#
        );
    }

    #[test]
    fn test_nested_locators() {
        let entry = Locator::css(".blog").has_text("first title, by first author");
        let like = entry.within(Locator::button("like"));
        assert_eq!(
            like.to_js("page"),
            r#"page.locator(".blog").filter({ hasText: "first title, by first author" }).getByRole("button", { name: "like", exact: false })"#
        );

        assert_eq!(Locator::css(".blog").nth(2).to_js("page"), r#"page.locator(".blog").nth(2)"#);
    }

    #[test]
    fn test_regex_filter() {
        let l = Locator::css(".blog").nth(1).matching(r"\blikes 1(\D|$)");
        assert_eq!(
            l.to_js("page"),
            r#"page.locator(".blog").nth(1).filter({ hasText: new RegExp("\\blikes 1(\\D|$)") })"#
        );
        assert_eq!(l.to_string(), r"css=.blog >> nth=1 >> has-text=/\blikes 1(\D|$)/");
    }

    #[test]
    fn test_scenario_text_is_escaped() {
        let js = Locator::text("it's a \"quote\"\n").to_js("page");
        assert_eq!(js, r#"page.getByText("it's a \"quote\"\n", { exact: false })"#);
    }

    #[test]
    fn test_display() {
        let l = Locator::css(".blog").has_text("a").within(Locator::button("remove"));
        assert_eq!(l.to_string(), r#"css=.blog >> has-text="a" >> role=button[name="remove"]"#);
        assert_eq!(Locator::test_id("username").to_string(), "testid=username");
    }

    #[test]
    fn test_parse_from_yaml() {
        let locator: Locator = serde_yaml::from_str("by: role\nrole: button\nname: login\n").unwrap();
        assert_eq!(locator, Locator::button("login"));

        let locator: Locator = serde_yaml::from_str(
            "by: within\nparent: { by: css, selector: .blog }\nchild: { by: test_id, test_id: likes }\n",
        )
        .unwrap();
        assert_eq!(locator, Locator::css(".blog").within(Locator::test_id("likes")));
    }
}
