//! Scenarios: an isolated sequence of steps run against freshly reset state

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};
use crate::model::SeedUser;
use crate::step::Step;

/// A complete scenario, built in code or parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Users created in addition to the configured seed user
    #[serde(default)]
    pub extra_users: Vec<SeedUser>,

    /// Steps to execute in order
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            extra_users: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_user(mut self, user: SeedUser) -> Self {
        self.extra_users.push(user);
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        if scenario.name.trim().is_empty() {
            return Err(E2eError::ScenarioParse("scenario name must not be empty".to_string()));
        }
        if scenario.steps.is_empty() {
            return Err(E2eError::ScenarioParse(format!("scenario '{}' has no steps", scenario.name)));
        }
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// File-system friendly version of the name
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_matches('-').to_string()
    }
}

/// Reject duplicate names so `--scenario` selection stays unambiguous, and
/// names whose slugs collide or are empty so failure screenshots never
/// overwrite each other
pub fn ensure_unique_names(scenarios: &[Scenario]) -> E2eResult<()> {
    let mut slugs = std::collections::HashMap::new();
    for s in scenarios {
        let slug = s.slug();
        if slug.is_empty() {
            return Err(E2eError::ScenarioParse(format!(
                "scenario name '{}' needs at least one letter or digit",
                s.name
            )));
        }
        if let Some(other) = slugs.insert(slug, s.name.as_str()) {
            let reason = if other == s.name {
                format!("duplicate scenario name '{}'", s.name)
            } else {
                format!("scenario names '{}' and '{}' share a file name", other, s.name)
            };
            return Err(E2eError::ScenarioParse(reason));
        }
    }
    Ok(())
}
