use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshot of a project on the inventory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub project_name: String,
    pub version_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// License display string as reported by the service.
    pub license: Option<String>,
    pub project_href: String,
    pub version_href: String,
}

/// A single bill-of-materials entry.
///
/// `name` and `version` are optional because the service occasionally
/// reports incomplete records; the walker skips those.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    pub name: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    /// Link back to the component version on the service.
    pub href: Option<String>,
    /// Dependency tree below this component, `None` for flat inventories.
    pub children: Option<Vec<Component>>,
    /// BOM of the project this component stands for (recursive exports).
    #[serde(default)]
    pub contains: Vec<Component>,
}

#[cfg(test)]
impl Component {
    pub fn new(name: &str, version: &str, license: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            license: Some(license.to_string()),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Component>) -> Self {
        self.children = Some(children);
        self
    }
}

impl Component {
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// How the walker treats nested components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Follow nested children as reported by the service.
    Hierarchical,
    /// Every inventory entry is a direct dependency of the project.
    Flat,
}

impl std::fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraversalMode::Hierarchical => write!(f, "hierarchical"),
            TraversalMode::Flat => write!(f, "flat"),
        }
    }
}

/// A project version's component inventory together with the traversal
/// mode the service's data supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bom {
    pub mode: TraversalMode,
    pub components: Vec<Component>,
}

impl Bom {
    pub fn hierarchical(components: Vec<Component>) -> Self {
        Self {
            mode: TraversalMode::Hierarchical,
            components,
        }
    }

    pub fn flat(components: Vec<Component>) -> Self {
        Self {
            mode: TraversalMode::Flat,
            components,
        }
    }
}
