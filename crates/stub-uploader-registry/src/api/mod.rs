//! PyPI JSON API response types

use serde::{Deserialize, Serialize};

/// Response of `GET /pypi/<name>/json`; only the fields read here
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectResponse {
    /// Metadata of the latest release
    pub info: ProjectInfo,
}

/// Core metadata of the latest release
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectInfo {
    /// Project name as published
    pub name: String,
    /// Latest version
    pub version: String,
    /// Runtime requirements; PyPI sends `null` when there are none
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
    /// Interpreter constraint
    #[serde(default)]
    pub requires_python: Option<String>,
    /// One-line summary
    #[serde(default)]
    pub summary: Option<String>,
}

impl ProjectInfo {
    /// Runtime requirement strings, empty when none are declared
    pub fn requires_dist(&self) -> &[String] {
        self.requires_dist.as_deref().unwrap_or_default()
    }
}

/// Outcome of looking a project up on the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLookup {
    /// The project exists, with these runtime requirements
    Found(Vec<String>),
    /// The index has no such project
    NotFound,
}

impl ProjectLookup {
    /// Requirements, or `None` for a missing project
    pub fn into_requires_dist(self) -> Option<Vec<String>> {
        match self {
            ProjectLookup::Found(requires_dist) => Some(requires_dist),
            ProjectLookup::NotFound => None,
        }
    }
}

impl From<Option<ProjectResponse>> for ProjectLookup {
    fn from(response: Option<ProjectResponse>) -> Self {
        match response {
            Some(project) => ProjectLookup::Found(project.info.requires_dist().to_vec()),
            None => ProjectLookup::NotFound,
        }
    }
}
