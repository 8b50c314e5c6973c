//! Product → release stream → architecture tree used to lay out the dashboard.

use crate::models::catalog::Repository;
use serde::{Deserialize, Serialize};

/// Level of a node in the repository tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Product,
    ReleaseStream,
    Architecture,
}

/// One node of the repository tree.
///
/// Products hold release-stream children plus untagged repositories;
/// release streams hold architecture children only; architectures hold
/// repositories only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    pub id: String,
    pub kind: NodeKind,
    pub children: Vec<HierarchyNode>,
    pub repos: Vec<Repository>,
}

impl HierarchyNode {
    /// All repositories at or below this node, depth first.
    pub fn all_repos(&self) -> Vec<&Repository> {
        let mut out: Vec<&Repository> = self.repos.iter().collect();
        for child in &self.children {
            out.extend(child.all_repos());
        }
        out
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|c| c.name == name)
    }
}
