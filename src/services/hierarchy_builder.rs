//! Groups product repositories into a product → release stream → architecture tree.
//!
//! Grouping keys compare with exact equality: `"6Server"` and `"6server"` are
//! separate release streams. Groups appear in the order their key was first
//! seen among the product's repositories.

use crate::models::catalog::{Organization, Product, Repository};
use crate::models::hierarchy::{HierarchyNode, NodeKind};

/// Insertion-ordered grouping of values by an exact key.
struct OrderedGroups<'a, T> {
    groups: Vec<(&'a str, Vec<T>)>,
}

impl<'a, T> OrderedGroups<'a, T> {
    fn new() -> Self {
        Self { groups: Vec::new() }
    }

    fn push(&mut self, key: &'a str, value: T) {
        match self.groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.groups.push((key, vec![value])),
        }
    }

    fn into_groups(self) -> Vec<(&'a str, Vec<T>)> {
        self.groups
    }
}

/// Build one tree per product, in input order.
///
/// Only repositories in the organization's locker scope are placed.
/// Products are not filtered; callers that want syncable products only
/// filter beforehand.
pub fn build(products: &[Product], organization: &Organization) -> Vec<HierarchyNode> {
    products
        .iter()
        .map(|product| build_product(product, organization))
        .collect()
}

fn build_product(product: &Product, organization: &Organization) -> HierarchyNode {
    let mut untagged: Vec<Repository> = Vec::new();
    let mut streams: OrderedGroups<&Repository> = OrderedGroups::new();

    for repo in product.locker_repositories(organization) {
        match repo.minor.as_deref() {
            Some(minor) => streams.push(minor, repo),
            None => untagged.push(repo.clone()),
        }
    }

    let children = streams
        .into_groups()
        .into_iter()
        .map(|(minor, repos)| build_release_stream(product.id, minor, repos))
        .collect();

    HierarchyNode {
        name: product.name.clone(),
        id: product.id.to_string(),
        kind: NodeKind::Product,
        children,
        repos: untagged,
    }
}

fn build_release_stream(product_id: i64, minor: &str, repos: Vec<&Repository>) -> HierarchyNode {
    let stream_id = format!("{}-{}", product_id, minor);

    let mut arches: OrderedGroups<&Repository> = OrderedGroups::new();
    for repo in repos {
        arches.push(repo.arch.as_str(), repo);
    }

    let children = arches
        .into_groups()
        .into_iter()
        .map(|(arch, repos)| HierarchyNode {
            name: arch.to_string(),
            id: format!("{}-{}", stream_id, arch),
            kind: NodeKind::Architecture,
            children: Vec::new(),
            repos: repos.into_iter().cloned().collect(),
        })
        .collect();

    HierarchyNode {
        name: minor.to_string(),
        id: stream_id,
        kind: NodeKind::ReleaseStream,
        children,
        repos: Vec::new(),
    }
}
