//! Category facets and the category tree.
//!
//! The backend returns category counts as a flat list where each entry may
//! point at its parent. The tree is rebuilt from that list on every response.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::facet::{first_label, normalize_count, value_to_key};
use crate::ids::CategoryId;

/// A category aggregation record after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFacet {
    /// Category identifier.
    pub id: CategoryId,
    /// Display label.
    pub label: String,
    /// Number of matching products.
    pub count: u64,
    /// Declared parent category, if any.
    pub parent_id: Option<CategoryId>,
}

impl CategoryFacet {
    /// Create a root facet.
    pub fn new(id: impl Into<CategoryId>, label: impl Into<String>, count: u64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            count,
            parent_id: None,
        }
    }

    /// Set the parent category.
    pub fn with_parent(mut self, parent_id: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCategoryFacet {
    id: Option<Value>,
    key: Option<Value>,
    label: Option<String>,
    name: Option<String>,
    title: Option<String>,
    #[serde(alias = "docCount", alias = "productCount")]
    count: Option<f64>,
    #[serde(alias = "parent_id", alias = "parentKey")]
    parent_id: Option<Value>,
}

/// Normalize raw category aggregation entries.
///
/// Entries missing both an id and a label are dropped. When only one of the
/// two is present it stands in for the other. Unparseable entries are logged
/// and skipped; nothing here fails.
pub fn normalize_category_facets(raw: &[Value]) -> Vec<CategoryFacet> {
    raw.iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let parsed: RawCategoryFacet = match serde_json::from_value(entry.clone()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(position, error = %e, "skipping unparseable category facet");
                    return None;
                }
            };

            let id = [&parsed.id, &parsed.key]
                .into_iter()
                .flatten()
                .find_map(value_to_key);
            let label = first_label([&parsed.label, &parsed.name, &parsed.title]);

            let (id, label) = match (id, label) {
                (Some(id), Some(label)) => (id, label),
                (Some(id), None) => (id.clone(), id),
                (None, Some(label)) => (label.clone(), label),
                (None, None) => {
                    debug!(position, "dropping category facet without id or label");
                    return None;
                }
            };

            Some(CategoryFacet {
                id: CategoryId::new(id),
                label,
                count: normalize_count(parsed.count),
                parent_id: parsed
                    .parent_id
                    .as_ref()
                    .and_then(value_to_key)
                    .map(CategoryId::new),
            })
        })
        .collect()
}

/// A node of the rebuilt category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTreeNode {
    pub id: CategoryId,
    pub label: String,
    pub count: u64,
    /// Parent this node was attached to; `None` for roots, orphans included.
    pub parent_id: Option<CategoryId>,
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    /// Leaf categories are the only directly selectable ones.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(CategoryTreeNode::subtree_len).sum::<usize>()
    }
}

struct Slot<'a> {
    facet: &'a CategoryFacet,
    position: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Whether hanging `child` under `parent` would close a loop.
///
/// Walks the already-attached ancestors of `parent`. The walk is bounded by
/// the slot count so a corrupted chain cannot spin forever.
fn closes_cycle(slots: &[Slot<'_>], child: usize, parent: usize) -> bool {
    let mut current = Some(parent);
    let mut steps = 0;
    while let Some(idx) = current {
        if idx == child || steps > slots.len() {
            return true;
        }
        current = slots[idx].parent;
        steps += 1;
    }
    false
}

fn compare_slots(slots: &[Slot<'_>], a: usize, b: usize) -> Ordering {
    slots[a]
        .position
        .cmp(&slots[b].position)
        .then_with(|| slots[a].facet.label.cmp(&slots[b].facet.label))
}

fn materialize(slots: &[Slot<'_>], idx: usize) -> CategoryTreeNode {
    let slot = &slots[idx];
    let mut children = slot.children.clone();
    children.sort_by(|&a, &b| compare_slots(slots, a, b));

    CategoryTreeNode {
        id: slot.facet.id.clone(),
        label: slot.facet.label.clone(),
        count: slot.facet.count,
        parent_id: slot.parent.map(|p| slots[p].facet.id.clone()),
        children: children
            .into_iter()
            .map(|child| materialize(slots, child))
            .collect(),
    }
}

/// Build a category tree from flat facets.
///
/// Siblings keep the order the backend sent them in, with ties broken by
/// label. A facet whose parent is absent from the list becomes a root. A
/// parent link that would form a cycle (a facet naming itself, or `a -> b ->
/// a`) is refused and the facet becomes a root instead. Duplicate ids keep
/// their first occurrence.
pub fn build_category_tree(facets: &[CategoryFacet]) -> Vec<CategoryTreeNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(facets.len());
    let mut slots: Vec<Slot<'_>> = Vec::with_capacity(facets.len());

    for (position, facet) in facets.iter().enumerate() {
        if index.contains_key(facet.id.as_str()) {
            debug!(id = %facet.id, "ignoring duplicate category facet");
            continue;
        }
        index.insert(facet.id.as_str(), slots.len());
        slots.push(Slot {
            facet,
            position,
            parent: None,
            children: Vec::new(),
        });
    }

    for child in 0..slots.len() {
        let Some(parent_id) = slots[child].facet.parent_id.as_ref() else {
            continue;
        };
        let Some(&parent) = index.get(parent_id.as_str()) else {
            continue;
        };
        if closes_cycle(&slots, child, parent) {
            warn!(
                id = %slots[child].facet.id,
                parent = %parent_id,
                "category parent link forms a cycle; treating as root"
            );
            continue;
        }
        slots[child].parent = Some(parent);
        slots[parent].children.push(child);
    }

    let mut roots: Vec<usize> = (0..slots.len())
        .filter(|&idx| slots[idx].parent.is_none())
        .collect();
    roots.sort_by(|&a, &b| compare_slots(&slots, a, b));

    roots
        .into_iter()
        .map(|root| materialize(&slots, root))
        .collect()
}

/// A category row flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatCategory {
    pub id: CategoryId,
    pub label: String,
    pub count: u64,
    /// Zero for roots.
    pub depth: usize,
    pub has_children: bool,
}

/// The category tree plus lookups used by the filter sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTree {
    roots: Vec<CategoryTreeNode>,
}

impl CategoryTree {
    /// Build from normalized facets.
    pub fn from_facets(facets: &[CategoryFacet]) -> Self {
        Self {
            roots: build_category_tree(facets),
        }
    }

    /// Build straight from the raw aggregation payload.
    pub fn from_raw(raw: &[Value]) -> Self {
        Self::from_facets(&normalize_category_facets(raw))
    }

    /// Top-level categories.
    pub fn roots(&self) -> &[CategoryTreeNode] {
        &self.roots
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.roots.iter().map(CategoryTreeNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find a node anywhere in the tree.
    pub fn find(&self, id: &CategoryId) -> Option<&CategoryTreeNode> {
        let mut stack: Vec<&CategoryTreeNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            if &node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// True when the category exists and has no children.
    pub fn is_leaf(&self, id: &CategoryId) -> bool {
        self.find(id).is_some_and(CategoryTreeNode::is_leaf)
    }

    /// Ancestors of a category, root first, excluding the category itself.
    ///
    /// Empty when the category is a root or unknown.
    pub fn ancestors_of(&self, id: &CategoryId) -> Vec<CategoryId> {
        fn walk(
            nodes: &[CategoryTreeNode],
            id: &CategoryId,
            path: &mut Vec<CategoryId>,
        ) -> bool {
            for node in nodes {
                if &node.id == id {
                    return true;
                }
                path.push(node.id.clone());
                if walk(&node.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        if walk(&self.roots, id, &mut path) {
            path
        } else {
            Vec::new()
        }
    }

    /// Every node in pre-order with its depth.
    pub fn flatten(&self) -> Vec<FlatCategory> {
        self.rows(|_| true)
    }

    /// Rows visible in the sidebar: children show only under expanded parents.
    pub fn visible_rows(&self, expanded: &BTreeSet<CategoryId>) -> Vec<FlatCategory> {
        self.rows(|node| expanded.contains(&node.id))
    }

    fn rows(&self, descend: impl Fn(&CategoryTreeNode) -> bool) -> Vec<FlatCategory> {
        let mut out = Vec::new();
        let mut stack: Vec<(&CategoryTreeNode, usize)> =
            self.roots.iter().rev().map(|n| (n, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            out.push(FlatCategory {
                id: node.id.clone(),
                label: node.label.clone(),
                count: node.count,
                depth,
                has_children: !node.children.is_empty(),
            });
            if descend(node) {
                stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(nodes: &[CategoryTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_roots_keep_backend_order() {
        let facets = vec![
            CategoryFacet::new("a", "Zebra", 1),
            CategoryFacet::new("b", "Apple", 2),
        ];
        let tree = build_category_tree(&facets);
        assert_eq!(ids(&tree), vec!["a", "b"]);
    }

    #[test]
    fn test_children_attach_to_parents() {
        let facets = vec![
            CategoryFacet::new("fiction", "داستان", 10),
            CategoryFacet::new("novel", "رمان", 6).with_parent("fiction"),
            CategoryFacet::new("short", "داستان کوتاه", 4).with_parent("fiction"),
            CategoryFacet::new("history", "تاریخ", 3),
        ];
        let tree = build_category_tree(&facets);
        assert_eq!(ids(&tree), vec!["fiction", "history"]);
        assert_eq!(ids(&tree[0].children), vec!["novel", "short"]);
        assert_eq!(tree[0].children[0].parent_id, Some(CategoryId::new("fiction")));
        assert!(tree[1].is_leaf());
    }

    #[test]
    fn test_child_listed_before_parent() {
        let facets = vec![
            CategoryFacet::new("leaf", "Leaf", 1).with_parent("root"),
            CategoryFacet::new("root", "Root", 1),
        ];
        let tree = build_category_tree(&facets);
        assert_eq!(ids(&tree), vec!["root"]);
        assert_eq!(ids(&tree[0].children), vec!["leaf"]);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let facets = vec![
            CategoryFacet::new("a", "A", 1),
            CategoryFacet::new("lost", "Lost", 1).with_parent("missing"),
        ];
        let tree = build_category_tree(&facets);
        assert_eq!(ids(&tree), vec!["a", "lost"]);
        assert_eq!(tree[1].parent_id, None);
    }

    #[test]
    fn test_deep_nesting() {
        let facets = vec![
            CategoryFacet::new("l0", "L0", 1),
            CategoryFacet::new("l1", "L1", 1).with_parent("l0"),
            CategoryFacet::new("l2", "L2", 1).with_parent("l1"),
            CategoryFacet::new("l3", "L3", 1).with_parent("l2"),
        ];
        let tree = CategoryTree::from_facets(&facets);
        assert_eq!(tree.len(), 4);
        let l3 = CategoryId::new("l3");
        assert_eq!(
            tree.ancestors_of(&l3),
            vec![CategoryId::new("l0"), CategoryId::new("l1"), CategoryId::new("l2")]
        );
        assert!(tree.is_leaf(&l3));
        assert!(!tree.is_leaf(&CategoryId::new("l1")));
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let facets = vec![CategoryFacet::new("a", "A", 1).with_parent("a")];
        let tree = build_category_tree(&facets);
        assert_eq!(ids(&tree), vec!["a"]);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_cycle_keeps_every_node_reachable() {
        let facets = vec![
            CategoryFacet::new("a", "A", 1).with_parent("c"),
            CategoryFacet::new("b", "B", 1).with_parent("a"),
            CategoryFacet::new("c", "C", 1).with_parent("b"),
        ];
        let tree = CategoryTree::from_facets(&facets);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots().len(), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let facets = vec![
            CategoryFacet::new("a", "First", 1),
            CategoryFacet::new("a", "Second", 9),
        ];
        let tree = build_category_tree(&facets);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].label, "First");
    }

    #[test]
    fn test_build_is_idempotent() {
        let facets = vec![
            CategoryFacet::new("x", "X", 1),
            CategoryFacet::new("y", "Y", 2).with_parent("x"),
            CategoryFacet::new("z", "Z", 3).with_parent("nowhere"),
        ];
        assert_eq!(build_category_tree(&facets), build_category_tree(&facets));
    }

    #[test]
    fn test_normalize_raw_payload() {
        let raw = vec![
            json!({"key": 12, "title": "Poetry", "count": 5, "parentId": null}),
            json!({"id": "13", "name": "Hafez", "count": 2, "parentId": 12}),
            json!({"count": 9}),
            json!(42),
        ];
        let facets = normalize_category_facets(&raw);
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].id.as_str(), "12");
        assert_eq!(facets[1].parent_id, Some(CategoryId::new("12")));

        let tree = CategoryTree::from_raw(&raw);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.roots()[0].children[0].label, "Hafez");
    }

    #[test]
    fn test_visible_rows_respect_expansion() {
        let facets = vec![
            CategoryFacet::new("p", "Parent", 3),
            CategoryFacet::new("c", "Child", 3).with_parent("p"),
            CategoryFacet::new("q", "Other", 1),
        ];
        let tree = CategoryTree::from_facets(&facets);

        let collapsed = tree.visible_rows(&BTreeSet::new());
        assert_eq!(collapsed.len(), 2);
        assert!(collapsed[0].has_children);

        let expanded: BTreeSet<CategoryId> = [CategoryId::new("p")].into_iter().collect();
        let rows = tree.visible_rows(&expanded);
        let order: Vec<(&str, usize)> = rows.iter().map(|r| (r.id.as_str(), r.depth)).collect();
        assert_eq!(order, vec![("p", 0), ("c", 1), ("q", 0)]);
        assert_eq!(tree.flatten(), rows);
    }
}
