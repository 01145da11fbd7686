//! Tree builder for flat node tables.
//!
//! A node table lists every node once together with the ids of its children.
//! Unlike the nested form it can express dangling references, shared children
//! and cycles, so it is validated while being converted into a [`TreeNode`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::mind_map::{NodeId, TreeNode};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// One row of a node table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub id: NodeId,
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

/// Flat `{ "nodes": [...] }` representation of a mind map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTable {
    pub nodes: Vec<TableNode>,
}

impl NodeTable {
    /// Flatten a nested tree into table form, breadth-first.
    pub fn from_tree(tree: &TreeNode) -> Self {
        let mut nodes = Vec::with_capacity(tree.node_count());
        let mut queue = std::collections::VecDeque::from([tree]);
        while let Some(node) = queue.pop_front() {
            nodes.push(TableNode {
                id: node.id,
                text: node.text.clone(),
                children: node.children.iter().map(|c| c.id).collect(),
            });
            queue.extend(node.children.iter());
        }
        Self { nodes }
    }
}

/// Constructs nested mind-map trees from node tables.
#[derive(Debug, Default)]
pub struct MapBuilder {
    relationship_cache: HashMap<NodeId, Vec<NodeId>>,
    labels: HashMap<NodeId, String>,
    visited_ids: HashSet<NodeId>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `table` and assemble the tree it describes.
    #[instrument(level = "debug", skip_all, fields(nodes = table.nodes.len()))]
    pub fn build(&mut self, table: &NodeTable) -> TreeResult<TreeNode> {
        // Reset state for a fresh build
        self.relationship_cache.clear();
        self.labels.clear();
        self.visited_ids.clear();

        if table.nodes.is_empty() {
            return Err(DomainError::MissingRoot);
        }

        self.index_nodes(table)?;

        let root = self.find_root_node(table)?;
        let order = self.traverse(root)?;

        // Every node must hang off the root; anything left over is a detached cycle
        if let Some(orphan) = table
            .nodes
            .iter()
            .find(|n| !self.visited_ids.contains(&n.id))
        {
            return Err(DomainError::CycleDetected(orphan.id));
        }

        debug!(root, nodes = order.len(), "node table validated");
        Ok(self.assemble(&order))
    }

    fn index_nodes(&mut self, table: &NodeTable) -> TreeResult<()> {
        for node in &table.nodes {
            if self.labels.insert(node.id, node.text.clone()).is_some() {
                return Err(DomainError::DuplicateId(node.id));
            }
            self.relationship_cache.insert(node.id, node.children.clone());
        }

        for node in &table.nodes {
            if let Some(&child) = node
                .children
                .iter()
                .find(|child| !self.labels.contains_key(child))
            {
                return Err(DomainError::UnknownNode {
                    parent: node.id,
                    child,
                });
            }
        }
        Ok(())
    }

    /// Nodes that are nobody's child, in table order.
    fn find_root_node(&self, table: &NodeTable) -> TreeResult<NodeId> {
        let children: HashSet<NodeId> = self
            .relationship_cache
            .values()
            .flatten()
            .copied()
            .collect();

        let roots: Vec<NodeId> = table
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !children.contains(id))
            .collect();

        match roots.as_slice() {
            // Every node has a parent: there must be a cycle
            [] => Err(DomainError::CycleDetected(table.nodes[0].id)),
            [root] => Ok(*root),
            _ => Err(DomainError::MultipleRoots(roots)),
        }
    }

    /// Pre-order walk from `root`; reaching any id twice is a cycle.
    fn traverse(&mut self, root: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut order = Vec::with_capacity(self.labels.len());
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            if !self.visited_ids.insert(current) {
                return Err(DomainError::CycleDetected(current));
            }
            order.push(current);

            if let Some(children) = self.relationship_cache.get(&current) {
                stack.extend(children.iter().rev());
            }
        }
        Ok(order)
    }

    /// Build nested nodes bottom-up: in reverse pre-order every child is
    /// finished before its parent.
    fn assemble(&mut self, order: &[NodeId]) -> TreeNode {
        let mut built: HashMap<NodeId, TreeNode> = HashMap::with_capacity(order.len());

        for &id in order.iter().rev() {
            let children = self
                .relationship_cache
                .get(&id)
                .map(|ids| ids.iter().filter_map(|c| built.remove(c)).collect())
                .unwrap_or_default();
            let text = self.labels.remove(&id).unwrap_or_default();
            built.insert(id, TreeNode { id, text, children });
        }

        built
            .remove(&order[0])
            .unwrap_or_else(|| TreeNode::new(order[0], ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: NodeId, text: &str, children: &[NodeId]) -> TableNode {
        TableNode {
            id,
            text: text.to_string(),
            children: children.to_vec(),
        }
    }

    fn table(rows: Vec<TableNode>) -> NodeTable {
        NodeTable { nodes: rows }
    }

    #[test]
    fn given_valid_table_when_building_then_nested_order_is_kept() {
        let t = table(vec![
            row(3, "b", &[]),
            row(1, "root", &[2, 3]),
            row(2, "a", &[4]),
            row(4, "a1", &[]),
        ]);

        let tree = MapBuilder::new().build(&t).unwrap();

        assert_eq!(tree.id, 1);
        assert_eq!(tree.children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(tree.children[0].children[0].text, "a1");
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn given_tree_when_flattened_and_rebuilt_then_equal() {
        let tree = TreeNode::new(1, "r").with_children(vec![
            TreeNode::new(2, "x").with_children(vec![TreeNode::new(3, "y")]),
            TreeNode::new(4, "z"),
        ]);
        let rebuilt = MapBuilder::new()
            .build(&NodeTable::from_tree(&tree))
            .unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn given_empty_table_when_building_then_missing_root() {
        let result = MapBuilder::new().build(&NodeTable::default());
        assert_eq!(result, Err(DomainError::MissingRoot));
    }

    #[test]
    fn given_duplicate_id_when_building_then_error() {
        let t = table(vec![row(1, "a", &[2]), row(2, "b", &[]), row(2, "c", &[])]);
        assert_eq!(MapBuilder::new().build(&t), Err(DomainError::DuplicateId(2)));
    }

    #[test]
    fn given_dangling_child_when_building_then_unknown_node() {
        let t = table(vec![row(1, "a", &[9])]);
        assert_eq!(
            MapBuilder::new().build(&t),
            Err(DomainError::UnknownNode { parent: 1, child: 9 })
        );
    }

    #[test]
    fn given_full_cycle_when_building_then_cycle_detected() {
        let t = table(vec![row(1, "a", &[2]), row(2, "b", &[1])]);
        assert!(matches!(
            MapBuilder::new().build(&t),
            Err(DomainError::CycleDetected(_))
        ));
    }

    #[test]
    fn given_back_edge_below_root_when_building_then_cycle_detected() {
        let t = table(vec![
            row(1, "root", &[2]),
            row(2, "a", &[3]),
            row(3, "b", &[2]),
        ]);
        assert_eq!(
            MapBuilder::new().build(&t),
            Err(DomainError::CycleDetected(2))
        );
    }

    #[test]
    fn given_detached_cycle_when_building_then_cycle_detected() {
        let t = table(vec![
            row(1, "root", &[]),
            row(2, "a", &[3]),
            row(3, "b", &[2]),
        ]);
        assert_eq!(
            MapBuilder::new().build(&t),
            Err(DomainError::CycleDetected(2))
        );
    }

    #[test]
    fn given_two_roots_when_building_then_multiple_roots() {
        let t = table(vec![row(1, "a", &[]), row(2, "b", &[])]);
        assert_eq!(
            MapBuilder::new().build(&t),
            Err(DomainError::MultipleRoots(vec![1, 2]))
        );
    }
}
