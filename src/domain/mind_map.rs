//! Mind-map tree as delivered by the result provider.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Caller-assigned node identifier.
pub type NodeId = i64;

/// One concept in a hierarchical mind map.
///
/// Children are ordered; the order determines left-to-right placement.
/// An absent `children` field and an empty list both denote a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: NodeId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Number of levels in this subtree; a single node has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut queue = VecDeque::new();
        queue.push_back((self, 1));

        while let Some((node, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for child in &node.children {
                queue.push_back((child, depth + 1));
            }
        }
        max_depth
    }

    /// Parent → child id pairs, breadth-first.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(self);
        while let Some(node) = queue.pop_front() {
            for child in &node.children {
                edges.push((node.id, child.id));
                queue.push_back(child);
            }
        }
        edges
    }

    /// Labels of all leaves, left to right.
    pub fn leaf_texts(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                leaves.push(node.text.as_str());
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Normalized copy of the tree.
    ///
    /// Labels are trimmed. Among siblings, children whose label is empty or
    /// repeats an earlier sibling's label are dropped together with their
    /// subtrees. The root survives even with an empty label.
    pub fn cleaned(&self) -> TreeNode {
        let mut stack = vec![CleanFrame::new(self)];
        let mut root = None;

        while let Some(frame) = stack.last_mut() {
            let source = frame.source;
            if let Some(child) = source.children.get(frame.next) {
                frame.next += 1;
                stack.push(CleanFrame::new(child));
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let node = done.finish();
            match stack.last_mut() {
                Some(parent) => parent.adopt(node),
                None => root = Some(node),
            }
        }

        root.unwrap_or_else(|| TreeNode::new(self.id, self.text.trim()))
    }
}

/// Children are released one level at a time so very deep chains
/// do not exhaust the stack.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// One open node of the post-order walk in [`TreeNode::cleaned`].
struct CleanFrame<'a> {
    source: &'a TreeNode,
    next: usize,
    children: Vec<TreeNode>,
    seen: HashSet<String>,
}

impl<'a> CleanFrame<'a> {
    fn new(source: &'a TreeNode) -> Self {
        Self {
            source,
            next: 0,
            children: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn adopt(&mut self, child: TreeNode) {
        if !child.text.is_empty() && self.seen.insert(child.text.clone()) {
            self.children.push(child);
        }
    }

    fn finish(self) -> TreeNode {
        TreeNode {
            id: self.source.id,
            text: self.source.text.trim().to_string(),
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new(1, "Root").with_children(vec![
            TreeNode::new(2, "A").with_children(vec![TreeNode::new(4, "A1")]),
            TreeNode::new(3, "B"),
        ])
    }

    #[test]
    fn given_nested_tree_when_counting_then_includes_all_levels() {
        let tree = sample();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.edges(), vec![(1, 2), (1, 3), (2, 4)]);
        assert_eq!(tree.leaf_texts(), vec!["A1", "B"]);
    }

    #[test]
    fn given_json_without_children_when_deserializing_then_node_is_leaf() {
        let node: TreeNode = serde_json::from_str(r#"{"id": 7, "text": "leaf"}"#).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.id, 7);
    }

    #[test]
    fn given_duplicate_and_blank_siblings_when_cleaning_then_they_are_dropped() {
        let tree = TreeNode::new(1, "  Topic  ").with_children(vec![
            TreeNode::new(2, " Cells "),
            TreeNode::new(3, "Cells"),
            TreeNode::new(4, "   ").with_children(vec![TreeNode::new(5, "orphan")]),
            TreeNode::new(6, "Energy").with_children(vec![TreeNode::new(7, "")]),
        ]);

        let cleaned = tree.cleaned();

        assert_eq!(cleaned.text, "Topic");
        let labels: Vec<_> = cleaned.children.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(labels, vec!["Cells", "Energy"]);
        assert_eq!(cleaned.children[0].id, 2);
        assert!(cleaned.children[1].is_leaf(), "blank grandchild removed");
    }

    fn chain(len: NodeId) -> TreeNode {
        let mut node = TreeNode::new(len, " leaf ");
        for id in (0..len).rev() {
            node = TreeNode::new(id, format!(" level {id} ")).with_children(vec![node]);
        }
        node
    }

    #[test]
    fn given_very_deep_chain_when_cleaning_and_dropping_then_no_stack_overflow() {
        let tree = chain(200_000);

        let cleaned = tree.cleaned();
        drop(tree);

        assert_eq!(cleaned.text, "level 0");
        assert_eq!(cleaned.node_count(), 200_001);
        assert_eq!(cleaned.depth(), 200_001);
        assert_eq!(cleaned.leaf_texts(), vec!["leaf"]);
    }
}
