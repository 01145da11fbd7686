use std::collections::VecDeque;
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::mind_map::{NodeId, TreeNode};

/// Data payload for a mind-map node held in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Caller-assigned identifier
    pub id: NodeId,
    /// Display label
    pub text: String,
    /// Distance from the root, root = 0
    pub depth: usize,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.text, self.id)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct ArenaNode<T> {
    /// Payload for this node
    pub data: T,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in left-to-right order
    pub children: Vec<Index>,
}

/// Arena-based tree: nodes live in one indexable store and refer to each
/// other by generational index, so parent back-references never own anything.
#[derive(Debug)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<ArenaNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

/// Arena holding plain mind-map node data.
pub type MapArena = TreeArena<NodeData>;

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl MapArena {
    /// Copy a nested mind map into arena storage.
    pub fn from_tree(tree: &TreeNode) -> Self {
        Self::from_tree_with(tree, |node, depth| NodeData {
            id: node.id,
            text: node.text.clone(),
            depth,
        })
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            root: None,
        }
    }

    /// Build an arena from a nested tree, mapping every node through `make`
    /// together with its depth. Iterative, so deep trees do not recurse.
    #[instrument(level = "trace", skip_all)]
    pub fn from_tree_with<F>(tree: &TreeNode, mut make: F) -> Self
    where
        F: FnMut(&TreeNode, usize) -> T,
    {
        let mut arena = Self::with_capacity(tree.node_count());
        let root_idx = arena.insert_node(make(tree, 0), None);
        let mut stack = vec![(tree, root_idx, 0usize)];

        while let Some((node, idx, depth)) = stack.pop() {
            // Insert all children first so their order in the parent is preserved
            for child in &node.children {
                let child_idx = arena.insert_node(make(child, depth + 1), Some(idx));
                stack.push((child, child_idx, depth + 1));
            }
        }
        arena
    }

    #[instrument(level = "trace", skip_all)]
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = ArenaNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode<T>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut ArenaNode<T>> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal (parents before children, left to right).
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self)
    }

    /// Post-order traversal (children before parents, left to right).
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Level-by-level traversal from the root.
    pub fn iter_breadth_first(&self) -> BreadthFirstIterator<'_, T> {
        BreadthFirstIterator::new(self)
    }

    /// Number of levels; an empty arena has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max_depth = 0;
        let mut stack = vec![(root, 1)];
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                for &child in &node.children {
                    stack.push((child, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Collects all leaf nodes (nodes with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }
}

impl<T: fmt::Display> TreeArena<T> {
    /// Render the hierarchy as an indented text tree.
    pub fn to_tree_string(&self) -> Tree<String> {
        let Some(root_idx) = self.root else {
            return Tree::new("Empty tree".to_string());
        };

        fn build_tree<T: fmt::Display>(arena: &TreeArena<T>, idx: Index) -> Tree<String> {
            match arena.get_node(idx) {
                Some(node) => Tree::new(node.data.to_string()).with_leaves(
                    node.children
                        .iter()
                        .map(|&child| build_tree(arena, child))
                        .collect::<Vec<_>>(),
                ),
                None => Tree::new(String::new()),
            }
        }

        build_tree(self, root_idx)
    }
}

pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

pub struct BreadthFirstIterator<'a, T> {
    arena: &'a TreeArena<T>,
    queue: VecDeque<Index>,
}

impl<'a, T> BreadthFirstIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut queue = VecDeque::new();
        if let Some(root) = arena.root() {
            queue.push_back(root);
        }
        Self { arena, queue }
    }
}

impl<'a, T> Iterator for BreadthFirstIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.queue.pop_front() {
            if let Some(node) = self.arena.get_node(current_idx) {
                self.queue.extend(node.children.iter().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}
