//! Tidy-tree placement.
//!
//! Subtrees are laid out bottom-up and pushed apart by comparing, level by
//! level, the right contour of the siblings already placed with the left
//! contour of the next subtree. A parent sits at the midpoint of its first
//! and last child. Positions are then resolved top-down by accumulating the
//! modifiers that carried each subtree's shift.

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::error::DomainError;
use crate::domain::mind_map::{NodeId, TreeNode};

pub const DEFAULT_HORIZONTAL_SPACING: f64 = 170.0;
pub const DEFAULT_VERTICAL_SPACING: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Minimum distance between the x of two nodes at the same depth
    pub horizontal_spacing: f64,
    /// Distance between consecutive depth levels
    pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
        }
    }
}

impl LayoutConfig {
    pub fn new(horizontal_spacing: f64, vertical_spacing: f64) -> Result<Self, DomainError> {
        let config = Self {
            horizontal_spacing,
            vertical_spacing,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        check_spacing("horizontal_spacing", self.horizontal_spacing)?;
        check_spacing("vertical_spacing", self.vertical_spacing)
    }
}

fn check_spacing(name: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidSpacing { name, value })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: NodeId,
    pub text: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub is_root: bool,
    /// Position of the parent in [`LayoutResult::nodes`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

/// Parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Breadth-first, root first
    pub nodes: Vec<PositionedNode>,
    pub connections: Vec<Connection>,
    pub bounds: Bounds,
}

impl LayoutResult {
    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Parent and child of every edge, paired by position so repeated ids
    /// still resolve to the right boxes.
    pub fn edges(&self) -> impl Iterator<Item = (&PositionedNode, &PositionedNode)> {
        self.nodes.iter().filter_map(|child| {
            let parent = self.nodes.get(child.parent?)?;
            Some((parent, child))
        })
    }
}

/// Per-node working state for one layout pass.
#[derive(Debug, Default)]
struct LayoutNode {
    id: NodeId,
    text: String,
    depth: usize,
    /// Provisional x, relative to the parent's frame
    x: f64,
    /// Shift applied to the whole subtree, resolved in the second walk
    modifier: f64,
    /// Leftmost x per level of the subtree, relative to `x`
    left: Contour,
    /// Rightmost x per level of the subtree, relative to `x`
    right: Contour,
}

/// Extreme x per level of a subtree.
///
/// Levels are stored deepest first so a parent adds its own level with a
/// push, and every value is relative to `offset` so moving the whole
/// contour is a single addition.
#[derive(Debug, Default)]
struct Contour {
    offset: f64,
    levels: Vec<f64>,
}

impl Contour {
    fn leaf() -> Self {
        Self {
            offset: 0.0,
            levels: vec![0.0],
        }
    }

    fn height(&self) -> usize {
        self.levels.len()
    }

    /// Value at `depth` levels below the subtree root.
    fn at(&self, depth: usize) -> f64 {
        self.levels[self.levels.len() - 1 - depth] + self.offset
    }

    fn translate(&mut self, dx: f64) {
        self.offset += dx;
    }

    /// Add a new top level at `x`.
    fn push_top(&mut self, x: f64) {
        self.levels.push(x - self.offset);
    }

    /// Combine two sibling contours level by level. Levels only one side
    /// reaches keep that side's value. Costs the height of the shorter one.
    fn merge(self, other: Contour, pick: fn(f64, f64) -> f64) -> Contour {
        let (mut base, short) = if self.height() >= other.height() {
            (self, other)
        } else {
            (other, self)
        };
        let top = base.height() - 1;
        for depth in 0..short.height() {
            let merged = pick(base.at(depth), short.at(depth));
            base.levels[top - depth] = merged - base.offset;
        }
        base
    }
}

/// Compute positions for every node of `root`.
#[instrument(level = "debug", skip(root), fields(root = root.id))]
pub fn layout(root: &TreeNode, config: &LayoutConfig) -> Result<LayoutResult, DomainError> {
    config.validate()?;

    let mut arena = TreeArena::from_tree_with(root, |node, depth| LayoutNode {
        id: node.id,
        text: node.text.clone(),
        depth,
        ..LayoutNode::default()
    });

    first_walk(&mut arena, config.horizontal_spacing);
    let absolute = second_walk(&arena);
    let result = flatten(&arena, &absolute, config);

    debug!(
        nodes = result.nodes.len(),
        width = result.bounds.width,
        height = result.bounds.height,
        "layout complete"
    );
    Ok(result)
}

/// Post-order pass: place each node's children side by side and centre the node above them.
fn first_walk(arena: &mut TreeArena<LayoutNode>, spacing: f64) {
    let order: Vec<Index> = arena.iter_postorder().map(|(idx, _)| idx).collect();

    for idx in order {
        let children = match arena.get_node(idx) {
            Some(node) => node.children.clone(),
            None => continue,
        };

        if children.is_empty() {
            if let Some(node) = arena.get_node_mut(idx) {
                node.data.left = Contour::leaf();
                node.data.right = Contour::leaf();
            }
            continue;
        }

        // Contours of the siblings placed so far, in this node's child frame
        let mut acc_left: Option<Contour> = None;
        let mut acc_right: Option<Contour> = None;
        let mut first_x = 0.0;
        let mut last_x = 0.0;

        for (i, &child_idx) in children.iter().enumerate() {
            let Some(child) = arena.get_node_mut(child_idx) else {
                continue;
            };
            let data = &mut child.data;
            let mut left = std::mem::take(&mut data.left);
            let mut right = std::mem::take(&mut data.right);

            if let Some(placed) = &acc_right {
                let shared = placed.height().min(left.height());
                let shift = (0..shared)
                    .map(|depth| placed.at(depth) + spacing - (data.x + left.at(depth)))
                    .fold(f64::NEG_INFINITY, f64::max);
                data.x += shift;
                data.modifier += shift;
            }

            left.translate(data.x);
            right.translate(data.x);
            acc_left = Some(match acc_left.take() {
                Some(acc) => acc.merge(left, f64::min),
                None => left,
            });
            acc_right = Some(match acc_right.take() {
                Some(acc) => acc.merge(right, f64::max),
                None => right,
            });

            if i == 0 {
                first_x = data.x;
            }
            last_x = data.x;
        }

        if let Some(node) = arena.get_node_mut(idx) {
            let x = (first_x + last_x) / 2.0;
            node.data.x = x;
            node.data.left = with_own_level(acc_left, x);
            node.data.right = with_own_level(acc_right, x);
        }
    }
}

/// Rebase a children contour onto the parent at `x` and add the parent's level.
fn with_own_level(children: Option<Contour>, x: f64) -> Contour {
    let mut contour = children.unwrap_or_default();
    contour.translate(-x);
    contour.push_top(0.0);
    contour
}

/// Pre-order pass: absolute x = provisional x + sum of ancestors' modifiers.
fn second_walk(arena: &TreeArena<LayoutNode>) -> Vec<(Index, f64)> {
    let mut absolute = Vec::with_capacity(arena.len());
    let Some(root) = arena.root() else {
        return absolute;
    };

    let mut stack = vec![(root, 0.0)];
    while let Some((idx, ancestors)) = stack.pop() {
        if let Some(node) = arena.get_node(idx) {
            absolute.push((idx, node.data.x + ancestors));
            let carried = ancestors + node.data.modifier;
            for &child in node.children.iter().rev() {
                stack.push((child, carried));
            }
        }
    }
    absolute
}

fn flatten(
    arena: &TreeArena<LayoutNode>,
    absolute: &[(Index, f64)],
    config: &LayoutConfig,
) -> LayoutResult {
    let positions: HashMap<Index, f64> = absolute.iter().copied().collect();
    let mut slots: HashMap<Index, usize> = HashMap::with_capacity(arena.len());
    let min_x = absolute.iter().map(|(_, x)| *x).fold(f64::INFINITY, f64::min);
    let max_x = absolute.iter().map(|(_, x)| *x).fold(f64::NEG_INFINITY, f64::max);

    let mut nodes = Vec::with_capacity(arena.len());
    let mut connections = Vec::with_capacity(arena.len().saturating_sub(1));
    let mut max_depth = 0;

    for (idx, node) in arena.iter_breadth_first() {
        let data = &node.data;
        max_depth = max_depth.max(data.depth);
        slots.insert(idx, nodes.len());
        nodes.push(PositionedNode {
            id: data.id,
            text: data.text.clone(),
            depth: data.depth,
            x: positions.get(&idx).copied().unwrap_or(min_x) - min_x,
            y: data.depth as f64 * config.vertical_spacing,
            is_root: node.parent.is_none(),
            parent: node.parent.and_then(|p| slots.get(&p).copied()),
        });
        connections.extend(
            node.children
                .iter()
                .filter_map(|&child| arena.get_node(child))
                .map(|child| Connection {
                    from: data.id,
                    to: child.data.id,
                }),
        );
    }

    LayoutResult {
        nodes,
        connections,
        bounds: Bounds {
            width: max_x - min_x + config.horizontal_spacing,
            height: max_depth as f64 * config.vertical_spacing + config.vertical_spacing,
        },
    }
}
