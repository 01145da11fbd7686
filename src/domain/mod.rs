//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod mind_map;

pub use arena::{ArenaNode, MapArena, NodeData, TreeArena};
pub use builder::{MapBuilder, NodeTable, TableNode};
pub use entities::*;
pub use error::DomainError;
pub use mind_map::{NodeId, TreeNode};
