//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Prompter)
//! but are themselves concrete structs, not traits.

mod mind_map;
mod study;

pub use mind_map::{MapDocument, MindMapService, RenderOptions};
pub use study::{resolve_answer, AnalysisReport, FlashcardSummary, StudyService};
