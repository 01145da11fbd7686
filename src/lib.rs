//! studymap: tidy-tree layout and rendering of study mind maps, plus quizzes
//! and flashcards over result bundles.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod layout;
pub mod util;
