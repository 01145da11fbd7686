//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::quote::{NoQuote, QuoteProvider};
use crate::application::services::{MindMapService, StudyService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, Prompter, RealFileSystem, StdinPrompter};

/// Container holding shared dependencies; services are built on demand.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Learner interaction
    pub prompter: Arc<dyn Prompter>,

    /// Caption source for rendered maps
    pub quotes: Arc<dyn QuoteProvider>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, quotes: Arc<dyn QuoteProvider>) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(StdinPrompter),
            quotes,
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        prompter: Arc<dyn Prompter>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            prompter,
            quotes,
        }
    }

    pub fn mind_map_service(&self) -> MindMapService {
        MindMapService::new(self.fs.clone(), self.settings.clone()).with_quotes(self.quotes.clone())
    }

    pub fn study_service(&self) -> StudyService {
        StudyService::new(self.fs.clone(), self.prompter.clone())
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new(Settings::default(), Arc::new(NoQuote))
    }
}
