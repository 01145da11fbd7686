//! Mind-map service
//!
//! Loads mind maps from JSON documents, lays them out and renders SVG.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::error_ext::{IoResultExt, JsonResultExt};
use crate::application::quote::{NoQuote, QuoteProvider};
use crate::application::render::SvgRenderer;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{DomainError, MapBuilder, NodeTable, ProcessedData, TreeNode};
use crate::infrastructure::traits::FileSystem;
use crate::layout::{layout, LayoutResult, Viewport};

/// The accepted shapes of a mind-map file.
#[derive(Debug, Clone, PartialEq)]
pub enum MapDocument {
    /// Full result bundle with a `mindMap` entry
    Bundle(Box<ProcessedData>),
    /// Flat `{ "nodes": [...] }` table
    Table(NodeTable),
    /// Bare nested `{ id, text, children }` tree
    Tree(TreeNode),
}

impl MapDocument {
    /// Decide the shape by its top-level keys, then decode it.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let has = |key: &str| value.get(key).is_some();

        if has("nodes") {
            serde_json::from_value(value).map(MapDocument::Table)
        } else if has("mindMap") || has("questions") || has("summary") {
            serde_json::from_value(value).map(|b| MapDocument::Bundle(Box::new(b)))
        } else {
            serde_json::from_value(value).map(MapDocument::Tree)
        }
    }

    /// Resolve to a single nested tree, validating table input.
    pub fn into_tree(self) -> Result<TreeNode, DomainError> {
        match self {
            MapDocument::Bundle(bundle) => bundle.mind_map.ok_or(DomainError::MissingRoot),
            MapDocument::Table(table) => MapBuilder::new().build(&table),
            MapDocument::Tree(tree) => Ok(tree),
        }
    }
}

/// Overrides for one render call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Target file; defaults to `<output_dir>/<input stem>.svg`
    pub output: Option<PathBuf>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Draw a caption even if the configuration does not ask for one
    pub with_quote: bool,
}

/// Service for turning mind-map files into layouts and pictures.
pub struct MindMapService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    quotes: Arc<dyn QuoteProvider>,
}

impl MindMapService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            settings,
            quotes: Arc::new(NoQuote),
        }
    }

    pub fn with_quotes(mut self, quotes: Arc<dyn QuoteProvider>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn load_document(&self, path: &Path) -> ApplicationResult<MapDocument> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read mind map", path)?;
        MapDocument::parse(&content).with_parse_context(path)
    }

    /// Load the tree from `path`, cleaned when `clean` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path, clean: bool) -> ApplicationResult<TreeNode> {
        let tree = self.load_document(path)?.into_tree()?;
        debug!(nodes = tree.node_count(), depth = tree.depth(), "mind map loaded");
        Ok(if clean { tree.cleaned() } else { tree })
    }

    pub fn layout_tree(&self, tree: &TreeNode) -> ApplicationResult<LayoutResult> {
        Ok(layout(tree, &self.settings.layout_config())?)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn layout_file(&self, path: &Path, clean: bool) -> ApplicationResult<LayoutResult> {
        let tree = self.load_tree(path, clean)?;
        self.layout_tree(&tree)
    }

    /// Lay out `tree` and draw it fitted into the configured (or overridden) viewport.
    pub fn render_tree(&self, tree: &TreeNode, options: &RenderOptions) -> ApplicationResult<String> {
        let result = self.layout_tree(tree)?;

        let mut size = self.settings.viewport_size();
        size.width = options.width.unwrap_or(size.width);
        size.height = options.height.unwrap_or(size.height);
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(ApplicationError::config(format!(
                "viewport size must be positive, got {}x{}",
                size.width, size.height
            )));
        }

        let mut viewport = Viewport::new(size, self.settings.viewport_options());
        viewport.reset_to_fit(result.bounds, self.settings.layout.horizontal_spacing);

        let mut renderer = SvgRenderer::new(
            self.settings.text_metrics(),
            self.settings.text.max_width,
            self.settings.layout.vertical_spacing,
        );
        if options.with_quote || self.settings.render.show_quote {
            renderer = renderer.with_quotes(self.quotes.clone());
        }
        Ok(renderer.render(&result, &viewport))
    }

    /// Render the map in `input` to an SVG file and return its path.
    #[instrument(level = "debug", skip(self, options))]
    pub fn render_file(&self, input: &Path, options: &RenderOptions) -> ApplicationResult<PathBuf> {
        let tree = self.load_tree(input, self.settings.layout.clean)?;
        let svg = self.render_tree(&tree, options)?;

        let output = options
            .output
            .clone()
            .unwrap_or_else(|| self.default_output(input));
        self.fs
            .ensure_parent(&output)
            .with_path_context("create output directory", &output)?;
        self.fs
            .write(&output, &svg)
            .with_path_context("write svg", &output)?;

        info!("rendered {} -> {}", input.display(), output.display());
        Ok(output)
    }

    fn default_output(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "mindmap".to_string());
        self.settings.render.output_dir.join(format!("{stem}.svg"))
    }
}
