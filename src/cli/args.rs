//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Study-aid mind maps: tidy-tree layout, SVG rendering, quizzes and flashcards
#[derive(Parser, Debug)]
#[command(name = "studymap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.studymap.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute node positions for a mind map
    Layout {
        /// Bundle, nested tree or node table (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = LayoutFormat::Json)]
        format: LayoutFormat,
        /// Keep labels and siblings exactly as given
        #[arg(long)]
        no_clean: bool,
    },

    /// Draw a mind map as SVG
    Render {
        /// Bundle, nested tree or node table (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: <output_dir>/<name>.svg)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Viewport width, px
        #[arg(long)]
        width: Option<f64>,
        /// Viewport height, px
        #[arg(long)]
        height: Option<f64>,
        /// Add a motivational caption
        #[arg(long)]
        quote: bool,
    },

    /// Print a mind map as an indented tree
    Tree {
        /// Bundle, nested tree or node table (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show how a label wraps inside a node box
    Wrap {
        /// Label text
        text: String,
        /// Box width, px (default: text.max_width)
        #[arg(long)]
        max_width: Option<f64>,
    },

    /// Word count and reading time of a text file, or a bundle overview
    Analyze {
        /// Plain text file or JSON bundle
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Answer the questions of a bundle interactively
    Quiz {
        /// JSON bundle
        #[arg(value_hint = ValueHint::FilePath)]
        bundle: PathBuf,
    },

    /// Review the questions of a bundle as flashcards
    Cards {
        /// JSON bundle
        #[arg(value_hint = ValueHint::FilePath)]
        bundle: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutFormat {
    Json,
    Table,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
