//! Command dispatch: one handler per subcommand.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::quote::{FixedQuote, QuoteList, QuoteProvider};
use crate::application::services::{AnalysisReport, RenderOptions};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, LayoutFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::MapArena;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::layout::{estimate_text_block_size, LayoutResult};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    // Completion and config paths work even when the configuration is broken
    match command {
        Commands::Completion { shell } => return completion(*shell),
        Commands::Config {
            command: ConfigCommands::Path,
        } => return config_path(cli.config.as_deref()),
        Commands::Config {
            command: ConfigCommands::Init { global },
        } => return config_init(*global),
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let quotes = quote_provider(&settings);
    let container = ServiceContainer::new(settings, quotes);

    match command {
        Commands::Layout {
            file,
            format,
            no_clean,
        } => layout(&container, file, *format, !no_clean),
        Commands::Render {
            file,
            output,
            width,
            height,
            quote,
        } => render(
            &container,
            file,
            RenderOptions {
                output: output.clone(),
                width: *width,
                height: *height,
                with_quote: *quote,
            },
        ),
        Commands::Tree { file } => tree(&container, file),
        Commands::Wrap { text, max_width } => wrap(&container, text, *max_width),
        Commands::Analyze { file } => analyze(&container, file),
        Commands::Quiz { bundle } => quiz(&container, bundle),
        Commands::Cards { bundle } => cards(&container, bundle),
        Commands::Config {
            command: ConfigCommands::Show,
        } => config_show(&container.settings),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn quote_provider(settings: &Settings) -> Arc<dyn QuoteProvider> {
    match &settings.render.quote {
        Some(quote) => Arc::new(FixedQuote(quote.clone())),
        None => {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            Arc::new(QuoteList::motivational(seed))
        }
    }
}

#[instrument(skip(container))]
fn layout(container: &ServiceContainer, file: &Path, format: LayoutFormat, clean: bool) -> CliResult<()> {
    let result = container.mind_map_service().layout_file(file, clean)?;
    match format {
        LayoutFormat::Json => {
            let json = serde_json::to_string_pretty(&result).map_err(|e| {
                ApplicationError::OperationFailed {
                    context: "serialize layout".to_string(),
                    source: Box::new(e),
                }
            })?;
            output::info(&json);
        }
        LayoutFormat::Table => print_layout_table(&result),
    }
    Ok(())
}

fn print_layout_table(result: &LayoutResult) {
    output::header(&format!(
        "{} nodes, {} x {}",
        result.nodes.len(),
        result.bounds.width,
        result.bounds.height
    ));
    output::info(&format!("{:>6} {:>5} {:>9} {:>9}  text", "id", "depth", "x", "y"));
    for node in &result.nodes {
        output::info(&format!(
            "{:>6} {:>5} {:>9.1} {:>9.1}  {}",
            node.id, node.depth, node.x, node.y, node.text
        ));
    }
}

#[instrument(skip(container))]
fn render(container: &ServiceContainer, file: &Path, options: RenderOptions) -> CliResult<()> {
    let written = container.mind_map_service().render_file(file, &options)?;
    output::success(&format!("Rendered {}", written.display()));
    Ok(())
}

fn tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let service = container.mind_map_service();
    let tree = service.load_tree(file, container.settings.layout.clean)?;
    let arena = MapArena::from_tree(&tree);
    output::info(&arena.to_tree_string());
    output::detail(&format!(
        "{} nodes, depth {}, {} leaves",
        arena.len(),
        arena.depth(),
        arena.leaf_nodes().len()
    ));
    Ok(())
}

fn wrap(container: &ServiceContainer, text: &str, max_width: Option<f64>) -> CliResult<()> {
    let max_width = max_width.unwrap_or(container.settings.text.max_width);
    if !(max_width.is_finite() && max_width > 0.0) {
        return Err(CliError::InvalidArgs(format!(
            "--max-width must be positive, got {max_width}"
        )));
    }
    let block = estimate_text_block_size(text, max_width, &container.settings.text_metrics());
    for line in &block.lines {
        output::info(line);
    }
    output::detail(&format!(
        "{} lines, box {} x {}",
        block.lines.len(),
        block.width,
        block.height
    ));
    Ok(())
}

fn analyze(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    match container.study_service().analyze(file)? {
        AnalysisReport::Text(stats) => {
            output::header(&file.display());
            output::detail(&format!("Words:        {}", stats.word_count));
            output::detail(&format!("Reading time: {} min", stats.reading_time));
        }
        AnalysisReport::Bundle {
            word_count,
            reading_time,
            keywords,
            questions,
            mind_map_nodes,
            mind_map_depth,
        } => {
            output::header(&file.display());
            output::detail(&format!("Words:        {word_count}"));
            output::detail(&format!("Reading time: {reading_time} min"));
            output::detail(&format!("Keywords:     {}", keywords.iter().join(", ")));
            output::detail(&format!("Questions:    {questions}"));
            output::detail(&format!(
                "Mind map:     {mind_map_nodes} nodes, depth {mind_map_depth}"
            ));
        }
    }
    Ok(())
}

fn quiz(container: &ServiceContainer, bundle: &Path) -> CliResult<()> {
    let service = container.study_service();
    let data = service.load_bundle(bundle)?;
    let score = service.run_quiz(&data)?;
    debug!(?score, "quiz finished");
    if score.total > 0 && !score.is_complete() {
        output::warning(&format!(
            "quiz ended early: {} of {} questions answered",
            score.answered, score.total
        ));
    }
    Ok(())
}

fn cards(container: &ServiceContainer, bundle: &Path) -> CliResult<()> {
    let service = container.study_service();
    let data = service.load_bundle(bundle)?;
    let summary = service.run_flashcards(&data)?;
    output::detail(&format!(
        "Reviewed {} of {} cards, {} answers revealed",
        summary.seen, summary.total, summary.revealed
    ));
    Ok(())
}

fn config_show(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

fn config_init(global: bool) -> CliResult<()> {
    let target = if global {
        global_config_path().ok_or_else(|| {
            CliError::Usage("cannot determine global config directory".to_string())
        })?
    } else {
        local_config_path()
    };

    if RealFileSystem.exists(&target) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            target.display()
        )));
    }
    let fs = RealFileSystem;
    fs.ensure_parent(&target)
        .map_err(|e| InfraError::io(format!("create parent of {}", target.display()), e))?;
    fs.write(&target, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;

    output::action("Created", &target.display());
    Ok(())
}

fn config_path(local: Option<&Path>) -> CliResult<()> {
    let status = |p: &Path| if p.exists() { "exists" } else { "not found" };

    match global_config_path() {
        Some(path) => output::detail(&format!("global: {} ({})", path.display(), status(&path))),
        None => output::detail(&"global: <unavailable>"),
    }
    let local = local.map(Path::to_path_buf).unwrap_or_else(local_config_path);
    output::detail(&format!("local:  {} ({})", local.display(), status(&local)));
    Ok(())
}

fn completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
