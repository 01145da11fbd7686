//! Tests for CLI parsing and command dispatch

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use studymap::cli::args::{Cli, Commands, ConfigCommands, LayoutFormat};
use studymap::cli::execute_command;
use studymap::exitcode;

fn resource(name: &str) -> String {
    format!("{}/tests/resources/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn given_layout_flags_when_parsing_then_fields_populated() {
    let cli = Cli::parse_from(["studymap", "layout", "map.json", "-f", "table", "--no-clean"]);

    match cli.command {
        Some(Commands::Layout {
            format, no_clean, ..
        }) => {
            assert_eq!(format, LayoutFormat::Table);
            assert!(no_clean);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn given_global_config_flag_after_subcommand_when_parsing_then_accepted() {
    let cli = Cli::parse_from(["studymap", "config", "show", "-c", "custom.toml"]);

    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Show
        })
    ));
}

#[rstest]
#[case::layout(&["layout"])]
#[case::layout_table(&["layout", "--format", "table"])]
#[case::tree(&["tree"])]
fn given_valid_map_when_executing_then_ok(#[case] args: &[&str]) {
    let file = resource("tree.json");
    let mut argv = vec!["studymap"];
    argv.push(args[0]);
    argv.push(&file);
    argv.extend_from_slice(&args[1..]);

    let cli = Cli::parse_from(argv);

    assert!(execute_command(&cli).is_ok());
}

#[test]
fn given_text_when_wrapping_then_ok() {
    let cli = Cli::parse_from(["studymap", "wrap", "A label that certainly needs wrapping", "--max-width", "100"]);

    assert!(execute_command(&cli).is_ok());
}

#[test]
fn given_non_positive_width_when_wrapping_then_usage_exit_code() {
    let cli = Cli::parse_from(["studymap", "wrap", "label", "--max-width=-1"]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_cyclic_table_when_executing_layout_then_data_error_exit_code() {
    let file = resource("cyclic_table.json");
    let cli = Cli::parse_from(["studymap", "layout", file.as_str()]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn given_missing_config_file_when_executing_then_config_exit_code() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("absent.toml");
    let file = resource("tree.json");
    let cli = Cli::parse_from([
        "studymap",
        "-c",
        config.to_str().unwrap(),
        "tree",
        file.as_str(),
    ]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_render_with_output_when_executing_then_svg_written() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("tree.svg");
    let file = resource("tree.json");
    let cli = Cli::parse_from([
        "studymap",
        "render",
        file.as_str(),
        "-o",
        output.to_str().unwrap(),
    ]);

    execute_command(&cli).unwrap();

    assert!(std::fs::read_to_string(&output).unwrap().contains("<svg "));
}
