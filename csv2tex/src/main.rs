//! # csv2tex
//!
//! A CLI tool for turning CSV result tables into LaTeX tables.
//!
//! ## Overview
//!
//! csv2tex is built on top of csv2texlib and provides a command-line interface
//! for converting one or more CSV files with a YAML configuration of display
//! names, number formats, sort orders, replacements and row filters.
//!
//! ## Usage
//!
//! ```bash
//! # Convert with a configuration file
//! csv2tex results.csv -c table.yaml
//!
//! # Several files are stacked into one table
//! csv2tex run1.csv run2.csv -c table.yaml -o table.tex
//!
//! # Pick columns, filter and sort for one run
//! csv2tex results.csv --columns model,mse --where "mse<0.5" --sort mse:asc
//!
//! # Preview in the terminal, or dump everything as JSON
//! csv2tex results.csv --output preview
//! csv2tex results.csv --output json
//!
//! # Check a configuration file
//! csv2tex check-config table.yaml
//! ```

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use csv2texlib::{convert_with, Configuration, ConvertOptions, SortKey, Table, TableStyle, ValueFilter};
use render::OutputMode;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("csv2tex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert CSV tables into formatted LaTeX tables")
        .subcommand_negates_reqs(true)
        .args_conflicts_with_subcommands(true)
        .arg(
            Arg::new("csv")
                .help("CSV files to convert (stacked in order)")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(clap::value_parser!(PathBuf))
                .help("YAML configuration file"),
        )
        .arg(
            Arg::new("columns")
                .long("columns")
                .value_delimiter(',')
                .help("Columns to emit, in order (comma-separated)"),
        )
        .arg(
            Arg::new("where")
                .short('w')
                .long("where")
                .action(ArgAction::Append)
                .help("Hide rows failing a condition, e.g. \"mse<0.5\" or \"year=2021..2023\""),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .action(ArgAction::Append)
                .help("Sort by column, ahead of configured ranks (<column>[:asc|:desc])"),
        )
        .arg(
            Arg::new("decimal-places")
                .short('d')
                .long("decimal-places")
                .value_parser(clap::value_parser!(usize))
                .help("Decimal places for columns without a format code"),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .value_parser(["hline", "booktabs"])
                .help("Rule style, overriding the configuration"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_parser(["latex", "preview", "json"])
                .default_value("latex")
                .help("Output format"),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write output to a file instead of stdout"),
        )
        .subcommand(
            Command::new("check-config")
                .about("Resolve a configuration file and report problems")
                .arg(
                    Arg::new("config")
                        .help("YAML configuration file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Build per-run options from the command line
fn build_options(matches: &ArgMatches) -> anyhow::Result<ConvertOptions> {
    let mut options = ConvertOptions::new();

    if let Some(columns) = matches.get_many::<String>("columns") {
        options = options.columns(columns.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()));
    }
    if let Some(conditions) = matches.get_many::<String>("where") {
        for condition in conditions {
            options = options.filter(condition.parse::<ValueFilter>()?);
        }
    }
    if let Some(keys) = matches.get_many::<String>("sort") {
        for key in keys {
            options = options.sort_key(key.parse::<SortKey>()?);
        }
    }
    if let Some(places) = matches.get_one::<usize>("decimal-places") {
        options = options.decimal_places(*places);
    }
    if let Some(style) = matches.get_one::<String>("style") {
        options = options.table_style(style.parse::<TableStyle>().map_err(anyhow::Error::msg)?);
    }

    Ok(options)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Configuration> {
    match path {
        Some(path) => Ok(Configuration::load_or_default(path)?),
        None => Ok(Configuration::default()),
    }
}

fn load_tables(matches: &ArgMatches) -> anyhow::Result<Table> {
    let paths = matches
        .get_many::<PathBuf>("csv")
        .ok_or_else(|| anyhow::anyhow!("no CSV files given"))?;
    let tables = paths
        .map(Table::from_csv_path)
        .collect::<Result<Vec<_>, _>>()?;
    let files = tables.len();
    let table = Table::concat(tables);
    tracing::debug!(files, rows = table.row_count(), columns = table.column_count(), "loaded CSV");
    Ok(table)
}

fn emit(text: &str, out: Option<&PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => std::fs::write(path, format!("{}\n", text.trim_end()))
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{}", text.trim_end());
            Ok(())
        }
    }
}

fn convert_handler(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches.get_one::<PathBuf>("config"))?;
    render::print_warnings(config.warnings());

    let table = load_tables(matches)?;
    let options = build_options(matches)?;
    let result = convert_with(&table, &config, &options)?;

    let out = matches.get_one::<PathBuf>("out");
    let text = match matches.get_one::<String>("output").map(String::as_str) {
        Some("json") => render::render_json(&result)?,
        Some("preview") => {
            // no terminal styling in files
            let mode = if out.is_some() {
                OutputMode::Text
            } else {
                OutputMode::Auto
            };
            render::render_preview(&result.display, mode)?
        }
        _ => result.latex,
    };
    emit(&text, out)
}

/// Report printed by `check-config`
#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    warnings: Vec<String>,
    config: &'a Configuration,
}

fn check_config_handler(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<PathBuf>("config")
        .ok_or_else(|| anyhow::anyhow!("no configuration file given"))?;
    let config = Configuration::from_path(path)?;
    render::print_warnings(config.warnings());

    let report = ConfigReport {
        warnings: config.warnings().iter().map(ToString::to_string).collect(),
        config: &config,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    // Library warnings are printed by `render::print_warnings`; RUST_LOG
    // opts into the structured events
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let matches = build_command().get_matches();

    let result = match matches.subcommand() {
        Some(("check-config", sub)) => check_config_handler(sub),
        _ => convert_handler(&matches),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
