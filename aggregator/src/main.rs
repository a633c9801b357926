//! IPM aggregator CLI - crop/state summaries from the National IPM table
//!
//! ```bash
//! ipm-aggregate                              # same as `run` with no flags
//! ipm-aggregate run                          # default paths (see config)
//! ipm-aggregate run --input ipm.csv --json   # print a JSON run summary
//! ipm-aggregate inspect ipm.csv              # just load and dump records
//! ipm-aggregate group ipm.csv --by states    # one view to stdout
//! ```
//!
//! Paths can also come from `IPM_INPUT`, `IPM_BY_CROP_OUTPUT` and
//! `IPM_BY_STATE_OUTPUT`, including via a `.env` file. Flags win.

use clap::{Parser, Subcommand, ValueEnum};
use ipm_aggregator::logs::{log_error, log_info, log_success, LogFormat, LOGGER};
use ipm_aggregator::output::write_groups;
use ipm_aggregator::transform::format_delimiter;
use ipm_aggregator::{group_by_crop, group_by_state, load, persist, run, AggregatorConfig};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ipm-aggregate")]
#[command(about = "Group the National IPM crop/state table by crop and by state", long_about = None)]
struct Cli {
    /// Suppress progress logs on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Progress log format
    #[arg(long, value_enum, default_value = "human", global = true)]
    log_format: LogFormatArg,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Human,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Human => LogFormat::Human,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Crops,
    States,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the source table and write both grouped views
    Run {
        /// Source spreadsheet (CSV)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output for the per-crop view
        #[arg(long)]
        by_crop: Option<PathBuf>,

        /// Output for the per-state view
        #[arg(long)]
        by_state: Option<PathBuf>,

        /// Print a JSON summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Load a source table and print its records as JSON
    Inspect {
        /// Source spreadsheet (CSV)
        input: PathBuf,
    },

    /// Write a single grouped view
    Group {
        /// Source spreadsheet (CSV)
        input: PathBuf,

        /// Which column to group by
        #[arg(long, value_enum)]
        by: View,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    LOGGER.set_format(cli.log_format.into());
    LOGGER.set_quiet(cli.quiet);

    if let Err(e) = dispatch(cli.command, AggregatorConfig::from_env()) {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

/// Run `command` against `config`, the paths resolved from env and defaults.
fn dispatch(command: Option<Commands>, config: AggregatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        None => cmd_run(config, None, None, None, false),

        Some(Commands::Run {
            input,
            by_crop,
            by_state,
            json,
        }) => cmd_run(config, input, by_crop, by_state, json),

        Some(Commands::Inspect { input }) => cmd_inspect(&input),

        Some(Commands::Group { input, by, output }) => cmd_group(&input, by, output.as_deref()),
    }
}

fn cmd_run(
    mut config: AggregatorConfig,
    input: Option<PathBuf>,
    by_crop: Option<PathBuf>,
    by_state: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(p) = input {
        config = config.with_input(p);
    }
    if let Some(p) = by_crop {
        config = config.with_by_crop_output(p);
    }
    if let Some(p) = by_state {
        config = config.with_by_state_output(p);
    }

    let summary = run(&config).map_err(|e| format!("{} failed: {}", e.stage(), e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    log_success("Done");
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("Reading {}", input.display()));

    let table = load(input)?;
    log_info(format!("Encoding: {}", table.encoding));
    log_info(format!("Delimiter: '{}'", format_delimiter(table.delimiter)));
    log_info(format!("Columns: {}", table.headers.join(", ")));
    log_success(format!("Parsed {} records", table.len()));

    println!("{}", serde_json::to_string_pretty(&table.records)?);
    Ok(())
}

fn cmd_group(input: &Path, by: View, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load(input)?;

    let rows = match (by, output) {
        (View::Crops, Some(path)) => persist(&group_by_crop(&table.records), path)?,
        (View::States, Some(path)) => persist(&group_by_state(&table.records), path)?,
        (View::Crops, None) => write_groups(&group_by_crop(&table.records), std::io::stdout().lock())?,
        (View::States, None) => write_groups(&group_by_state(&table.records), std::io::stdout().lock())?,
    };

    match output {
        Some(path) => log_success(format!("{} groups → {}", rows, path.display())),
        None => {
            std::io::stdout().flush()?;
            log_success(format!("{} groups", rows));
        }
    }
    Ok(())
}
