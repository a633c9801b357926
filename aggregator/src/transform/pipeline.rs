//! Load → group → persist, as one call.
//!
//! # Example
//!
//! ```rust,ignore
//! use ipm_aggregator::{run, AggregatorConfig};
//!
//! let summary = run(&AggregatorConfig::from_env())?;
//! println!("{} crops, {} states", summary.crop_groups, summary.state_groups);
//! ```
//!
//! Failures are not recovered: the first error ends the run. Outputs are
//! written by-crop first, so a failure on the by-state file leaves the
//! by-crop file in place.

use serde::Serialize;
use std::path::PathBuf;

use super::grouper::{group_by_crop, group_by_state, SEPARATOR};
use crate::config::AggregatorConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{CropGroup, SourceTable, StateGroup};
use crate::output::persist;
use crate::parser::load;
use crate::validation::check_completeness;

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub input: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub records: usize,
    pub crop_groups: usize,
    pub state_groups: usize,
    pub by_crop_output: PathBuf,
    pub by_state_output: PathBuf,
}

/// Both grouped views of one source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedViews {
    pub by_crop: Vec<CropGroup>,
    pub by_state: Vec<StateGroup>,
}

/// Display form of a delimiter
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

/// Group `table` both ways and check the result accounts for every row.
pub fn aggregate(table: &SourceTable) -> PipelineResult<GroupedViews> {
    log_info("Grouping...");
    let by_crop = group_by_crop(&table.records);
    log_success(format!("{} crops", by_crop.len()));
    let by_state = group_by_state(&table.records);
    log_success(format!("{} states", by_state.len()));

    let report = check_completeness(&table.records, &by_crop, &by_state)?;
    log_success(format!("All {} rows accounted for in both views", report.pairs));

    if !report.ambiguous_values.is_empty() {
        log_warning(format!(
            "{} value(s) contain '{}' and will read as several entries once joined:",
            report.ambiguous_values.len(),
            SEPARATOR
        ));
        for value in report.ambiguous_values.iter().take(5) {
            log_info_indent(format!("{:?}", value), 1);
        }
    }

    Ok(GroupedViews { by_crop, by_state })
}

/// Run the whole aggregation for `config`.
pub fn run(config: &AggregatorConfig) -> PipelineResult<RunSummary> {
    log_info(format!("Reading {}", config.input.display()));
    let table = load(&config.input)?;
    log_success(format!("Detected encoding: {}", table.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(table.delimiter)));
    log_success(format!("Read {} rows", table.len()));
    if table.is_empty() {
        log_warning("No data rows; outputs will only contain headers");
    }

    let views = aggregate(&table)?;

    log_info("Writing outputs...");
    let rows = persist(&views.by_crop, &config.by_crop_output).map_err(|source| {
        PipelineError::Persist {
            output: "by-crop",
            source,
        }
    })?;
    log_success(format!("{} rows → {}", rows, config.by_crop_output.display()));

    let rows = persist(&views.by_state, &config.by_state_output).map_err(|source| {
        PipelineError::Persist {
            output: "by-state",
            source,
        }
    })?;
    log_success(format!("{} rows → {}", rows, config.by_state_output.display()));

    Ok(RunSummary {
        input: config.input.clone(),
        encoding: table.encoding,
        delimiter: table.delimiter,
        records: table.records.len(),
        crop_groups: views.by_crop.len(),
        state_groups: views.by_state.len(),
        by_crop_output: config.by_crop_output.clone(),
        by_state_output: config.by_state_output.clone(),
    })
}
