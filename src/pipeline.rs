//! Linear load → normalize → aggregate run driven by a [`ShapingConfig`].

use std::path::Path;

use tracing::{debug, info_span};

use crate::config::ShapingConfig;
use crate::processor::{
    ProcessorError,
    aggregator::{GroupSummary, aggregate},
    normalizer::normalize,
    table::Table,
};

/// Output of a pipeline run, ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Shaped {
    /// Loaded table with every derived column appended
    pub table: Table,
    /// Grouped statistics, empty when the config has no `[aggregate]` section
    pub summaries: Vec<GroupSummary>,
}

pub struct Pipeline;

impl Pipeline {
    /// Runs every stage in order; the first failure aborts the run.
    pub fn run(config: &ShapingConfig) -> Result<Shaped, ProcessorError> {
        Self::run_with_source(config, &config.source.path)
    }

    /// Like [`Pipeline::run`] but reads `source` instead of the configured path.
    pub fn run_with_source(config: &ShapingConfig, source: &Path) -> Result<Shaped, ProcessorError> {
        let _span = info_span!("pipeline", source = %source.display()).entered();

        let mut table = Table::load_csv(source, &config.source.loader_options())?;

        for step in &config.normalize {
            debug!(column = %step.column, output = %step.output, "normalize step");
            table = normalize(table, &step.column, &step.output, &step.rule_set())?;
        }

        let summaries = match &config.aggregate {
            Some(agg) => aggregate(&table, &agg.group_by, &agg.stats)?,
            None => Vec::new(),
        };

        Ok(Shaped { table, summaries })
    }
}
