//! # columnar_prep
//!
//! `columnar_prep` shapes delimited tabular data before it is handed to a
//! charting front end. It supports:
//!
//! - Memory-mapped CSV/TSV loading with quoted fields
//! - Column type inference over every row (int, float, string)
//! - Rule-based category normalization into a derived column
//! - Group-by summaries (mean, count, sum) over one or more columns
//! - TOML pipeline descriptions and a small CLI driving them
//!
//! Every stage is a synchronous, single-pass transform: the loader produces a
//! [`Table`], the normalizer consumes it and returns it with one more column,
//! and the aggregator reads it into a list of [`GroupSummary`] values.
//!
//! # Example
//!
//! ```rust,no_run
//! use columnar_prep::{
//!     AggregateOp, Aggregation, CategoryRule, LoaderOptions, RuleSet, Table, aggregate, normalize,
//! };
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load CSV
//!     let table = Table::load_csv(Path::new("plants.csv"), &LoaderOptions::default())?;
//!
//!     // Collapse spelling variants of the growth form
//!     let rules = RuleSet::new(
//!         vec![
//!             CategoryRule::new("Shrub", ["shrub", "Shrub"]),
//!             CategoryRule::new("Tree", ["Tree", "Tree; Shrub"]),
//!         ],
//!         "Unknown",
//!     );
//!     let table = normalize(table, "growth_form", "form", &rules)?;
//!
//!     // Mean height per canonical form
//!     let groups = aggregate(&table, &["form"], &[Aggregation::new("height", AggregateOp::Mean)])?;
//!     for g in groups {
//!         println!("{:?} => {:?}", g.key, g.stats);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
mod helpers;
pub mod pipeline;
pub mod processor;

pub use config::{ConfigError, ShapingConfig};
pub use pipeline::{Pipeline, Shaped};
pub use processor::{
    AggregateOp, AggregateResult, ProcessorError, Value,
    aggregator::{Aggregation, GroupSummary, aggregate},
    column::{Column, ColumnType},
    export::{write_summaries, write_table},
    normalizer::{CategoryRule, RuleSet, normalize},
    table::{LoaderOptions, Record, Table},
};
