use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use crate::processor::{
    AggregateOp, AggregateResult, ProcessorError,
    column::Column,
    table::Table,
};

/// One requested statistic: `op` applied to `column` within each group
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Aggregation {
    pub column: String,
    pub op: AggregateOp,
    /// Output name; defaults to `<column>_<op>`
    #[serde(default)]
    pub alias: Option<String>,
}

impl Aggregation {
    pub fn new(column: &str, op: AggregateOp) -> Self {
        Self {
            column: column.to_string(),
            op,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn output_name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.column, self.op))
    }
}

/// Statistics for one distinct combination of grouping values
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Grouping values, in the order the grouping columns were given
    pub key: Vec<String>,
    /// `(output name, value)` per requested aggregation
    pub stats: Vec<(String, AggregateResult)>,
}

impl GroupSummary {
    pub fn get(&self, name: &str) -> Option<AggregateResult> {
        self.stats
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Running totals for one group and one aggregation.
#[derive(Debug, Clone, Copy)]
enum Accumulator {
    Count(i64),
    SumInt(i128),
    SumFloat(f64),
    Mean { sum: f64, count: usize },
}

impl Accumulator {
    fn new(op: AggregateOp, column: &Column) -> Self {
        match (op, column) {
            (AggregateOp::Count, _) => Accumulator::Count(0),
            (AggregateOp::Sum, Column::Int64(_)) => Accumulator::SumInt(0),
            (AggregateOp::Sum, _) => Accumulator::SumFloat(0.0),
            (AggregateOp::Mean, _) => Accumulator::Mean { sum: 0.0, count: 0 },
        }
    }

    fn push(&mut self, column: &Column, row: usize) {
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::SumInt(sum) => {
                if let Column::Int64(values) = column {
                    *sum += values[row] as i128;
                }
            }
            Accumulator::SumFloat(sum) => *sum += column.f64_at(row).unwrap_or_default(),
            Accumulator::Mean { sum, count } => {
                *sum += column.f64_at(row).unwrap_or_default();
                *count += 1;
            }
        }
    }

    fn finish(self, column_name: &str) -> Result<AggregateResult, ProcessorError> {
        Ok(match self {
            Accumulator::Count(n) => AggregateResult::Int(n),
            Accumulator::SumInt(sum) => {
                AggregateResult::Int(i64::try_from(sum).map_err(|_| {
                    ProcessorError::SumOverflow {
                        column: column_name.to_string(),
                    }
                })?)
            }
            Accumulator::SumFloat(sum) => AggregateResult::Float(sum),
            Accumulator::Mean { sum, count } => AggregateResult::Float(sum / count as f64),
        })
    }
}

/// Group-by aggregation over one or more grouping columns
///
/// Produces one [`GroupSummary`] per distinct combination of grouping values
/// present in `table`. Groups appear in the order their first record does;
/// callers should not depend on that order.
///
/// `Count` works on any column; `Sum` and `Mean` need a numeric one.
///
/// # Errors
/// - [`ProcessorError::ColumnNotFound`] for an unknown grouping or measurement column
/// - [`ProcessorError::ColumnType`] for `Sum`/`Mean` over a string column
/// - [`ProcessorError::SumOverflow`] when an integer sum leaves `i64`
/// - [`ProcessorError::Parse`] when `group_by` is empty
///
/// # Example
/// ```rust
/// # use columnar_prep::{aggregate, Aggregation, AggregateOp, AggregateResult, Column, Table};
/// let table = Table::from_columns(vec![
///     ("g".into(), Column::Str(vec!["A".into(), "A".into(), "B".into()])),
///     ("v".into(), Column::Int64(vec![10, 20, 5])),
/// ]).unwrap();
/// let groups = aggregate(&table, &["g"], &[Aggregation::new("v", AggregateOp::Mean)]).unwrap();
/// assert_eq!(groups[0].get("v_mean"), Some(AggregateResult::Float(15.0)));
/// ```
pub fn aggregate<S: AsRef<str>>(
    table: &Table,
    group_by: &[S],
    aggregations: &[Aggregation],
) -> Result<Vec<GroupSummary>, ProcessorError> {
    if group_by.is_empty() {
        return Err(ProcessorError::Parse(
            "at least one grouping column is required".into(),
        ));
    }

    let group_cols = group_by
        .iter()
        .map(|name| table.get_col(name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let measure_cols = aggregations
        .iter()
        .map(|agg| {
            let col = table.get_col(&agg.column)?;
            if agg.op != AggregateOp::Count && !col.column_type().is_numeric() {
                return Err(ProcessorError::ColumnType {
                    column: agg.column.clone(),
                    expected: "numeric",
                });
            }
            Ok(col)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let blank: Vec<Accumulator> = aggregations
        .iter()
        .zip(&measure_cols)
        .map(|(agg, col)| Accumulator::new(agg.op, col))
        .collect();

    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<String>, Vec<Accumulator>)> = Vec::new();

    for row in 0..table.row_count() {
        let key: Vec<String> = group_cols
            .iter()
            .map(|col| col.text(row).unwrap_or_default())
            .collect();

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, blank.clone()));
                groups.len() - 1
            }
        };

        for (acc, col) in groups[slot].1.iter_mut().zip(&measure_cols) {
            acc.push(col, row);
        }
    }

    let summaries = groups
        .into_iter()
        .map(|(key, accs)| {
            let stats = accs
                .into_iter()
                .zip(aggregations)
                .map(|(acc, agg)| Ok((agg.output_name(), acc.finish(&agg.column)?)))
                .collect::<Result<Vec<_>, ProcessorError>>()?;
            Ok(GroupSummary { key, stats })
        })
        .collect::<Result<Vec<_>, ProcessorError>>()?;

    info!(
        group_by = ?group_by.iter().map(|s| s.as_ref()).collect::<Vec<&str>>(),
        groups = summaries.len(),
        rows = table.row_count(),
        "aggregated table"
    );

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            (
                "g".into(),
                Column::Str(vec!["A".into(), "A".into(), "B".into()]),
            ),
            ("v".into(), Column::Int64(vec![10, 20, 5])),
        ])
        .unwrap()
    }

    fn by_key(groups: &[GroupSummary], key: &str, stat: &str) -> AggregateResult {
        groups
            .iter()
            .find(|g| g.key == [key])
            .and_then(|g| g.get(stat))
            .unwrap()
    }

    #[test]
    fn test_group_by_mean_and_count() {
        let groups = aggregate(
            &sample(),
            &["g"],
            &[
                Aggregation::new("v", AggregateOp::Mean),
                Aggregation::new("v", AggregateOp::Count),
            ],
        )
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(by_key(&groups, "A", "v_mean"), AggregateResult::Float(15.0));
        assert_eq!(by_key(&groups, "B", "v_mean"), AggregateResult::Float(5.0));
        assert_eq!(by_key(&groups, "A", "v_count"), AggregateResult::Int(2));
        assert_eq!(by_key(&groups, "B", "v_count"), AggregateResult::Int(1));
    }

    #[test]
    fn test_sum_keeps_integer_type() {
        let groups = aggregate(
            &sample(),
            &["g"],
            &[Aggregation::new("v", AggregateOp::Sum).with_alias("total")],
        )
        .unwrap();
        assert_eq!(by_key(&groups, "A", "total"), AggregateResult::Int(30));
    }

    #[test]
    fn test_float_sum() {
        let table = Table::from_columns(vec![
            ("g".into(), Column::Str(vec!["x".into(), "x".into()])),
            ("h".into(), Column::Float64(vec![0.5, 1.25])),
        ])
        .unwrap();
        let groups = aggregate(&table, &["g"], &[Aggregation::new("h", AggregateOp::Sum)]).unwrap();
        assert_eq!(groups[0].get("h_sum"), Some(AggregateResult::Float(1.75)));
    }

    #[test]
    fn test_multi_column_keys() {
        let table = Table::from_columns(vec![
            (
                "form".into(),
                Column::Str(vec!["Tree".into(), "Tree".into(), "Shrub".into()]),
            ),
            ("site".into(), Column::Int64(vec![1, 2, 1])),
            ("h".into(), Column::Float64(vec![3.0, 4.0, 1.0])),
        ])
        .unwrap();
        let groups = aggregate(
            &table,
            &["form", "site"],
            &[Aggregation::new("h", AggregateOp::Count)],
        )
        .unwrap();
        let keys: Vec<Vec<String>> = groups.iter().map(|g| g.key.clone()).collect();
        assert_eq!(
            keys,
            vec![
                vec!["Tree".to_string(), "1".to_string()],
                vec!["Tree".to_string(), "2".to_string()],
                vec!["Shrub".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_counts_cover_every_row() {
        let table = Table::from_columns(vec![(
            "g".into(),
            Column::Str(
                ["a", "b", "a", "c", "b", "a", "d"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )])
        .unwrap();
        let groups = aggregate(&table, &["g"], &[Aggregation::new("g", AggregateOp::Count)]).unwrap();
        let total: i64 = groups
            .iter()
            .map(|g| match g.get("g_count") {
                Some(AggregateResult::Int(n)) => n,
                other => panic!("unexpected {other:?}"),
            })
            .sum();
        assert_eq!(total, table.row_count() as i64);
    }

    #[test]
    fn test_singleton_mean_is_exact() {
        let table = Table::from_columns(vec![
            ("g".into(), Column::Str(vec!["only".into()])),
            ("h".into(), Column::Float64(vec![0.1 + 0.2])),
        ])
        .unwrap();
        let groups = aggregate(&table, &["g"], &[Aggregation::new("h", AggregateOp::Mean)]).unwrap();
        assert_eq!(groups[0].get("h_mean"), Some(AggregateResult::Float(0.1 + 0.2)));
    }

    #[test]
    fn test_errors() {
        let t = sample();
        assert!(matches!(
            aggregate(&t, &["missing"], &[]),
            Err(ProcessorError::ColumnNotFound(_))
        ));
        assert!(matches!(
            aggregate(&t, &["g"], &[Aggregation::new("g", AggregateOp::Mean)]),
            Err(ProcessorError::ColumnType { .. })
        ));
        assert!(matches!(
            aggregate::<&str>(&t, &[], &[]),
            Err(ProcessorError::Parse(_))
        ));
    }

    #[test]
    fn test_integer_sum_overflow() {
        let table = Table::from_columns(vec![
            ("g".into(), Column::Str(vec!["a".into(), "a".into()])),
            ("v".into(), Column::Int64(vec![i64::MAX, 1])),
        ])
        .unwrap();
        assert!(matches!(
            aggregate(&table, &["g"], &[Aggregation::new("v", AggregateOp::Sum)]),
            Err(ProcessorError::SumOverflow { .. })
        ));
    }
}
