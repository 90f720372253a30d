//! Delimited output of shaped tables and group summaries.

use std::io::Write;

use crate::processor::{
    ProcessorError,
    aggregator::{Aggregation, GroupSummary},
    table::Table,
};

fn writer<W: Write>(out: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out)
}

/// Writes `table` with a header row, quoting fields as needed.
pub fn write_table<W: Write>(table: &Table, out: W, delimiter: u8) -> Result<(), ProcessorError> {
    let mut wtr = writer(out, delimiter);
    wtr.write_record(table.headers())?;

    for record in table.records() {
        wtr.write_record(record.values().iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per group: the key columns, then one column per aggregation.
///
/// The header is written even when `summaries` is empty.
pub fn write_summaries<W: Write, S: AsRef<str>>(
    out: W,
    group_by: &[S],
    aggregations: &[Aggregation],
    summaries: &[GroupSummary],
    delimiter: u8,
) -> Result<(), ProcessorError> {
    let mut wtr = writer(out, delimiter);

    let header: Vec<String> = group_by
        .iter()
        .map(|g| g.as_ref().to_string())
        .chain(aggregations.iter().map(Aggregation::output_name))
        .collect();
    wtr.write_record(&header)?;

    for summary in summaries {
        let row = summary
            .key
            .iter()
            .cloned()
            .chain(summary.stats.iter().map(|(_, v)| v.to_string()));
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
