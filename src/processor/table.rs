use memmap2::Mmap;
use std::{collections::HashSet, fs::File, io::Write, path::Path};
use tracing::{debug, info};

use crate::{
    helpers::csv_helpers::{build_column, infer_type, is_blank, lines, split_fields, strip_bom},
    processor::{
        ProcessorError, Value,
        column::{Column, ColumnType},
        export::write_table,
    },
};

/// How a delimited source is read
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Field separator byte
    pub delimiter: u8,
    /// Columns always kept as text, even when every value looks numeric
    pub categories: Vec<String>,
    /// Columns that must parse as numbers; a bad field fails the load
    pub measurements: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            categories: Vec::new(),
            measurements: Vec::new(),
        }
    }
}

/// In-memory columnar table
///
/// Loaded records are never edited in place; derived columns are appended
/// with [`Table::with_column`], which consumes the table and hands back the
/// extended one.
///
/// # Examples
///
/// ```rust,no_run
/// # use columnar_prep::{Table, LoaderOptions};
/// let table = Table::load_csv("plants.csv".as_ref(), &LoaderOptions::default()).unwrap();
/// println!("{} rows", table.row_count());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Builds a table from named columns of equal length.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, ProcessorError> {
        let row_count = columns.first().map_or(0, |(_, c)| c.len());
        let mut table = Table {
            headers: Vec::with_capacity(columns.len()),
            columns: Vec::with_capacity(columns.len()),
            row_count,
        };
        for (name, column) in columns {
            table = table.with_column(&name, column)?;
        }
        Ok(table)
    }

    /// Loads a delimited text file
    ///
    /// The file is memory-mapped; the first non-blank line names the columns.
    /// Column types are inferred over every row (Int, Float, Str), subject to
    /// the overrides in `options`.
    ///
    /// # Errors
    /// Returns [`ProcessorError::DataSource`] if:
    /// - the file cannot be opened or mapped, or is empty
    /// - the header is missing, has blank or duplicate names
    /// - a row's field count differs from the header's
    /// - a measurement column holds a non-numeric field
    /// - a quoted field spans lines; records end at every newline, so an
    ///   embedded line break is reported as an unterminated quote
    ///
    /// Returns [`ProcessorError::ColumnNotFound`] when `options` names a column
    /// the header lacks.
    pub fn load_csv(path: &Path, options: &LoaderOptions) -> Result<Self, ProcessorError> {
        let file = File::open(path)
            .map_err(|e| ProcessorError::data_source(path, format!("cannot open: {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| ProcessorError::data_source(path, format!("cannot stat: {e}")))?
            .len();
        if len == 0 {
            return Err(ProcessorError::data_source(path, "empty source"));
        }
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| ProcessorError::data_source(path, format!("cannot map: {e}")))?;
        let buf = strip_bom(&mmap[..]);

        let mut rows = lines(buf).filter(|(_, line)| !is_blank(line));
        let mut fields = Vec::new();

        // Parse header
        let (header_no, header_line) = rows
            .next()
            .ok_or_else(|| ProcessorError::data_source(path, "missing header line"))?;
        split_fields(header_line, options.delimiter, &mut fields)
            .map_err(|m| ProcessorError::data_source(path, format!("line {header_no}: {m}")))?;
        let headers: Vec<String> = fields.iter().map(|h| h.trim().to_string()).collect();

        let mut seen = HashSet::new();
        for h in &headers {
            if h.is_empty() {
                return Err(ProcessorError::data_source(path, "blank column name in header"));
            }
            if !seen.insert(h.as_str()) {
                return Err(ProcessorError::data_source(
                    path,
                    format!("duplicate column name '{h}'"),
                ));
            }
        }
        for name in options.categories.iter().chain(&options.measurements) {
            if !seen.contains(name.as_str()) {
                return Err(ProcessorError::ColumnNotFound(name.clone()));
            }
        }

        let num_cols = headers.len();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); num_cols];
        let mut row_lines = Vec::new();

        for (line_no, line) in rows {
            split_fields(line, options.delimiter, &mut fields)
                .map_err(|m| ProcessorError::data_source(path, format!("line {line_no}: {m}")))?;

            if fields.len() != num_cols {
                return Err(ProcessorError::data_source(
                    path,
                    format!(
                        "line {line_no}: expected {num_cols} fields, got {}",
                        fields.len()
                    ),
                ));
            }

            for (col, field) in raw.iter_mut().zip(fields.drain(..)) {
                col.push(field);
            }
            row_lines.push(line_no);
        }

        if row_lines.is_empty() {
            return Err(ProcessorError::data_source(path, "no data rows"));
        }

        let mut columns = Vec::with_capacity(num_cols);
        for (name, values) in headers.iter().zip(raw) {
            let ty = if options.categories.contains(name) {
                ColumnType::Str
            } else if options.measurements.contains(name) {
                match infer_type(&values) {
                    ColumnType::Str => ColumnType::Float64,
                    numeric => numeric,
                }
            } else {
                infer_type(&values)
            };
            debug!(column = %name, ?ty, "inferred column type");

            let column = build_column(values, ty).map_err(|(row, value)| {
                ProcessorError::data_source(
                    path,
                    format!(
                        "line {}: column '{name}' value '{value}' is not numeric",
                        row_lines[row]
                    ),
                )
            })?;
            columns.push(column);
        }

        info!(
            path = %path.display(),
            rows = row_lines.len(),
            columns = num_cols,
            "loaded table"
        );

        Ok(Table {
            headers,
            columns,
            row_count: row_lines.len(),
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn get_col(&self, col_name: &str) -> Result<&Column, ProcessorError> {
        let col_pos = self
            .headers
            .iter()
            .position(|cn| cn == col_name)
            .ok_or_else(|| ProcessorError::ColumnNotFound(col_name.to_string()))?;

        self.columns
            .get(col_pos)
            .ok_or_else(|| ProcessorError::ColumnNotFound(col_name.to_string()))
    }

    /// Appends a derived column, consuming the table.
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self, ProcessorError> {
        if self.has_column(name) {
            return Err(ProcessorError::DuplicateColumn(name.to_string()));
        }
        if column.len() != self.row_count {
            return Err(ProcessorError::Parse(format!(
                "column '{name}' has {} values, table has {} rows",
                column.len(),
                self.row_count
            )));
        }
        self.headers.push(name.to_string());
        self.columns.push(column);
        Ok(self)
    }

    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        (index < self.row_count).then_some(Record { table: self, index })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        (0..self.row_count).map(move |index| Record { table: self, index })
    }

    /// Writes the table as comma-separated text with a header row.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), ProcessorError> {
        write_table(self, out, b',')
    }
}

/// Read-only view of one row
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Record<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<Value> {
        self.table.get_col(column).ok()?.value(self.index)
    }

    pub fn values(&self) -> Vec<Value> {
        self.table
            .columns
            .iter()
            .filter_map(|c| c.value(self.index))
            .collect()
    }
}
