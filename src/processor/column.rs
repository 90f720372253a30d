use crate::processor::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }
}

/// One typed column of a [`Table`](crate::processor::table::Table).
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

impl Column {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Str(_) => ColumnType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, idx: usize) -> Option<Value> {
        match self {
            Column::Int64(v) => v.get(idx).copied().map(Value::Int),
            Column::Float64(v) => v.get(idx).copied().map(Value::Float),
            Column::Str(v) => v.get(idx).cloned().map(Value::Str),
        }
    }

    /// Textual form of a cell, used for grouping keys and label matching.
    pub fn text(&self, idx: usize) -> Option<String> {
        match self {
            Column::Str(v) => v.get(idx).cloned(),
            _ => self.value(idx).map(|v| v.to_string()),
        }
    }

    /// Numeric cell as f64; `None` for string columns or out of range.
    pub fn f64_at(&self, idx: usize) -> Option<f64> {
        match self {
            Column::Int64(v) => v.get(idx).map(|&x| x as f64),
            Column::Float64(v) => v.get(idx).copied(),
            Column::Str(_) => None,
        }
    }

    pub fn iter_text(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.len()).filter_map(move |i| self.text(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_renders_numbers() {
        let col = Column::Int64(vec![3, -1]);
        assert_eq!(col.text(1).as_deref(), Some("-1"));
        let col = Column::Float64(vec![2.5]);
        assert_eq!(col.text(0).as_deref(), Some("2.5"));
        assert_eq!(col.text(1), None);
    }

    #[test]
    fn f64_view_skips_strings() {
        assert_eq!(Column::Int64(vec![7]).f64_at(0), Some(7.0));
        assert_eq!(Column::Str(vec!["7".into()]).f64_at(0), None);
        assert!(Column::Str(Vec::new()).is_empty());
        assert_ne!(Column::Float64(Vec::new()).column_type(), ColumnType::Str);
        assert!(ColumnType::Int64.is_numeric());
    }
}
