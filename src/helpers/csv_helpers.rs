use memchr::{memchr, memchr_iter};

use crate::processor::column::{Column, ColumnType};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn strip_bom(buf: &[u8]) -> &[u8] {
    buf.strip_prefix(BOM).unwrap_or(buf)
}

/// Iterates `(line_number, line)` pairs, 1-based, without the terminator.
///
/// A trailing `\r` is removed and the last line is yielded even when the
/// buffer does not end in a newline.
pub fn lines(buf: &[u8]) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    let mut start = 0;
    let mut ends = memchr_iter(b'\n', buf).chain(std::iter::once(buf.len()));
    let mut line_no = 0;

    std::iter::from_fn(move || {
        let end = ends.next()?;
        let mut line = &buf[start..end];
        start = end + 1;
        line_no += 1;

        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        // Final empty slice after a trailing newline
        if end == buf.len() && line.is_empty() {
            return None;
        }
        Some((line_no, line))
    })
}

pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// Splits one line into fields, honouring `"` quoting.
///
/// Returns a message describing the defect when the quoting is malformed.
pub fn split_fields(line: &[u8], delimiter: u8, out: &mut Vec<String>) -> Result<(), String> {
    out.clear();

    if memchr(b'"', line).is_none() {
        let mut field_start = 0;
        for pos in memchr_iter(delimiter, line) {
            out.push(String::from_utf8_lossy(&line[field_start..pos]).into_owned());
            field_start = pos + 1;
        }
        out.push(String::from_utf8_lossy(&line[field_start..]).into_owned());
        return Ok(());
    }

    let mut field: Vec<u8> = Vec::new();
    let mut i = 0;
    loop {
        field.clear();
        if line.get(i) == Some(&b'"') {
            i += 1;
            loop {
                match line.get(i) {
                    None => return Err("unterminated quoted field".into()),
                    Some(b'"') if line.get(i + 1) == Some(&b'"') => {
                        field.push(b'"');
                        i += 2;
                    }
                    Some(b'"') => {
                        i += 1;
                        break;
                    }
                    Some(&b) => {
                        field.push(b);
                        i += 1;
                    }
                }
            }
            match line.get(i) {
                None => {}
                Some(&b) if b == delimiter => {}
                Some(_) => return Err("unexpected character after closing quote".into()),
            }
        } else {
            let end = memchr(delimiter, &line[i..]).map_or(line.len(), |p| i + p);
            field.extend_from_slice(&line[i..end]);
            i = end;
        }

        out.push(String::from_utf8_lossy(&field).into_owned());

        if i >= line.len() {
            return Ok(());
        }
        // Skip the delimiter
        i += 1;
        if i == line.len() {
            out.push(String::new());
            return Ok(());
        }
    }
}

pub fn parse_i64(field: &str) -> Option<i64> {
    atoi_simd::parse::<i64>(field.trim().as_bytes()).ok()
}

pub fn parse_f64(field: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(field.trim()).ok()
}

/// Narrowest type every value of the column parses as.
pub fn infer_type(values: &[String]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Str;
    }
    if values.iter().all(|v| parse_i64(v).is_some()) {
        ColumnType::Int64
    } else if values.iter().all(|v| parse_f64(v).is_some()) {
        ColumnType::Float64
    } else {
        ColumnType::Str
    }
}

/// Converts raw fields into a typed column.
///
/// On failure returns the index and text of the first value that does not
/// parse as `ty`.
pub fn build_column(values: Vec<String>, ty: ColumnType) -> Result<Column, (usize, String)> {
    match ty {
        ColumnType::Str => Ok(Column::Str(values)),
        ColumnType::Int64 => {
            let mut out = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                match parse_i64(v) {
                    Some(x) => out.push(x),
                    None => return Err((i, v.clone())),
                }
            }
            Ok(Column::Int64(out))
        }
        ColumnType::Float64 => {
            let mut out = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                match parse_f64(v) {
                    Some(x) => out.push(x),
                    None => return Err((i, v.clone())),
                }
            }
            Ok(Column::Float64(out))
        }
    }
}
