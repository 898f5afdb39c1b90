//! Minimal CSV reader: header row, comma separated, double-quoted fields.
//!
//! Quoted fields may contain commas, `""` escapes and line breaks.

use std::collections::HashMap;
use std::path::Path;

use super::raw::{Field, FromColumns};
use super::IngestError;

/// Split a CSV line respecting quoted fields (commas inside quotes, `""`
/// escapes).
pub(super) fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Group physical lines into logical records, joining lines while a quoted
/// field is still open. Yields the 1-based line number where each record
/// starts.
fn records(contents: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, line) in contents.lines().enumerate() {
        let (start, record) = match pending.take() {
            Some((start, mut record)) => {
                record.push('\n');
                record.push_str(line);
                (start, record)
            }
            None => (i + 1, line.to_string()),
        };
        // An odd quote count means a field is still open
        if record.matches('"').count() % 2 == 1 {
            pending = Some((start, record));
        } else {
            out.push((start, record));
        }
    }
    if let Some(unterminated) = pending {
        out.push(unterminated);
    }
    out
}

/// Column name → index, names normalised to lowercase.
struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    fn parse(line: &str) -> Self {
        let columns = csv_split(line.trim_start_matches('\u{feff}'))
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();
        Self { columns }
    }

    fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.columns.contains_key(**c))
            .map(|c| (*c).to_string())
            .collect()
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }
}

/// Parse every non-blank data row into `R`, tagged with the 1-based line
/// number it starts on.
pub(super) fn parse_rows<R: FromColumns>(
    path: &Path,
    contents: &str,
    required: &[&str],
) -> Result<Vec<(usize, R)>, IngestError> {
    let mut lines = records(contents).into_iter();
    let header = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(_, l)| Header::parse(&l))
        .ok_or_else(|| IngestError::EmptyFile(path.to_path_buf()))?;

    let missing = header.missing(required);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(path.to_path_buf(), missing));
    }

    Ok(lines
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(line_no, line)| {
            let fields = csv_split(&line);
            let row = R::from_columns(|name| {
                header
                    .index(name)
                    .and_then(|idx| fields.get(idx))
                    .map(|v| Field::Text(v.clone()))
            });
            (line_no, row)
        })
        .collect())
}
