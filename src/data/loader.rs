use std::path::Path;

use thiserror::Error;

/// Errors from the data-source tier. None of these are fatal: every variant
/// is turned into a sidebar warning and the loader falls through to the
/// next source priority.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Excel(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
    #[error("no data rows found")]
    Empty,
}

/// A loaded table: column names and column-major string data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// column_data[col_idx][row_idx]
    pub column_data: Vec<Vec<String>>,
    pub row_count: usize,
}

impl RawTable {
    fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self, LoadError> {
        if rows.is_empty() {
            return Err(LoadError::Empty);
        }
        let columns: Vec<String> = rows.remove(0).iter().map(|s| s.trim().to_string()).collect();
        let num_cols = columns.len();
        let row_count = rows.len();
        if row_count == 0 {
            return Err(LoadError::Empty);
        }

        let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(row_count); num_cols];
        for row in &rows {
            for (col_idx, col) in column_data.iter_mut().enumerate() {
                col.push(row.get(col_idx).cloned().unwrap_or_default());
            }
        }

        Ok(RawTable {
            columns,
            column_data,
            row_count,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, idx: usize) -> &[String] {
        &self.column_data[idx]
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.column_data[col]
            .get(row)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.column_data.get_mut(col).and_then(|c| c.get_mut(row)) {
            *cell = value;
        }
    }
}

/// Parse CSV bytes into a table. The first record is the header row.
/// Falls back to latin1 when the bytes are not valid UTF-8.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|s| s.to_string()).collect()),
            Err(_) => continue,
        }
    }
    RawTable::from_rows(rows)
}

/// Load a CSV or Excel file from disk, dispatching on the extension.
pub fn load_path(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => parse_csv_bytes(&std::fs::read(path)?),
        "xls" | "xlsx" => load_excel(path),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

fn load_excel(path: &Path) -> Result<RawTable, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Excel(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or_else(|| LoadError::Excel("no sheets found".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Excel(e.to_string()))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect();

    RawTable::from_rows(rows)
}

/// Extract numeric f64 values from a string column.
/// Returns (values, fraction_valid) where invalid entries become NaN.
pub fn column_to_f64(data: &[String]) -> (Vec<f64>, f64) {
    let mut values = Vec::with_capacity(data.len());
    let mut valid = 0usize;
    for s in data {
        match s.trim().parse::<f64>() {
            Ok(v) => {
                values.push(v);
                if v.is_finite() {
                    valid += 1;
                }
            }
            Err(_) => values.push(f64::NAN),
        }
    }
    let frac = if data.is_empty() {
        0.0
    } else {
        valid as f64 / data.len() as f64
    };
    (values, frac)
}

/// Where the active table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    Upload,
    Url,
    Sample,
}

impl SourceOrigin {
    pub fn describe(&self) -> &'static str {
        match self {
            SourceOrigin::Upload => "uploaded file",
            SourceOrigin::Url => "CSV URL",
            SourceOrigin::Sample => "built-in sample data",
        }
    }
}

/// The source selected for this pass, plus a warning per tier that failed.
pub struct SourceOutcome<'a> {
    pub table: &'a RawTable,
    pub origin: SourceOrigin,
    pub warnings: Vec<String>,
}

/// Pick the active table in strict priority order: uploaded file, then
/// URL, then the built-in sample. A failed tier is reported as a warning
/// and skipped; an absent tier (nothing uploaded, no fetch yet) is silent.
pub fn select_source<'a>(
    upload: Option<&'a Result<RawTable, LoadError>>,
    url: Option<&'a Result<RawTable, LoadError>>,
    sample: &'a RawTable,
) -> SourceOutcome<'a> {
    let mut warnings = Vec::new();

    match upload {
        Some(Ok(table)) => {
            return SourceOutcome {
                table,
                origin: SourceOrigin::Upload,
                warnings,
            }
        }
        Some(Err(e)) => warnings.push(format!("Could not read the uploaded file: {e}")),
        None => {}
    }

    match url {
        Some(Ok(table)) => {
            return SourceOutcome {
                table,
                origin: SourceOrigin::Url,
                warnings,
            }
        }
        Some(Err(e)) => warnings.push(format!("Could not read the CSV URL: {e}")),
        None => {}
    }

    SourceOutcome {
        table: sample,
        origin: SourceOrigin::Sample,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_column_major_data() {
        let table = parse_csv_bytes(b"Label,X,Y\nA,10,-5\nB,-20,30\n").expect("parses");
        assert_eq!(table.columns, vec!["Label", "X", "Y"]);
        assert_eq!(table.row_count, 2);
        assert_eq!(table.cell(0, 0), "A");
        assert_eq!(table.cell(1, 1), "-20");
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let table = parse_csv_bytes(b"A,B,C\n1,2,3\n4,5\n").expect("parses");
        assert_eq!(table.row_count, 2);
        assert_eq!(table.cell(1, 2), "");
    }

    #[test]
    fn latin1_bytes_fall_back_instead_of_failing() {
        let bytes = b"Label,Costo\nCaf\xe9,10\n";
        let table = parse_csv_bytes(bytes).expect("parses");
        assert_eq!(table.cell(0, 0), "Caf\u{e9}");
    }

    #[test]
    fn header_only_input_is_empty() {
        assert!(matches!(parse_csv_bytes(b"Label,X,Y\n"), Err(LoadError::Empty)));
        assert!(matches!(parse_csv_bytes(b""), Err(LoadError::Empty)));
    }

    #[test]
    fn column_to_f64_marks_unparseable_as_nan() {
        let data: Vec<String> = ["1.5", "x", " 2 "].iter().map(|s| s.to_string()).collect();
        let (values, frac) = column_to_f64(&data);
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 2.0);
        assert!((frac - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn source_priority_is_upload_then_url_then_sample() {
        let upload = parse_csv_bytes(b"Label,X,Y\nU,1,1\n");
        let url = parse_csv_bytes(b"Label,X,Y\nW,2,2\n");
        let sample = parse_csv_bytes(b"Label,X,Y\nS,3,3\n").unwrap();

        let outcome = select_source(Some(&upload), Some(&url), &sample);
        assert_eq!(outcome.origin, SourceOrigin::Upload);
        assert!(outcome.warnings.is_empty());

        let outcome = select_source(None, Some(&url), &sample);
        assert_eq!(outcome.origin, SourceOrigin::Url);

        let outcome = select_source(None, None, &sample);
        assert_eq!(outcome.origin, SourceOrigin::Sample);
    }

    #[test]
    fn failed_tiers_warn_and_fall_through() {
        let bad_upload: Result<RawTable, LoadError> = Err(LoadError::Empty);
        let bad_url: Result<RawTable, LoadError> = Err(LoadError::Empty);
        let sample = parse_csv_bytes(b"Label,X,Y\nS,3,3\n").unwrap();

        let outcome = select_source(Some(&bad_upload), Some(&bad_url), &sample);
        assert_eq!(outcome.origin, SourceOrigin::Sample);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings[0].contains("uploaded file"));
        assert!(outcome.warnings[1].contains("CSV URL"));
    }
}
