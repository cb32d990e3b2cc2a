use std::fmt;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Column holding the restaurant name under review.
pub const RESTAURANT_COLUMN: &str = "cluster_name_clean";
/// Column holding the chain the restaurant was assigned to.
pub const CHAIN_COLUMN: &str = "normalized_main_chain";
/// Column appended on export with one label per row.
pub const LABEL_COLUMN: &str = "Validación";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the imported table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell.  CSV cells are always kept as raw `Text` so
/// that writing them back reproduces the input exactly; spreadsheet cells
/// keep the type reported by the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Spreadsheet date/time stored as an ISO string by the workbook.
    Date(String),
    /// Spreadsheet date/time stored as a 1900-system serial number.
    DateTime(f64),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.format("%Y-%m-%d")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{serial}"),
            },
            CellValue::Empty => Ok(()),
        }
    }
}

/// Convert a 1900-system spreadsheet serial to a calendar date-time.
/// Serial 0 is 1899-12-30 so that serials from March 1900 on line up with
/// the spreadsheet's own calendar.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

// ---------------------------------------------------------------------------
// Dataset – the imported table
// ---------------------------------------------------------------------------

/// The imported table: an ordered column list and rows of cells aligned
/// with it.  Column order is the order of the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset, padding or truncating every row to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Dataset { columns, rows }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in record `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// `(column, value)` pairs of one record in column order.
    pub fn record(&self, row: usize) -> impl Iterator<Item = (&str, &CellValue)> {
        let cells = self.rows.get(row).map(Vec::as_slice).unwrap_or_default();
        self.columns.iter().map(String::as_str).zip(cells.iter())
    }

    /// Fields of a record other than the two primary display columns.
    pub fn extra_details(&self, row: usize) -> impl Iterator<Item = (&str, &CellValue)> {
        self.record(row)
            .filter(|(col, _)| *col != RESTAURANT_COLUMN && *col != CHAIN_COLUMN)
    }

    /// The first `n` records, for previews.
    pub fn head(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Remove a column by position from the header and every row.
    pub fn drop_column(&mut self, index: usize) {
        if index >= self.columns.len() {
            return;
        }
        self.columns.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Review state of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Label {
    #[default]
    NotReviewed,
    Correct,
    Incorrect,
}

impl Label {
    /// Text written to the `Validación` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::NotReviewed => "No revisado",
            Label::Correct => "Correcto",
            Label::Incorrect => "Incorrecto",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The judgement a reviewer can give a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl From<Verdict> for Label {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Correct => Label::Correct,
            Verdict::Incorrect => Label::Incorrect,
        }
    }
}

// ---------------------------------------------------------------------------
// File formats
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Tipo de archivo no soportado: .{0}")]
    UnsupportedInputFormat(String),
    #[error("Formato de archivo no soportado para guardar: .{0}")]
    UnsupportedOutputFormat(String),
}

/// Formats a dataset can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

/// Formats a labeled dataset can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

/// Lower-cased extension of `path`, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

impl FileFormat {
    pub const EXTENSIONS: [&'static str; 3] = ["csv", "xlsx", "xls"];

    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        match extension_of(path).as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            other => Err(FormatError::UnsupportedInputFormat(other.to_string())),
        }
    }
}

impl ExportFormat {
    /// Output format matching a source file; spreadsheets are always
    /// written as `.xlsx`.
    pub fn for_source(path: &Path) -> Result<Self, FormatError> {
        match extension_of(path).as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "xls" => Ok(ExportFormat::Xlsx),
            other => Err(FormatError::UnsupportedOutputFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn new_pads_short_rows() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![text("1")], vec![text("2"), text("3"), text("4")]],
        );
        assert_eq!(ds.rows[0], vec![text("1"), CellValue::Empty]);
        assert_eq!(ds.rows[1], vec![text("2"), text("3")]);
    }

    #[test]
    fn extra_details_skip_primary_columns() {
        let ds = Dataset::new(
            vec![
                "city".into(),
                RESTAURANT_COLUMN.into(),
                CHAIN_COLUMN.into(),
                "score".into(),
            ],
            vec![vec![text("Lima"), text("Pollos 1"), text("Pollos"), text("0.9")]],
        );
        let extra: Vec<_> = ds.extra_details(0).map(|(c, _)| c).collect();
        assert_eq!(extra, vec!["city", "score"]);
        assert_eq!(ds.get(0, CHAIN_COLUMN), Some(&text("Pollos")));
    }

    #[test]
    fn drop_column_removes_cells() {
        let mut ds = Dataset::new(
            vec!["idx".into(), "a".into()],
            vec![vec![text("0"), text("x")]],
        );
        ds.drop_column(0);
        assert_eq!(ds.columns, vec!["a".to_string()]);
        assert_eq!(ds.rows[0], vec![text("x")]);
    }

    #[test]
    fn formats_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Ok(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("a.xls")), Ok(FileFormat::Xls));
        assert_eq!(
            FileFormat::from_path(Path::new("a.json")),
            Err(FormatError::UnsupportedInputFormat("json".into()))
        );
        assert_eq!(
            ExportFormat::for_source(Path::new("a.xls")),
            Ok(ExportFormat::Xlsx)
        );
        assert_eq!(
            ExportFormat::for_source(Path::new("noext")),
            Err(FormatError::UnsupportedOutputFormat(String::new()))
        );
    }

    #[test]
    fn datetime_serial_displays_as_iso() {
        assert_eq!(CellValue::DateTime(45306.0).to_string(), "2024-01-15");
        assert_eq!(CellValue::DateTime(45306.5).to_string(), "2024-01-15 12:00:00");
        assert_eq!(CellValue::DateTime(-1.0).to_string(), "-1");
    }

    #[test]
    fn label_text() {
        assert_eq!(Label::default().as_str(), "No revisado");
        assert_eq!(Label::from(Verdict::Correct).to_string(), "Correcto");
        assert_eq!(Label::from(Verdict::Incorrect).to_string(), "Incorrecto");
    }
}
