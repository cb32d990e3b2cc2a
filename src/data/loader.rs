use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use super::model::{CellValue, Dataset, FileFormat};

/// Header given to the index column a dataframe library writes by default.
const INDEX_COLUMN: &str = "Unnamed: 0";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – header row followed by records
/// * `.xlsx`, `.xls` – first worksheet, first row is the header
///
/// Any other extension fails with
/// [`FormatError::UnsupportedInputFormat`](super::model::FormatError).
pub fn load_file(path: &Path) -> Result<Dataset> {
    let mut dataset = match FileFormat::from_path(path)? {
        FileFormat::Csv => load_csv(path)?,
        FileFormat::Xlsx | FileFormat::Xls => load_spreadsheet(path)?,
    };
    strip_index_column(&mut dataset);
    Ok(dataset)
}

/// Drop the incidental index column: one named `Unnamed: 0`, or a leading
/// column with a blank header.
fn strip_index_column(dataset: &mut Dataset) {
    let index = dataset
        .columns
        .iter()
        .position(|c| c == INDEX_COLUMN)
        .or_else(|| match dataset.columns.first() {
            Some(first) if first.trim().is_empty() => Some(0),
            _ => None,
        });
    if let Some(index) = index {
        log::debug!("Dropping index column at position {index}");
        dataset.drop_column(index);
    }
}

/// Blank headers elsewhere in the sheet get a positional name.
fn header_name(raw: String, position: usize) -> String {
    if raw.trim().is_empty() && position > 0 {
        format!("Unnamed: {position}")
    } else {
        raw
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cells are kept verbatim as text.  Short records are padded with empty
/// cells; a record wider than the header is an error.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(h.to_string(), i))
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "CSV row {row_no}: {} fields but the header has {}",
                record.len(),
                columns.len()
            );
        }
        rows.push(
            record
                .iter()
                .map(|v| CellValue::Text(v.to_string()))
                .collect(),
        );
    }

    Ok(Dataset::new(columns, rows))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheet")?
        .context("reading worksheet")?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(cell.to_string(), i))
            .collect(),
        None => Vec::new(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(Dataset::new(columns, rows))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) if dt.is_duration() => CellValue::Float(dt.as_f64()),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FormatError;
    use std::fs;
    use tempfile::tempdir;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn loads_csv_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.csv");
        fs::write(
            &path,
            "cluster_name_clean,normalized_main_chain,score\n\
             Pollos Juan,Pollos,0.90\n\
             \"Pizza, Bar\",Pizza Hut,\n",
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(
            ds.columns,
            vec!["cluster_name_clean", "normalized_main_chain", "score"]
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0][2], text("0.90"));
        assert_eq!(ds.rows[1][0], text("Pizza, Bar"));
        assert_eq!(ds.rows[1][2], text(""));
    }

    #[test]
    fn strips_named_index_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.csv");
        fs::write(&path, "Unnamed: 0,cluster_name_clean\n0,A\n1,B\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec!["cluster_name_clean"]);
        assert_eq!(ds.rows, vec![vec![text("A")], vec![text("B")]]);
    }

    #[test]
    fn strips_blank_leading_index_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.csv");
        fs::write(&path, ",cluster_name_clean,x\n0,A,1\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec!["cluster_name_clean", "x"]);
        assert_eq!(ds.rows[0], vec![text("A"), text("1")]);
    }

    #[test]
    fn short_rows_are_padded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.csv");
        fs::write(&path, "cluster_name_clean,normalized_main_chain,city\nA,B\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.rows[0], vec![text("A"), text("B"), CellValue::Empty]);
    }

    #[test]
    fn rejects_row_wider_than_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.csv");
        fs::write(
            &path,
            "cluster_name_clean,normalized_main_chain\nA,B\nC,D,EXTRA\n",
        )
        .unwrap();

        let err = load_file(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("CSV row 1"), "{msg}");
        assert!(msg.contains("3 fields"), "{msg}");
    }

    #[test]
    fn header_only_csv_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "cluster_name_clean,normalized_main_chain\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.columns.len(), 2);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.json");
        fs::write(&path, "[]").unwrap();

        let err = load_file(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::UnsupportedInputFormat("json".into()))
        );
    }

    #[test]
    fn loads_xlsx_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "cluster_name_clean").unwrap();
        sheet.write_string(0, 2, "normalized_main_chain").unwrap();
        sheet.write_string(0, 3, "rating").unwrap();
        sheet.write_number(1, 0, 0.0).unwrap();
        sheet.write_string(1, 1, "Burger Uno").unwrap();
        sheet.write_string(1, 2, "Burger King").unwrap();
        sheet.write_number(1, 3, 4.5).unwrap();
        workbook.save(&path).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(
            ds.columns,
            vec!["cluster_name_clean", "normalized_main_chain", "rating"]
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0][0], text("Burger Uno"));
        assert_eq!(ds.rows[0][2], CellValue::Float(4.5));
    }

    #[test]
    fn xlsx_dates_keep_their_serial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains.xlsx");

        let date = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "cluster_name_clean").unwrap();
        sheet.write_string(0, 1, "opened").unwrap();
        sheet.write_string(1, 0, "Bembos Larco").unwrap();
        sheet.write_number_with_format(1, 1, 45306.0, &date).unwrap();
        workbook.save(&path).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.rows[0][1], CellValue::DateTime(45306.0));
        assert_eq!(ds.rows[0][1].to_string(), "2024-01-15");
    }
}
