use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};

use super::model::{CellValue, Dataset, ExportFormat, Label, LABEL_COLUMN};
use crate::color::LabelColors;

/// Integers beyond this magnitude do not survive the trip through an f64
/// number cell and are written as text.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Worksheet name used for spreadsheet exports.
pub const SHEET_NAME: &str = "Validaciones";

/// Percentages written under the data of a spreadsheet export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRows {
    pub correct_pct: f64,
    pub incorrect_pct: f64,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Serialize `dataset` with `labels` appended as the `Validación` column.
///
/// `labels` must have one entry per record.
pub fn export_bytes(
    dataset: &Dataset,
    labels: &[Label],
    format: ExportFormat,
    summary: SummaryRows,
) -> Result<Vec<u8>> {
    debug_assert_eq!(dataset.len(), labels.len());
    match format {
        ExportFormat::Csv => write_csv(dataset, labels),
        ExportFormat::Xlsx => write_xlsx(dataset, labels, summary),
    }
}

/// Output file name for a source file: `<stem>_validacion.<ext>`.
pub fn suggested_file_name(source: &Path, format: ExportFormat) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("datos");
    format!("{stem}_validacion.{}", format.extension())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn write_csv(dataset: &Dataset, labels: &[Label]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = dataset.columns.iter().map(String::as_str).collect();
    header.push(LABEL_COLUMN);
    writer.write_record(&header).context("writing CSV header")?;

    for (row_no, (row, label)) in dataset.rows.iter().zip(labels).enumerate() {
        let mut record: Vec<String> = row.iter().map(CellValue::to_string).collect();
        record.push(label.as_str().to_string());
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))
}

// ---------------------------------------------------------------------------
// XLSX writer
// ---------------------------------------------------------------------------

fn write_xlsx(dataset: &Dataset, labels: &[Label], summary: SummaryRows) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    let label_col = u16::try_from(dataset.columns.len()).context("too many columns")?;
    for (col, name) in dataset.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &bold)?;
    }
    sheet.write_string_with_format(0, label_col, LABEL_COLUMN, &bold)?;

    let fill = |label: Label| {
        LabelColors::for_label(label).map(|rgb| {
            Format::new()
                .set_background_color(Color::RGB(rgb))
                .set_pattern(FormatPattern::Solid)
        })
    };
    let correct_fill = fill(Label::Correct);
    let incorrect_fill = fill(Label::Incorrect);

    let cell_formats = CellFormats {
        date: Format::new().set_num_format("yyyy-mm-dd"),
        datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
    };

    for (i, (row, label)) in dataset.rows.iter().zip(labels).enumerate() {
        let xl_row = u32::try_from(i + 1).context("too many rows")?;
        for (col, value) in row.iter().enumerate() {
            write_cell(sheet, xl_row, col as u16, value, &cell_formats)?;
        }
        let format = match label {
            Label::Correct => correct_fill.as_ref(),
            Label::Incorrect => incorrect_fill.as_ref(),
            Label::NotReviewed => None,
        };
        match format {
            Some(f) => sheet.write_string_with_format(xl_row, label_col, label.as_str(), f)?,
            None => sheet.write_string(xl_row, label_col, label.as_str())?,
        };
    }

    // One blank row after the data, then the two percentages.
    let summary_row = u32::try_from(dataset.len() + 2).context("too many rows")?;
    sheet.write_string(summary_row, 0, "Porcentaje Correctos:")?;
    sheet.write_string(summary_row, 1, format!("{:.2}%", summary.correct_pct))?;
    sheet.write_string(summary_row + 1, 0, "Porcentaje Incorrectos:")?;
    sheet.write_string(summary_row + 1, 1, format!("{:.2}%", summary.incorrect_pct))?;

    workbook.save_to_buffer().context("serializing workbook")
}

struct CellFormats {
    date: Format,
    datetime: Format,
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &CellFormats,
) -> Result<()> {
    match value {
        CellValue::Text(s) | CellValue::Date(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Integer(i) if i.unsigned_abs() > MAX_EXACT_INTEGER => {
            sheet.write_string(row, col, i.to_string())?;
        }
        CellValue::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::DateTime(serial) => {
            let format = if serial.fract() == 0.0 {
                &formats.date
            } else {
                &formats.datetime
            };
            sheet.write_number_with_format(row, col, *serial, format)?;
        }
        CellValue::Float(f) => {
            sheet.write_number(row, col, *f)?;
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}
