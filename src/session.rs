use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::export::{self, SummaryRows};
use crate::data::loader::load_file;
use crate::data::model::{Dataset, ExportFormat, Label, Verdict};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Label counts over the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub not_reviewed: usize,
}

impl Summary {
    pub fn from_labels(labels: &[Label]) -> Self {
        labels.iter().fold(
            Summary {
                total: labels.len(),
                ..Default::default()
            },
            |mut s, label| {
                match label {
                    Label::Correct => s.correct += 1,
                    Label::Incorrect => s.incorrect += 1,
                    Label::NotReviewed => s.not_reviewed += 1,
                }
                s
            },
        )
    }

    /// Share of `Correct` rows over all rows, in percent.
    pub fn correct_pct(&self) -> f64 {
        percentage(self.correct, self.total)
    }

    /// Share of `Incorrect` rows over all rows, in percent.
    pub fn incorrect_pct(&self) -> f64 {
        percentage(self.incorrect, self.total)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

impl From<Summary> for SummaryRows {
    fn from(s: Summary) -> Self {
        SummaryRows {
            correct_pct: s.correct_pct(),
            incorrect_pct: s.incorrect_pct(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewSession
// ---------------------------------------------------------------------------

/// One upload → review → export cycle over a loaded file.
///
/// `labels` always has one entry per dataset record and `cursor` always
/// points at a record (or is 0 for an empty dataset).
#[derive(Debug, Clone)]
pub struct ReviewSession {
    source: PathBuf,
    dataset: Dataset,
    labels: Vec<Label>,
    cursor: usize,
}

impl ReviewSession {
    /// Load `path` into a fresh session with every row unreviewed.
    pub fn load(path: &Path) -> Result<Self> {
        let dataset = load_file(path)?;
        log::info!(
            "Loaded {} rows with columns {:?} from {}",
            dataset.len(),
            dataset.columns,
            path.display()
        );
        Ok(Self::from_dataset(path.to_path_buf(), dataset))
    }

    pub fn from_dataset(source: PathBuf, dataset: Dataset) -> Self {
        let labels = vec![Label::NotReviewed; dataset.len()];
        ReviewSession {
            source,
            dataset,
            labels,
            cursor: 0,
        }
    }

    /// File name of the source, for display.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Label of the row under the cursor.
    pub fn current_label(&self) -> Label {
        self.labels.get(self.cursor).copied().unwrap_or_default()
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.len()
    }

    /// Label the current row, then move to the next one unless this is the
    /// last row.  Re-labeling a reviewed row overwrites its label.
    pub fn advance(&mut self, verdict: Verdict) {
        let Some(slot) = self.labels.get_mut(self.cursor) else {
            return;
        };
        *slot = verdict.into();
        log::debug!("Row {} labeled {}", self.cursor, slot);
        if !self.is_last() {
            self.cursor += 1;
        }
    }

    /// Step back one row; no-op on the first row.
    pub fn retreat(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn summarize(&self) -> Summary {
        Summary::from_labels(&self.labels)
    }

    /// Output format for this session's source file.
    pub fn export_format(&self) -> Result<ExportFormat> {
        Ok(ExportFormat::for_source(&self.source)?)
    }

    /// Suggested output name, e.g. `lima_validacion.xlsx`.
    pub fn export_file_name(&self) -> Result<String> {
        let format = self.export_format()?;
        Ok(export::suggested_file_name(&self.source, format))
    }

    /// Serialize the labeled dataset in memory.
    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        let format = self.export_format()?;
        export::export_bytes(
            &self.dataset,
            &self.labels,
            format,
            self.summarize().into(),
        )
    }

    /// Write the labeled dataset to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let bytes = self.export_bytes()?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved {} labeled rows to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, FormatError, LABEL_COLUMN};
    use std::fs;
    use tempfile::tempdir;

    fn session_with_rows(n: usize) -> ReviewSession {
        let rows = (0..n)
            .map(|i| {
                vec![
                    CellValue::Text(format!("Restaurante {i}")),
                    CellValue::Text(format!("Cadena {i}")),
                ]
            })
            .collect();
        let ds = Dataset::new(
            vec!["cluster_name_clean".into(), "normalized_main_chain".into()],
            rows,
        );
        ReviewSession::from_dataset(PathBuf::from("datos.csv"), ds)
    }

    #[test]
    fn fresh_session_is_unreviewed() {
        for n in [0, 1, 7] {
            let s = session_with_rows(n);
            assert_eq!(s.labels().len(), n);
            assert!(s.labels().iter().all(|l| *l == Label::NotReviewed));
            assert_eq!(s.cursor(), 0);
        }
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut s = session_with_rows(3);
        for _ in 0..10 {
            s.advance(Verdict::Correct);
            assert!(s.cursor() <= 2);
        }
        assert_eq!(s.cursor(), 2);
        for _ in 0..10 {
            s.retreat();
        }
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn three_rows_partial_review() {
        let mut s = session_with_rows(3);
        s.advance(Verdict::Correct);
        s.advance(Verdict::Incorrect);

        let summary = s.summarize();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.not_reviewed, 1);
        assert_eq!(format!("{:.2}", summary.correct_pct()), "33.33");
        assert_eq!(format!("{:.2}", summary.incorrect_pct()), "33.33");
        assert!(summary.correct_pct() + summary.incorrect_pct() < 100.0);
    }

    #[test]
    fn complete_review_sums_to_hundred() {
        let mut s = session_with_rows(4);
        for v in [Verdict::Correct, Verdict::Incorrect, Verdict::Correct, Verdict::Correct] {
            s.advance(v);
        }
        let summary = s.summarize();
        assert_eq!(summary.not_reviewed, 0);
        assert!((summary.correct_pct() + summary.incorrect_pct() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn single_row() {
        let mut s = session_with_rows(1);
        s.retreat();
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.current_label(), Label::NotReviewed);

        s.advance(Verdict::Incorrect);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.labels(), &[Label::Incorrect]);
    }

    #[test]
    fn relabel_after_going_back() {
        let mut s = session_with_rows(2);
        s.advance(Verdict::Correct);
        s.retreat();
        assert_eq!(s.current_label(), Label::Correct);
        s.advance(Verdict::Incorrect);
        assert_eq!(s.labels(), &[Label::Incorrect, Label::NotReviewed]);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn empty_dataset_summary_is_zero() {
        let mut s = session_with_rows(0);
        s.advance(Verdict::Correct);
        s.retreat();
        let summary = s.summarize();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.correct_pct(), 0.0);
        assert_eq!(summary.incorrect_pct(), 0.0);
    }

    #[test]
    fn csv_round_trip_adds_one_column() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("lima.csv");
        fs::write(
            &src,
            "cluster_name_clean,normalized_main_chain,score,notes\n\
             Pollos Juan,Pollos,0.90,\"a, b\"\n\
             KFC Miraflores,KFC,1.0,\n",
        )
        .unwrap();

        let mut s = ReviewSession::load(&src).unwrap();
        s.advance(Verdict::Correct);
        let out = dir.path().join(s.export_file_name().unwrap());
        s.export_to(&out).unwrap();
        assert!(out.ends_with("lima_validacion.csv"));

        let original = load_file(&src).unwrap();
        let exported = load_file(&out).unwrap();
        assert_eq!(exported.columns.len(), original.columns.len() + 1);
        assert_eq!(exported.columns.last().map(String::as_str), Some(LABEL_COLUMN));
        for (orig, exp) in original.rows.iter().zip(&exported.rows) {
            assert_eq!(orig.as_slice(), &exp[..orig.len()]);
        }
        assert_eq!(exported.rows[0][4], CellValue::Text("Correcto".into()));
        assert_eq!(exported.rows[1][4], CellValue::Text("No revisado".into()));
    }

    #[test]
    fn xlsx_round_trip_preserves_cells() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("lima.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "cluster_name_clean").unwrap();
        sheet.write_string(0, 1, "normalized_main_chain").unwrap();
        sheet.write_string(0, 2, "rating").unwrap();
        sheet.write_string(1, 0, "Bembos Larco").unwrap();
        sheet.write_string(1, 1, "Bembos").unwrap();
        sheet.write_number(1, 2, 4.25).unwrap();
        workbook.save(&src).unwrap();

        let mut s = ReviewSession::load(&src).unwrap();
        s.advance(Verdict::Incorrect);
        let out = dir.path().join(s.export_file_name().unwrap());
        s.export_to(&out).unwrap();

        let exported = load_file(&out).unwrap();
        assert_eq!(
            exported.columns,
            vec!["cluster_name_clean", "normalized_main_chain", "rating", LABEL_COLUMN]
        );
        assert_eq!(exported.rows[0][0], CellValue::Text("Bembos Larco".into()));
        assert_eq!(exported.rows[0][2], CellValue::Float(4.25));
        assert_eq!(exported.rows[0][3], CellValue::Text("Incorrecto".into()));
    }

    #[test]
    fn xlsx_round_trip_preserves_dates() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("aperturas.xlsx");
        let date = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "cluster_name_clean").unwrap();
        sheet.write_string(0, 1, "opened").unwrap();
        sheet.write_string(1, 0, "Norky's Centro").unwrap();
        sheet.write_number_with_format(1, 1, 45306.0, &date).unwrap();
        workbook.save(&src).unwrap();

        let s = ReviewSession::load(&src).unwrap();
        let out = dir.path().join(s.export_file_name().unwrap());
        s.export_to(&out).unwrap();

        let original = load_file(&src).unwrap();
        let exported = load_file(&out).unwrap();
        assert_eq!(original.rows[0][1], CellValue::DateTime(45306.0));
        assert_eq!(exported.rows[0][1], original.rows[0][1]);
        assert_eq!(exported.rows[0][1].to_string(), "2024-01-15");
    }

    #[test]
    fn unrecognized_source_cannot_export() {
        let s = ReviewSession::from_dataset(PathBuf::from("datos.ods"), Dataset::default());
        let err = s.export_bytes().unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::UnsupportedOutputFormat("ods".into()))
        );
    }
}
