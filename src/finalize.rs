//! End-of-session batch: annotate the ledger, then load, filter and persist
//! the external CSV dataset.

use crate::config::{FilesConfig, FinalizeConfig};
use crate::dataset::{Dataset, LENGTH_COLUMN, TEXT_COLUMN};
use crate::ledger::{LengthAnnotation, Ledger};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Summary of one finalizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeReport {
    pub ledger_rows: usize,
    pub ledger_annotated: bool,
    /// `false` when the input file was missing and an empty dataset was used.
    pub input_found: bool,
    pub loaded_rows: usize,
    pub kept_rows: usize,
    pub output: PathBuf,
}

pub struct Finalizer {
    files: FilesConfig,
    settings: FinalizeConfig,
}

impl Finalizer {
    pub fn new(files: FilesConfig, settings: FinalizeConfig) -> Self {
        Self { files, settings }
    }

    pub fn run<W: Write>(&self, ledger: &mut Ledger, out: &mut W) -> Result<FinalizeReport> {
        let annotation = annotate_ledger(ledger, out)?;

        let (mut dataset, input_found) = load(&self.files.input, out)?;
        if self.settings.annotate_loaded {
            dataset
                .annotate_lengths()
                .with_context(|| format!("Cannot compute lengths for {}", self.files.input.display()))?;
            tracing::info!(rows = dataset.len(), "loaded dataset annotated with lengths");
        }

        let subset = filter_by_length(&dataset, self.settings.length_threshold, out)
            .with_context(|| format!("Cannot filter {}", self.files.input.display()))?;
        persist(&subset, &self.files.output, out)?;

        let report = FinalizeReport {
            ledger_rows: ledger.len(),
            ledger_annotated: matches!(annotation, LengthAnnotation::Computed { .. }),
            input_found,
            loaded_rows: dataset.len(),
            kept_rows: subset.len(),
            output: self.files.output.clone(),
        };
        tracing::info!(?report, "finalize complete");
        Ok(report)
    }
}

/// Compute ledger lengths and print either the annotated table or a skip notice.
pub fn annotate_ledger<W: Write>(ledger: &mut Ledger, out: &mut W) -> Result<LengthAnnotation> {
    let annotation = ledger.annotate_lengths();
    match annotation {
        LengthAnnotation::Skipped => {
            writeln!(out, "\nTask lengths computation skipped. No tasks added.")?;
        }
        LengthAnnotation::Computed { .. } => {
            writeln!(out, "\nTask lengths computed using vectorized computation:")?;
            writeln!(out, "{ledger}")?;
        }
    }
    Ok(annotation)
}

/// Load the input CSV. A missing file yields an empty dataset with only the
/// text column; the flag reports whether the file existed.
pub fn load<W: Write>(path: &Path, out: &mut W) -> Result<(Dataset, bool)> {
    match Dataset::load_csv(path)? {
        Some(dataset) => {
            writeln!(out, "\nData loaded from CSV:")?;
            writeln!(out, "{dataset}")?;
            tracing::info!(path = %path.display(), rows = dataset.len(), "input loaded");
            Ok((dataset, true))
        }
        None => {
            writeln!(
                out,
                "\nFile '{}' not found. Creating an empty DataFrame.",
                path.display()
            )?;
            tracing::warn!(path = %path.display(), "input file not found, using empty dataset");
            Ok((Dataset::with_columns([TEXT_COLUMN]), false))
        }
    }
}

pub fn filter_by_length<W: Write>(dataset: &Dataset, threshold: usize, out: &mut W) -> Result<Dataset> {
    let subset = dataset.filter_by_length(threshold)?;
    writeln!(out, "\nSubset of DataFrame where {LENGTH_COLUMN} > {threshold}:")?;
    writeln!(out, "{subset}")?;
    tracing::info!(kept = subset.len(), of = dataset.len(), threshold, "dataset filtered");
    Ok(subset)
}

pub fn persist<W: Write>(dataset: &Dataset, path: &Path, out: &mut W) -> Result<()> {
    dataset.write_csv(path)?;
    writeln!(out, "\nData written to {}", path.display())?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "subset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetError;

    fn finalizer(dir: &Path, annotate_loaded: bool) -> Finalizer {
        Finalizer::new(
            FilesConfig {
                input: dir.join("todo_data.csv"),
                output: dir.join("subset_todo_data.csv"),
            },
            FinalizeConfig {
                length_threshold: 10,
                annotate_loaded,
            },
        )
    }

    #[test]
    fn test_empty_ledger_prints_skip_notice() {
        let mut ledger = Ledger::new();
        let mut out = Vec::new();
        let annotation = annotate_ledger(&mut ledger, &mut out).unwrap();
        assert_eq!(annotation, LengthAnnotation::Skipped);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\nTask lengths computation skipped. No tasks added.\n");
    }

    #[test]
    fn test_missing_input_then_filter_fails_on_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::new();
        ledger.append("Buy milk");
        let mut out = Vec::new();

        let err = finalizer(dir.path(), false).run(&mut ledger, &mut out).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DatasetError>(),
            Some(&DatasetError::MissingColumn("Task_Length".to_string()))
        );
        assert!(!dir.path().join("subset_todo_data.csv").exists());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Task lengths computed using vectorized computation:"));
        assert!(text.contains("not found. Creating an empty DataFrame."));
        // the ledger was annotated before the failure
        assert_eq!(ledger.records()[0].length, Some(8));
    }

    #[test]
    fn test_annotated_input_is_filtered_and_written() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("todo_data.csv"),
            "Task,Task_Length\nBuy milk,8\nFinish the quarterly engineering report,39\n",
        )
        .unwrap();

        let mut ledger = Ledger::new();
        let mut out = Vec::new();
        let report = finalizer(dir.path(), false).run(&mut ledger, &mut out).unwrap();

        assert!(report.input_found);
        assert!(!report.ledger_annotated);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.kept_rows, 1);

        let written = std::fs::read_to_string(dir.path().join("subset_todo_data.csv")).unwrap();
        assert_eq!(written, "Task,Task_Length\nFinish the quarterly engineering report,39\n");

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Data loaded from CSV:"));
        assert!(text.contains("Subset of DataFrame where Task_Length > 10:"));
        assert!(text.ends_with(&format!("Data written to {}\n", report.output.display())));
    }

    #[test]
    fn test_annotate_loaded_computes_lengths_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("todo_data.csv"),
            "Task\nBuy milk\nWalk the dog twice\n",
        )
        .unwrap();

        let mut ledger = Ledger::new();
        let report = finalizer(dir.path(), true)
            .run(&mut ledger, &mut std::io::sink())
            .unwrap();
        assert_eq!(report.kept_rows, 1);

        let written = std::fs::read_to_string(dir.path().join("subset_todo_data.csv")).unwrap();
        assert_eq!(written, "Task,Task_Length\nWalk the dog twice,18\n");
    }

    #[test]
    fn test_annotate_loaded_writes_header_for_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::new();
        let report = finalizer(dir.path(), true)
            .run(&mut ledger, &mut std::io::sink())
            .unwrap();
        assert!(!report.input_found);
        assert_eq!(report.kept_rows, 0);

        let written = std::fs::read_to_string(dir.path().join("subset_todo_data.csv")).unwrap();
        assert_eq!(written, "Task,Task_Length\n");
    }

    #[test]
    fn test_persist_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale,contents\n1,2\n3,4\n").unwrap();

        let mut ds = Dataset::with_columns([TEXT_COLUMN]);
        ds.push_row(vec!["Buy milk".to_string()]);
        persist(&ds, &path, &mut std::io::sink()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Task\nBuy milk\n");
    }
}
