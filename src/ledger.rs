use crate::dataset::{Dataset, LENGTH_COLUMN, TEXT_COLUMN};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub text: String,
    /// Character count of `text`, set by `Ledger::annotate_lengths`.
    pub length: Option<usize>,
}

/// What `annotate_lengths` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthAnnotation {
    /// Ledger was empty; nothing changed.
    Skipped,
    Computed { records: usize },
}

/// Session task list. Append-only; identity is the row position.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<TaskRecord>,
    annotated: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Any text is accepted, including the empty string.
    pub fn append(&mut self, text: impl Into<String>) -> &TaskRecord {
        let text = text.into();
        tracing::debug!(row = self.records.len(), chars = text.chars().count(), "task appended");
        self.records.push(TaskRecord { text, length: None });
        self.annotated = false;
        &self.records[self.records.len() - 1]
    }

    pub fn annotate_lengths(&mut self) -> LengthAnnotation {
        if self.records.is_empty() {
            tracing::info!("length annotation skipped, ledger is empty");
            return LengthAnnotation::Skipped;
        }
        for record in &mut self.records {
            record.length = Some(record.text.chars().count());
        }
        self.annotated = true;
        tracing::info!(records = self.records.len(), "task lengths computed");
        LengthAnnotation::Computed {
            records: self.records.len(),
        }
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when every record carries a length.
    pub fn has_lengths(&self) -> bool {
        self.annotated
    }

    pub fn to_dataset(&self) -> Dataset {
        let mut ds = if self.annotated {
            Dataset::with_columns([TEXT_COLUMN, LENGTH_COLUMN])
        } else {
            Dataset::with_columns([TEXT_COLUMN])
        };
        for record in &self.records {
            let mut cells = vec![record.text.clone()];
            if self.annotated {
                cells.push(record.length.map(|n| n.to_string()).unwrap_or_default());
            }
            ds.push_row(cells);
        }
        ds
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_dataset(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut ledger = Ledger::new();
        ledger.append("Buy milk");
        ledger.append("");
        ledger.append("Call Bob's mom");
        let texts: Vec<&str> = ledger.records().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Buy milk", "", "Call Bob's mom"]);
        assert!(ledger.records().iter().all(|r| r.length.is_none()));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut ledger = Ledger::new();
        ledger.append("Buy milk");
        ledger.append("Buy milk");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_annotate_lengths_matches_char_count() {
        let mut ledger = Ledger::new();
        for t in ["Buy milk", "Finish the quarterly engineering report", "Café"] {
            ledger.append(t);
        }
        assert_eq!(ledger.annotate_lengths(), LengthAnnotation::Computed { records: 3 });
        let lengths: Vec<usize> = ledger.records().iter().filter_map(|r| r.length).collect();
        assert_eq!(lengths, vec![8, 39, 4]);
        assert!(ledger.has_lengths());
    }

    #[test]
    fn test_annotate_empty_ledger_is_skipped() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.annotate_lengths(), LengthAnnotation::Skipped);
        assert!(ledger.is_empty());
        assert!(!ledger.has_lengths());
        assert_eq!(ledger.to_dataset().columns(), &["Task".to_string()]);
    }

    #[test]
    fn test_dataset_view_gains_length_column_after_annotation() {
        let mut ledger = Ledger::new();
        ledger.append("Buy milk");
        assert!(!ledger.to_dataset().has_column(LENGTH_COLUMN));

        ledger.annotate_lengths();
        let ds = ledger.to_dataset();
        assert_eq!(ds.column(LENGTH_COLUMN).unwrap(), vec!["8"]);
        assert_eq!(ledger.to_string(), "       Task  Task_Length\n0  Buy milk            8");
    }

    #[test]
    fn test_append_after_annotation_clears_flag() {
        let mut ledger = Ledger::new();
        ledger.append("Buy milk");
        ledger.annotate_lengths();
        ledger.append("Walk the dog");
        assert!(!ledger.has_lengths());
        assert_eq!(ledger.records()[1].length, None);
    }
}
